use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de, de::DeserializeOwned};

/// Stored parameter values of a layer or activator, keyed by parameter name.
pub type ParameterData = BTreeMap<String, Value>;

/// The account owning a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "id")]
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "username")]
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The neural-network definition document being edited.
///
/// The server owns this document, every mutation answers with a fresh copy
/// which replaces the local one wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(alias = "id")]
    pub model_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub layers: Vec<ModelLayer>,
    #[serde(default, alias = "functions")]
    pub activators: Vec<ModelActivator>,
}

impl Model {
    /// Finds a model layer by its activator target id.
    pub fn layer(&self, id: i64) -> Option<&ModelLayer> {
        self.layers.iter().find(|l| l.activator_target_id == id)
    }

    /// Finds an activator by its id.
    pub fn activator(&self, id: i64) -> Option<&ModelActivator> {
        self.activators.iter().find(|a| a.model_activator_id == id)
    }

    /// Position of a layer inside the ordered layer list.
    pub fn layer_index(&self, id: i64) -> Option<usize> {
        self.layers.iter().position(|l| l.activator_target_id == id)
    }

    /// Position of an activator inside the activator chain.
    pub fn activator_index(&self, id: i64) -> Option<usize> {
        self.activators
            .iter()
            .position(|a| a.model_activator_id == id)
    }
}

/// A layer instantiated inside a model from a [`LayerType`] catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLayer {
    #[serde(alias = "id")]
    pub activator_target_id: i64,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, alias = "layerName")]
    pub name: String,
    pub layer_type: LayerType,
    #[serde(default)]
    pub parameter_data: ParameterData,
}

impl ModelLayer {
    /// The label shown to the user, falls back to the layer name.
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// What an activator points at: an activation function or one of the
/// model's own layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActivatorTarget {
    #[serde(rename = "model_layer")]
    Layer(ModelLayer),
    #[serde(rename = "function")]
    Function(Function),
}

impl ActivatorTarget {
    /// The activator target id shared by layers and functions.
    pub fn id(&self) -> i64 {
        match self {
            Self::Layer(layer) => layer.activator_target_id,
            Self::Function(func) => func.activator_target_id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Layer(layer) => layer.label(),
            Self::Function(func) => func.label(),
        }
    }

    /// Parameters configurable on the activator itself.
    ///
    /// Layer references carry no parameters of their own, their layer does.
    pub fn parameters(&self) -> &[Parameter] {
        match self {
            Self::Layer(_) => &[],
            Self::Function(func) => &func.parameters,
        }
    }
}

/// One element of the model's computation chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelActivator {
    #[serde(alias = "id")]
    pub model_activator_id: i64,
    pub value: ActivatorTarget,
    #[serde(default)]
    pub parameter_data: ParameterData,
}

/// Catalog entry describing a layer kind, e.g. `torch.nn.Linear`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerType {
    #[serde(alias = "id")]
    pub layer_type_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub layer_name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// Catalog entry describing an activation function, e.g. `F.relu`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    #[serde(alias = "id")]
    pub activator_target_id: i64,
    #[serde(default)]
    pub description: String,
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Function {
    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            &self.name
        } else {
            &self.display_name
        }
    }
}

/// A declared parameter of a layer type or function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub default_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

impl Parameter {
    pub fn is_boolean(&self) -> bool {
        matches!(self.kind.as_str(), "boolean" | "bool")
    }

    /// The effective value of this parameter in `data`.
    ///
    /// A missing or empty stored value falls back to the declared default.
    pub fn resolve<'a>(&'a self, data: &'a ParameterData) -> &'a str {
        match data.get(&self.name) {
            Some(v) if !v.value.is_empty() => &v.value,
            _ => &self.default_value,
        }
    }

    /// The stored value exactly as the server holds it, empty if unset.
    pub fn stored<'a>(&self, data: &'a ParameterData) -> &'a str {
        data.get(&self.name).map(|v| v.value.as_str()).unwrap_or("")
    }
}

/// A stored parameter value.
///
/// `value_id` is set when the value references another entity, such as a
/// layer used as an input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_id: Option<i64>,
    pub value: String,
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value_id: None,
            value: value.into(),
        }
    }

    fn from_json(raw: serde_json::Value) -> Result<Self, String> {
        match raw {
            serde_json::Value::Object(mut map) => {
                let value = match map.remove("value") {
                    Some(v) => scalar_text(v)?,
                    None => String::new(),
                };
                let value_id = ["valueId", "value_id", "id"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(serde_json::Value::as_i64));

                Ok(Self { value_id, value })
            }
            other => Ok(Self::text(scalar_text(other)?)),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(raw).map_err(de::Error::custom)
    }
}

/// Server response that may wrap the model in a `{"model": ..}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ModelEnvelope {
    Wrapped { model: Model },
    Bare(Model),
}

impl ModelEnvelope {
    pub(crate) fn into_model(self) -> Model {
        match self {
            Self::Wrapped { model } | Self::Bare(model) => model,
        }
    }
}

/// A list response, either bare or keyed like `{"models": [..]}`.
///
/// The keyed form may carry other fields next to the list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Keyed(serde_json::Map<String, serde_json::Value>),
}

impl<T: DeserializeOwned> ListEnvelope<T> {
    /// Takes the list out of the envelope.
    ///
    /// # Arguments
    /// * `key` - The field holding the list in the keyed form.
    ///
    /// # Errors
    /// If the keyed form lacks `key` or its items don't decode.
    pub(crate) fn into_vec(self, key: &str) -> serde_json::Result<Vec<T>> {
        match self {
            Self::Bare(items) => Ok(items),
            Self::Keyed(mut fields) => match fields.remove(key) {
                Some(items) => serde_json::from_value(items),
                None => Err(de::Error::custom(format!("missing `{key}` list"))),
            },
        }
    }
}

/// The answer to a model creation, a full document or just its id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedModel {
    #[serde(alias = "id")]
    pub(crate) model_id: String,
}

fn scalar_text(value: serde_json::Value) -> Result<String, String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(format!("expected a scalar parameter value, got {other}")),
    }
}

fn nullable_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = serde_json::Value::deserialize(deserializer)?;
    scalar_text(raw).map_err(de::Error::custom)
}
