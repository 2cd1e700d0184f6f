use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    client::{ApiClient, ApiRequest, Method, Transport},
    data::{Model, ModelEnvelope},
    error::Result,
};

/// A new parameter value, sent to the server as its json type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl ParameterValue {
    /// Reads a typed number, integers first so `3` stays `3` on the wire.
    ///
    /// # Returns
    /// `None` if `raw` is not a finite number.
    pub fn number(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(int) = raw.parse::<i64>() {
            return Some(Self::Number(int.into()));
        }

        raw.parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Self::Number)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The entity an action mutates, used to track in-flight requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Subject {
    Model,
    Layer(i64),
    Activator(i64),
}

/// Every mutation the editor can request on a model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelAction {
    AddLayer {
        layer_type_id: String,
    },
    DeleteLayer {
        model_layer_id: i64,
    },
    UpdateLayerParameter {
        model_layer_id: i64,
        parameter_name: String,
        new_value: ParameterValue,
    },
    UpdateLayerOrder {
        model_layer_id: i64,
        new_index: usize,
    },
    AddActivator {
        activator_target_id: i64,
    },
    DeleteActivator {
        model_activator_id: i64,
    },
    UpdateActivatorParameter {
        model_activator_id: i64,
        parameter_name: String,
        new_value: ParameterValue,
    },
    UpdateActivatorOrder {
        model_activator_id: i64,
        new_index: usize,
    },
    RenameModel {
        name: String,
    },
}

impl ModelAction {
    /// Builds the single request carrying this action.
    ///
    /// # Arguments
    /// * `model_id` - The model being edited.
    ///
    /// # Returns
    /// The request to send to the model api.
    pub fn request(&self, model_id: &str) -> ApiRequest {
        let model = ApiRequest::new(Method::Get, "models").segment(model_id);
        let at = |method: Method| ApiRequest {
            method,
            ..model.clone()
        };

        match self {
            Self::AddLayer { layer_type_id } => at(Method::Post)
                .segment("layers")
                .json(json!({ "layerId": layer_type_id })),
            Self::DeleteLayer { model_layer_id } => {
                at(Method::Delete).segment("layers").segment(model_layer_id)
            }
            Self::UpdateLayerParameter {
                model_layer_id,
                parameter_name,
                new_value,
            } => at(Method::Put)
                .segment("layers")
                .segment(model_layer_id)
                .segment("data")
                .segment(parameter_name)
                .json(json!({ "newValue": new_value })),
            Self::UpdateLayerOrder {
                model_layer_id,
                new_index,
            } => at(Method::Put)
                .segment("layers")
                .segment(model_layer_id)
                .segment("order")
                .json(json!({ "index": new_index })),
            Self::AddActivator {
                activator_target_id,
            } => at(Method::Post)
                .segment("activators")
                .json(json!({ "activatorId": activator_target_id })),
            Self::DeleteActivator { model_activator_id } => at(Method::Delete)
                .segment("activators")
                .segment(model_activator_id),
            Self::UpdateActivatorParameter {
                model_activator_id,
                parameter_name,
                new_value,
            } => at(Method::Put)
                .segment("activators")
                .segment(model_activator_id)
                .segment("data")
                .segment(parameter_name)
                .json(json!({ "newValue": new_value })),
            Self::UpdateActivatorOrder {
                model_activator_id,
                new_index,
            } => at(Method::Put)
                .segment("activators")
                .segment(model_activator_id)
                .segment("order")
                .json(json!({ "newIndex": new_index })),
            Self::RenameModel { name } => at(Method::Put)
                .segment("name")
                .json(json!({ "name": name })),
        }
    }

    /// A stable name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddLayer { .. } => "add_layer",
            Self::DeleteLayer { .. } => "delete_layer",
            Self::UpdateLayerParameter { .. } => "update_layer_parameter",
            Self::UpdateLayerOrder { .. } => "update_layer_order",
            Self::AddActivator { .. } => "add_activator",
            Self::DeleteActivator { .. } => "delete_activator",
            Self::UpdateActivatorParameter { .. } => "update_activator_parameter",
            Self::UpdateActivatorOrder { .. } => "update_activator_order",
            Self::RenameModel { .. } => "rename_model",
        }
    }

    /// A short human readable summary for notifications.
    pub fn describe(&self) -> String {
        match self {
            Self::AddLayer { layer_type_id } => format!("add layer {layer_type_id}"),
            Self::DeleteLayer { model_layer_id } => format!("delete layer #{model_layer_id}"),
            Self::UpdateLayerParameter {
                model_layer_id,
                parameter_name,
                new_value,
            } => format!("set {parameter_name}={new_value} on layer #{model_layer_id}"),
            Self::UpdateLayerOrder {
                model_layer_id,
                new_index,
            } => format!("move layer #{model_layer_id} to {new_index}"),
            Self::AddActivator {
                activator_target_id,
            } => format!("add activator for target #{activator_target_id}"),
            Self::DeleteActivator { model_activator_id } => {
                format!("delete activator #{model_activator_id}")
            }
            Self::UpdateActivatorParameter {
                model_activator_id,
                parameter_name,
                new_value,
            } => format!("set {parameter_name}={new_value} on activator #{model_activator_id}"),
            Self::UpdateActivatorOrder {
                model_activator_id,
                new_index,
            } => format!("move activator #{model_activator_id} to {new_index}"),
            Self::RenameModel { name } => format!("rename model to {name}"),
        }
    }

    /// The entity that is busy while this action is in flight.
    pub fn subject(&self) -> Subject {
        match self {
            Self::DeleteLayer { model_layer_id }
            | Self::UpdateLayerParameter { model_layer_id, .. }
            | Self::UpdateLayerOrder { model_layer_id, .. } => Subject::Layer(*model_layer_id),
            Self::DeleteActivator { model_activator_id }
            | Self::UpdateActivatorParameter {
                model_activator_id, ..
            }
            | Self::UpdateActivatorOrder {
                model_activator_id, ..
            } => Subject::Activator(*model_activator_id),
            Self::AddLayer { .. } | Self::AddActivator { .. } | Self::RenameModel { .. } => {
                Subject::Model
            }
        }
    }
}

/// Sends one action to the server and returns the updated model.
///
/// # Arguments
/// * `client` - The api client.
/// * `model_id` - The model being edited.
/// * `action` - The mutation to apply.
///
/// # Returns
/// The model document as the server holds it after the mutation.
///
/// # Errors
/// Any `ApiError` from the request, unchanged.
pub async fn dispatch<T: Transport>(
    client: &ApiClient<T>,
    model_id: &str,
    action: &ModelAction,
) -> Result<Model> {
    log::debug!(model_id = model_id, action = action.kind(); "dispatching");

    let envelope: ModelEnvelope = client.fetch(&action.request(model_id)).await?;
    Ok(envelope.into_model())
}
