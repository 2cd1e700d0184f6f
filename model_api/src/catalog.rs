use crate::{
    client::{ApiClient, ApiRequest, Method, Transport},
    data::{ActivatorTarget, Function, LayerType, ListEnvelope, Model},
    error::Result,
};

/// The immutable catalog of layer types and activation functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub layer_types: Vec<LayerType>,
    pub functions: Vec<Function>,
}

impl Catalog {
    /// Fetches both catalogs concurrently.
    ///
    /// # Arguments
    /// * `client` - The api client.
    ///
    /// # Errors
    /// The first `ApiError` of either request.
    pub async fn load<T: Transport>(client: &ApiClient<T>) -> Result<Self> {
        let layers_req = ApiRequest::new(Method::Get, "layers");
        let functions_req = ApiRequest::new(Method::Get, "functions");

        let (layer_types, functions) = tokio::try_join!(
            client.fetch::<ListEnvelope<LayerType>>(&layers_req),
            client.fetch::<ListEnvelope<Function>>(&functions_req)
        )?;

        Ok(Self {
            layer_types: layer_types.into_vec("layers")?,
            functions: functions.into_vec("functions")?,
        })
    }

    /// Layer types whose id contains `needle`, ignoring case.
    pub fn filter_layer_types(&self, needle: &str) -> Vec<&LayerType> {
        let needle = needle.to_lowercase();
        self.layer_types
            .iter()
            .filter(|t| t.layer_type_id.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Indices of the model layers whose label contains `needle`.
pub fn filter_model_layers(model: &Model, needle: &str) -> Vec<usize> {
    model
        .layers
        .iter()
        .enumerate()
        .filter(|(_, l)| l.label().contains(needle))
        .map(|(i, _)| i)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    Layer,
    Function,
}

/// Something that can be appended to the activator chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatorChoice {
    pub target_id: i64,
    pub label: String,
    pub description: String,
    pub kind: ChoiceKind,
}

/// The model's own layers followed by the catalog functions.
pub fn activator_choices(model: &Model, catalog: &Catalog) -> Vec<ActivatorChoice> {
    let layers = model.layers.iter().map(|l| ActivatorChoice {
        target_id: l.activator_target_id,
        label: l.label().to_string(),
        description: l.layer_type.layer_type_id.clone(),
        kind: ChoiceKind::Layer,
    });
    let functions = catalog.functions.iter().map(|f| ActivatorChoice {
        target_id: f.activator_target_id,
        label: f.label().to_string(),
        description: f.description.clone(),
        kind: ChoiceKind::Function,
    });

    layers.chain(functions).collect()
}

/// Whether an activator target still exists in the model or catalog.
pub fn target_exists(model: &Model, target: &ActivatorTarget) -> bool {
    match target {
        ActivatorTarget::Layer(l) => model.layer(l.activator_target_id).is_some(),
        ActivatorTarget::Function(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_type(id: &str) -> LayerType {
        LayerType {
            layer_type_id: id.to_string(),
            description: None,
            layer_name: String::new(),
            parameters: Vec::new(),
        }
    }

    #[test]
    fn layer_type_filter_ignores_case() {
        let catalog = Catalog {
            layer_types: vec![
                layer_type("torch.nn.Linear"),
                layer_type("torch.nn.Conv2d"),
                layer_type("torch.nn.Bilinear"),
            ],
            functions: Vec::new(),
        };

        let ids: Vec<_> = catalog
            .filter_layer_types("LINEAR")
            .iter()
            .map(|t| t.layer_type_id.as_str())
            .collect();
        assert_eq!(ids, ["torch.nn.Linear", "torch.nn.Bilinear"]);
        assert_eq!(catalog.filter_layer_types("").len(), 3);
    }
}
