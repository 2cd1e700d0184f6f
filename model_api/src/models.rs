use serde_json::json;

use crate::{
    client::{ApiClient, ApiRequest, Method, Transport},
    data::{CreatedModel, ListEnvelope, Model, ModelEnvelope},
    error::{ApiError, Result},
};

/// Lists the current user's models in the order the server returns them.
pub async fn list<T: Transport>(client: &ApiClient<T>) -> Result<Vec<Model>> {
    let listing: ListEnvelope<Model> = client.fetch(&ApiRequest::new(Method::Get, "models")).await?;
    Ok(listing.into_vec("models")?)
}

/// Fetches a single model by id.
pub async fn fetch<T: Transport>(client: &ApiClient<T>, model_id: &str) -> Result<Model> {
    let request = ApiRequest::new(Method::Get, "models").segment(model_id);
    let envelope: ModelEnvelope = client.fetch(&request).await?;
    Ok(envelope.into_model())
}

/// Creates a new, empty model.
///
/// # Arguments
/// * `client` - The api client.
/// * `name` - The model name, see `validate_name`.
///
/// # Returns
/// The server assigned id of the new model.
///
/// # Errors
/// `ApiError::InvalidInput` if the name is rejected locally, no request is
/// sent in that case.
pub async fn create<T: Transport>(client: &ApiClient<T>, name: &str) -> Result<String> {
    validate_name(name).map_err(ApiError::InvalidInput)?;

    let request = ApiRequest::new(Method::Post, "models").json(json!({ "name": name }));
    let created: CreatedModel = client.fetch(&request).await?;

    log::info!(model_id = created.model_id.as_str(); "model created");
    Ok(created.model_id)
}

/// Checks a model name before it is sent to the server.
///
/// # Errors
/// A message for the user if the name is empty or contains whitespace.
pub fn validate_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("model name is required".to_string());
    }

    if name.chars().any(char::is_whitespace) {
        return Err("model name must not contain whitespace".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_need_content_and_no_spaces() {
        assert!(validate_name("mnist_net").is_ok());
        assert_eq!(validate_name("").unwrap_err(), "model name is required");
        assert!(validate_name("my net").is_err());
        assert!(validate_name("tab\tbed").is_err());
    }
}
