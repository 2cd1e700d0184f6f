use serde::Serialize;
use serde_json::json;

use crate::{
    client::{ApiClient, ApiRequest, Method, Transport},
    data::User,
    error::{ApiError, Result},
};

/// The session as the front end sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Authenticated(User),
    NotAuthenticated { error: Option<String> },
}

/// Transitions of `AuthState`.
#[derive(Debug, Clone)]
pub enum AuthEvent {
    LoadingUser,
    Authenticated(User),
    NotAuthenticated(Option<String>),
}

impl AuthState {
    /// Applies an event, the new state never depends on the previous one.
    pub fn reduce(self, event: AuthEvent) -> Self {
        match event {
            AuthEvent::LoadingUser => Self::Loading,
            AuthEvent::Authenticated(user) => Self::Authenticated(user),
            AuthEvent::NotAuthenticated(error) => Self::NotAuthenticated { error },
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// Builds the state following a login or session lookup.
    pub fn from_result(result: &Result<User>) -> Self {
        match result {
            Ok(user) => Self::Authenticated(user.clone()),
            Err(e) => Self::NotAuthenticated {
                error: Some(e.user_message()),
            },
        }
    }
}

/// A new account as entered in the register form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub repeat_password: String,
}

/// Fetches the user owning the current session cookies.
pub async fn current_user<T: Transport>(client: &ApiClient<T>) -> Result<User> {
    client.fetch(&ApiRequest::new(Method::Get, "users/current")).await
}

/// Logs in, the server answers with the user and sets the token cookies.
///
/// # Errors
/// `ApiError::Status` with a field error on bad credentials.
pub async fn login<T: Transport>(client: &ApiClient<T>, email: &str, password: &str) -> Result<User> {
    let request = ApiRequest::new(Method::Post, "auth/login")
        .json(json!({ "email": email, "password": password }));

    let user: User = client.fetch(&request).await?;
    log::info!(user_id = user.user_id.as_str(); "logged in");
    Ok(user)
}

/// Ends the session on the server.
pub async fn logout<T: Transport>(client: &ApiClient<T>) -> Result<()> {
    client.send(&ApiRequest::new(Method::Get, "auth/logout")).await?;
    log::info!("logged out");
    Ok(())
}

/// Creates a new account.
///
/// # Errors
/// `ApiError::Status` carrying the offending field when validation fails.
pub async fn register<T: Transport>(client: &ApiClient<T>, registration: &Registration) -> Result<()> {
    let body = serde_json::to_value(registration).map_err(ApiError::Decode)?;
    client
        .send(&ApiRequest::new(Method::Post, "users").json(body))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> User {
        User {
            user_id: "u1".into(),
            email: "ann@example.com".into(),
            name: "ann".into(),
            roles: Vec::new(),
        }
    }

    #[test]
    fn reducer_follows_events() {
        let state = AuthState::Loading.reduce(AuthEvent::Authenticated(ann()));
        assert_eq!(state.user(), Some(&ann()));

        let state = state.reduce(AuthEvent::NotAuthenticated(None));
        assert_eq!(state, AuthState::NotAuthenticated { error: None });

        assert_eq!(state.reduce(AuthEvent::LoadingUser), AuthState::Loading);
    }

    #[test]
    fn registration_uses_camel_case() {
        let reg = Registration {
            name: "ann".into(),
            email: "ann@example.com".into(),
            password: "pw".into(),
            repeat_password: "pw".into(),
        };
        let body = serde_json::to_value(&reg).unwrap();
        assert_eq!(body["repeatPassword"], "pw");
    }
}
