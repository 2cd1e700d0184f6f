use std::{error::Error, fmt};

use serde::Deserialize;

/// The result type used across the model api client.
pub type Result<T> = std::result::Result<T, ApiError>;

/// The json body the server attaches to non-2xx responses.
///
/// Validation failures carry the offending form field in `field`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ErrorBody {
    /// Parses an error body, an unreadable body yields an empty one.
    ///
    /// # Arguments
    /// * `bytes` - The raw response body.
    ///
    /// # Returns
    /// The parsed body or `ErrorBody::default()`.
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

/// All errors that can occur while talking to the model api.
#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response.
    Network(reqwest::Error),
    /// The server answered with a non-2xx status.
    Status { status: u16, body: ErrorBody },
    /// A response body could not be decoded into the expected document.
    Decode(serde_json::Error),
    /// The configured api prefix is not a usable base url.
    InvalidUrl(String),
    /// The input was rejected before any request was sent.
    InvalidInput(String),
}

impl ApiError {
    /// Returns the http status if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the `(field, message)` pair of a server validation error.
    pub fn field_error(&self) -> Option<(&str, &str)> {
        match self {
            Self::Status {
                body:
                    ErrorBody {
                        message: Some(message),
                        field: Some(field),
                    },
                ..
            } => Some((field.as_str(), message.as_str())),
            _ => None,
        }
    }

    /// A short message suitable for a notification.
    ///
    /// Prefers the server's own message over the generic display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                body: ErrorBody {
                    message: Some(message),
                    ..
                },
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::Status { status, body } => match &body.message {
                Some(message) => write!(f, "server responded {status}: {message}"),
                None => write!(f, "server responded {status}"),
            },
            Self::Decode(e) => write!(f, "invalid response body: {e}"),
            Self::InvalidUrl(url) => write!(f, "invalid api url: {url}"),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            Self::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}
