use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorBody, Result};

/// Server message attached to a 401 whose access token cookie went stale.
pub const TOKEN_EXPIRED: &str = "access token expired";

const REFRESH_PATH: &str = "auth/refresh-token";

/// The http verbs the model api uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl From<Method> for reqwest::Method {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request relative to the api prefix.
///
/// The path is kept as raw segments so every transport encodes them the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Creates a new `ApiRequest`.
    ///
    /// Leading, trailing and repeated slashes in `path` are ignored.
    ///
    /// # Arguments
    /// * `method` - The http verb.
    /// * `path` - A path relative to the api prefix, e.g. `models/abc/layers`.
    ///
    /// # Returns
    /// A new `ApiRequest` without a body.
    pub fn new(method: Method, path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        Self {
            method,
            segments,
            body: None,
        }
    }

    /// Appends one raw path segment, it may contain characters needing escapes.
    pub fn segment(mut self, segment: impl ToString) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Attaches a json body.
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The unencoded relative path, for logging and assertions.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

/// A raw response as handed back by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as json.
    ///
    /// # Errors
    /// Returns `ApiError::Decode` if the body is not a valid `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Sends requests to the model api.
///
/// This trait is the seam between the client logic and the network, the
/// production implementation is `HttpTransport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes a single request, any status code is a valid response.
    ///
    /// # Arguments
    /// * `request` - The request to send.
    ///
    /// # Returns
    /// The raw response or an error if no response could be obtained.
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// A `Transport` over `reqwest` keeping the auth cookies between calls.
pub struct HttpTransport {
    http: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a new `HttpTransport`.
    ///
    /// # Arguments
    /// * `prefix` - The api prefix url, e.g. `http://127.0.0.1:5000/api`.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidUrl` if the prefix can't be used as a base,
    /// or `ApiError::Network` if the http client can't be built.
    pub fn new(prefix: &str) -> Result<Self> {
        let trimmed = prefix.trim_end_matches('/');
        let base = Url::parse(trimmed).map_err(|_| ApiError::InvalidUrl(prefix.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(prefix.to_string()));
        }

        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { http, base })
    }

    /// Resolves a request's segments against the prefix, encoding each one.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(&request.segments);

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(request)?;
        let mut builder = self.http.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(ApiResponse { status, body })
    }
}

/// The model api client.
///
/// Wraps a `Transport`, turning non-2xx statuses into errors and
/// transparently refreshing an expired access token.
pub struct ApiClient<T: Transport> {
    transport: T,
}

impl ApiClient<HttpTransport> {
    /// Creates a new client talking http to `prefix`.
    ///
    /// # Errors
    /// See `HttpTransport::new`.
    pub fn http(prefix: &str) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(prefix)?))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Creates a new `ApiClient`.
    ///
    /// # Arguments
    /// * `transport` - The transport to send requests through.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a request, refreshing the access token once if it expired.
    ///
    /// # Arguments
    /// * `request` - The request to send.
    ///
    /// # Returns
    /// The successful response.
    ///
    /// # Errors
    /// Returns `ApiError::Status` for any non-2xx answer, including a failed
    /// refresh, or the transport's error.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let response = self.transport.execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let body = ErrorBody::parse(&response.body);
        if response.status == 401 && body.message.as_deref() == Some(TOKEN_EXPIRED) {
            log::debug!(path = request.path().as_str(); "access token expired, refreshing");

            let refresh = ApiRequest::new(Method::Post, REFRESH_PATH);
            check(self.transport.execute(&refresh).await?)?;

            return check(self.transport.execute(request).await?);
        }

        Err(ApiError::Status {
            status: response.status,
            body,
        })
    }

    /// Sends a request and decodes its json body.
    ///
    /// # Errors
    /// See `send`, plus `ApiError::Decode` for an unexpected body.
    pub async fn fetch<R: DeserializeOwned>(&self, request: &ApiRequest) -> Result<R> {
        self.send(request).await?.json()
    }
}

fn check(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }

    Err(ApiError::Status {
        status: response.status,
        body: ErrorBody::parse(&response.body),
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use super::*;

    struct Scripted {
        replies: Mutex<VecDeque<ApiResponse>>,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl Scripted {
        fn new(replies: &[(u16, &str)]) -> Self {
            let replies = replies
                .iter()
                .map(|(status, body)| ApiResponse {
                    status: *status,
                    body: body.as_bytes().to_vec(),
                })
                .collect();

            Self {
                replies: Mutex::new(replies),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn paths(&self) -> Vec<String> {
            self.seen.lock().unwrap().iter().map(ApiRequest::path).collect()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.replies.lock().unwrap().pop_front().unwrap())
        }
    }

    const EXPIRED: &str = r#"{"message":"access token expired"}"#;

    #[test]
    fn request_path_normalizes_slashes() {
        let req = ApiRequest::new(Method::Get, "/models//abc/").segment("a b");
        assert_eq!(req.segments, ["models", "abc", "a b"]);
        assert_eq!(req.path(), "models/abc/a b");
    }

    #[test]
    fn http_urls_join_prefix_and_escape_segments() {
        let transport = HttpTransport::new("http://localhost:5000/api/").unwrap();
        let req = ApiRequest::new(Method::Put, "/models/m1/layers/3/data").segment("kernel size");
        let url = transport.url_for(&req).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/models/m1/layers/3/data/kernel%20size"
        );
    }

    #[test]
    fn rejects_unusable_prefix() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn refreshes_expired_token_then_retries_once() {
        let client = ApiClient::new(Scripted::new(&[(401, EXPIRED), (200, "{}"), (200, "[1]")]));
        let req = ApiRequest::new(Method::Get, "models");

        let nums: Vec<i32> = client.fetch(&req).await.unwrap();

        assert_eq!(nums, [1]);
        assert_eq!(
            client.transport().paths(),
            ["models", "auth/refresh-token", "models"]
        );
    }

    #[tokio::test]
    async fn second_expiry_is_not_retried_again() {
        let client =
            ApiClient::new(Scripted::new(&[(401, EXPIRED), (200, "{}"), (401, EXPIRED)]));
        let req = ApiRequest::new(Method::Get, "models");

        let err = client.send(&req).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(client.transport().paths().len(), 3);
    }

    #[tokio::test]
    async fn other_unauthorized_answers_are_errors() {
        let client = ApiClient::new(Scripted::new(&[(401, r#"{"message":"no token"}"#)]));
        let err = client
            .send(&ApiRequest::new(Method::Get, "users/current"))
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "no token");
        assert_eq!(client.transport().paths(), ["users/current"]);
    }

    #[tokio::test]
    async fn failed_refresh_stops_the_request() {
        let client = ApiClient::new(Scripted::new(&[(401, EXPIRED), (401, "{}")]));
        let err = client
            .send(&ApiRequest::new(Method::Get, "models"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert_eq!(client.transport().paths(), ["models", "auth/refresh-token"]);
    }
}
