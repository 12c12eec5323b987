//! HTTP client with session interception

use crate::config::ClientConfig;
use mealdesk_auth::SessionStore;
use mealdesk_core::environment::Navigator;
use mealdesk_core::{ApiError, Envelope, Route};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// `errorMessage` the API sends when a protected request carried no token
pub const AUTH_HEADER_MISSING: &str = "Authorization header not provided";

/// Outcome of a request the server accepted with a 2xx status
///
/// `Err` carries why the body could not be read; the server-side effect
/// happened regardless.
pub type Accepted<T> = Result<T, ApiError>;

/// Request sender shared by every resource module
///
/// Attaches the current session token to each request and turns
/// authorization failures into a cleared session plus a redirect to the
/// login route, whichever module issued the request.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    /// Create a client for `config.base_url`
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        }
    }

    /// API base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Session whose token is attached to requests
    #[must_use]
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Navigator used for auth redirects
    #[must_use]
    pub const fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Send an authenticated request and return the JSON body unchanged
    ///
    /// The token is read immediately before sending. An empty body is
    /// returned as `null`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::AuthExpired`] on 401 or an "authorization header not
    ///   provided" payload; the session is cleared and the navigator sent to
    ///   [`Route::Login`] before this returns
    /// - [`ApiError::Conflict`], [`ApiError::NotFound`] or
    ///   [`ApiError::Status`] for other error statuses
    /// - [`ApiError::Network`] if no response was received
    /// - [`ApiError::Decode`] if a successful response is not JSON
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        self.submit(method, path, body).await?
    }

    /// Send an authenticated request, deciding success by status alone
    ///
    /// `Ok` means the server accepted the request; the inner result is the
    /// body, or [`ApiError::Decode`] if a 2xx body is not JSON.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), minus [`ApiError::Decode`].
    #[tracing::instrument(name = "api_request", skip(self, body))]
    pub async fn submit(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Accepted<Value>, ApiError> {
        let token = self.session.token();
        let (status, payload) = self.execute(method, path, body, token.as_deref()).await?;

        if status.is_success() {
            return Ok(payload);
        }

        // Only 2xx bodies fail to parse
        let payload = payload.unwrap_or_default();
        if is_auth_failure(status, &payload) {
            return Err(self.expire_session(status, &payload));
        }

        Err(error_for_status(status, &payload))
    }

    /// Send a request to a public endpoint
    ///
    /// No token is attached and authorization failures are returned as
    /// plain status errors without touching the session.
    ///
    /// # Errors
    ///
    /// Same mapping as [`send`](Self::send), except that 401 is returned as
    /// [`ApiError::Status`].
    #[tracing::instrument(name = "api_public_request", skip(self, body))]
    pub async fn send_public(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let (status, payload) = self.execute(method, path, body, None).await?;

        if status.is_success() {
            payload
        } else {
            Err(error_for_status(status, &payload.unwrap_or_default()))
        }
    }

    /// Send an authenticated request and unwrap the `{message, data}` envelope
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus [`ApiError::Decode`]
    /// when `data` does not have the expected shape.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let payload = self.send(method, path, body).await?;
        decode_envelope(payload)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<(StatusCode, Accepted<Value>), ApiError> {
        let url = format!("{}{path}", self.base_url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        tracing::debug!(%method, path, status = status.as_u16(), "API response");

        Ok((status, parse_payload(status, &text)))
    }

    fn expire_session(&self, status: StatusCode, payload: &Value) -> ApiError {
        let message = error_message(status, payload);

        if let Err(error) = self.session.clear_token() {
            tracing::error!(%error, "Failed to clear session after authorization failure");
        }

        metrics::counter!("mealdesk_auth_expired_total").increment(1);
        tracing::warn!(status = status.as_u16(), %message, "Authorization rejected, session cleared");

        self.navigator.navigate(&Route::Login);

        ApiError::AuthExpired { message }
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Unwrap `data` from a `{message, data}` envelope
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the payload is not an envelope around `T`.
pub fn decode_envelope<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value::<Envelope<T>>(payload)
        .map(Envelope::into_data)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn parse_payload(status: StatusCode, text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(e) if status.is_success() => Err(ApiError::Decode(e.to_string())),
        // Error pages are not always JSON; keep the text as the message
        Err(_) => Ok(Value::String(text.to_string())),
    }
}

fn is_auth_failure(status: StatusCode, payload: &Value) -> bool {
    status == StatusCode::UNAUTHORIZED
        || payload.get("errorMessage").and_then(Value::as_str) == Some(AUTH_HEADER_MISSING)
}

fn error_message(status: StatusCode, payload: &Value) -> String {
    payload
        .get("errorMessage")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
        .or_else(|| payload.as_str())
        .map_or_else(
            || status.canonical_reason().unwrap_or("Unknown error").to_string(),
            str::to_string,
        )
}

fn error_for_status(status: StatusCode, payload: &Value) -> ApiError {
    let message = error_message(status, payload);
    match status {
        StatusCode::CONFLICT => ApiError::Conflict { message },
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    }
}
