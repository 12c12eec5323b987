//! Login and logout.

use crate::client::{ApiClient, decode_envelope};
use mealdesk_core::{ApiError, LoginCredentials, Route, Validate};
use reqwest::Method;

/// Login endpoint
pub const LOGIN_PATH: &str = "/auth/login";

/// Session lifecycle against the API
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Authenticate through `client`
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token
    ///
    /// On success the token is stored in the session and the navigator is
    /// sent to the recipes list. The request carries no token, and a
    /// rejection leaves the session untouched.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] if email or password is blank
    /// - [`ApiError::InvalidCredentials`] if the API rejects the login
    /// - [`ApiError::Session`] if the token cannot be persisted
    /// - any other [`ApiError`] from the request
    #[tracing::instrument(skip(self, credentials))]
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), ApiError> {
        credentials.validate()?;

        let body = serde_json::to_value(credentials)
            .map_err(|e| ApiError::Decode(format!("request body: {e}")))?;

        let payload = self
            .client
            .send_public(Method::POST, LOGIN_PATH, Some(&body))
            .await
            .map_err(|error| match error {
                ApiError::Status { status: 400 | 401 | 403, .. } | ApiError::NotFound { .. } => {
                    ApiError::InvalidCredentials
                },
                other => other,
            })?;

        let token: String = decode_envelope(payload)?;
        if token.is_empty() {
            return Err(ApiError::Decode("login response carried an empty token".to_string()));
        }

        self.client.session().set_token(token)?;
        tracing::info!("Signed in");

        self.client.navigator().navigate(&Route::Recipes);
        Ok(())
    }

    /// Forget the token and go to the login route
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Session`] if the durable copy cannot be removed;
    /// nothing is navigated then.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.client.session().clear_token()?;
        tracing::info!("Signed out");

        self.client.navigator().navigate(&Route::Login);
        Ok(())
    }
}
