//! HTTP client configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default REST API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default location of the durable session document
pub const DEFAULT_TOKEN_PATH: &str = ".mealdesk/session.json";

/// Where the API lives and where the session token is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST API base URL, without a trailing slash
    pub base_url: String,
    /// Durable session document
    pub token_path: PathBuf,
}

impl ClientConfig {
    /// Load configuration from `MEALDESK_API_BASE_URL` and
    /// `MEALDESK_TOKEN_PATH`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("MEALDESK_API_BASE_URL")
                .map(|url| normalize_base_url(&url))
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            token_path: env::var("MEALDESK_TOKEN_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_PATH)),
        }
    }

    /// Builder: point at another API
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Self {
        self.base_url = normalize_base_url(base_url.as_ref());
        self
    }

    /// Builder: keep the session document elsewhere
    #[must_use]
    pub fn with_token_path(mut self, token_path: impl Into<PathBuf>) -> Self {
        self.token_path = token_path.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let config = ClientConfig::default()
            .with_base_url("http://api.test:8080/")
            .with_token_path("/tmp/session.json");

        assert_eq!(config.base_url, "http://api.test:8080");
        assert_eq!(config.token_path, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn default_points_at_local_api() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.token_path, PathBuf::from(DEFAULT_TOKEN_PATH));
    }
}
