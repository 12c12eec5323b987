//! Configuration for the query cache and the process context.
//!
//! Loads configuration from environment variables with sensible defaults.

use mealdesk_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Query cache behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Refetch a previously loaded list when a mutation invalidates it.
    ///
    /// The refetch completes before the mutation's navigation runs, so the
    /// list view never renders its pre-mutation data.
    pub revalidate_on_invalidate: bool,
}

impl QueryConfig {
    /// Load configuration from `MEALDESK_REVALIDATE_ON_INVALIDATE`.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            revalidate_on_invalidate: env::var("MEALDESK_REVALIDATE_ON_INVALIDATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Builder: enable or disable list revalidation
    #[must_use]
    pub const fn with_revalidate_on_invalidate(mut self, enabled: bool) -> Self {
        self.revalidate_on_invalidate = enabled;
        self
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            revalidate_on_invalidate: true,
        }
    }
}

/// Everything [`AdminContext`](crate::AdminContext) needs to start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// HTTP client and session storage
    pub client: ClientConfig,
    /// Query cache
    pub query: QueryConfig,
}

impl AdminConfig {
    /// Load both sections from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            client: ClientConfig::from_env(),
            query: QueryConfig::from_env(),
        }
    }

    /// Builder: replace the client section
    #[must_use]
    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    /// Builder: replace the query section
    #[must_use]
    pub fn with_query(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revalidation_is_on_by_default() {
        assert!(QueryConfig::default().revalidate_on_invalidate);
        assert!(!QueryConfig::default()
            .with_revalidate_on_invalidate(false)
            .revalidate_on_invalidate);
    }

    #[test]
    fn admin_config_builders_replace_sections() {
        let config = AdminConfig::default()
            .with_client(ClientConfig::default().with_base_url("http://api.test/"))
            .with_query(QueryConfig::default().with_revalidate_on_invalidate(false));

        assert_eq!(config.client.base_url, "http://api.test");
        assert!(!config.query.revalidate_on_invalidate);
    }
}
