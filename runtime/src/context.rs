//! Process context: one session, one HTTP client, one cache per resource.

use crate::config::AdminConfig;
use crate::queries::ResourceQueries;
use crate::sequence::Sequence;
use mealdesk_auth::{FileTokenStorage, SessionStore, TokenStorage};
use mealdesk_client::{ApiClient, AuthApi, ResourceApi};
use mealdesk_core::environment::{Clock, Navigator, SystemClock};
use mealdesk_core::{ApiError, AppUsers, Meals, Recipes};
use std::sync::Arc;
use std::time::Duration;

/// Everything a view needs, created once at startup and shared
///
/// All three caches share one [`Sequence`], and all requests go through one
/// [`ApiClient`], so an authorization failure from any resource clears the
/// same session.
#[derive(Clone, Debug)]
pub struct AdminContext {
    /// Current session
    pub session: Arc<SessionStore>,
    /// Shared HTTP client
    pub client: ApiClient,
    /// Login and logout
    pub auth: AuthApi,
    /// App user queries
    pub app_users: ResourceQueries<AppUsers>,
    /// Meal queries
    pub meals: ResourceQueries<Meals>,
    /// Recipe queries
    pub recipes: ResourceQueries<Recipes>,
}

impl AdminContext {
    /// Restore the session from `storage` and build the caches
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Session`] if the stored session cannot be read.
    pub fn init(
        config: &AdminConfig,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        Self::with_clock(config, storage, navigator, Arc::new(SystemClock))
    }

    /// [`init`](Self::init) with an injected clock
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Session`] if the stored session cannot be read.
    pub fn with_clock(
        config: &AdminConfig,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ApiError> {
        crate::metrics::describe_metrics();

        let session = Arc::new(SessionStore::load(storage)?);
        let client = ApiClient::new(&config.client, Arc::clone(&session), navigator);
        let sequence = Sequence::new();

        let context = Self {
            auth: AuthApi::new(client.clone()),
            app_users: ResourceQueries::new(
                ResourceApi::new(client.clone()),
                Arc::clone(&clock),
                sequence.clone(),
                config.query.clone(),
            ),
            meals: ResourceQueries::new(
                ResourceApi::new(client.clone()),
                Arc::clone(&clock),
                sequence.clone(),
                config.query.clone(),
            ),
            recipes: ResourceQueries::new(
                ResourceApi::new(client.clone()),
                clock,
                sequence,
                config.query.clone(),
            ),
            session,
            client,
        };

        tracing::info!(
            base_url = context.client.base_url(),
            authenticated = context.session.is_authenticated(),
            "Admin context ready"
        );
        Ok(context)
    }

    /// [`init`](Self::init) from `MEALDESK_*` variables, keeping the session
    /// in the file named by `MEALDESK_TOKEN_PATH`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Session`] if the session file exists but cannot
    /// be read.
    pub fn from_env(navigator: Arc<dyn Navigator>) -> Result<Self, ApiError> {
        let config = AdminConfig::from_env();
        let storage = Arc::new(FileTokenStorage::new(&config.client.token_path));
        Self::init(&config, storage, navigator)
    }

    /// Wait for in-flight refetches of every cache
    ///
    /// # Errors
    ///
    /// Returns the error of the first cache that timed out.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), crate::StoreError> {
        self.app_users.shutdown(timeout).await?;
        self.meals.shutdown(timeout).await?;
        self.recipes.shutdown(timeout).await
    }
}
