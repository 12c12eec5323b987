//! # Mealdesk API Client
//!
//! HTTP access to the recipe/meal/app-user REST API.
//!
//! Every request goes through one [`ApiClient`], which attaches the current
//! session token and handles authorization failures globally: a 401 (or the
//! API's "Authorization header not provided" payload) clears the session and
//! sends the navigator to the login route before the error reaches the
//! caller.
//!
//! ## Example
//!
//! ```no_run
//! use mealdesk_auth::{FileTokenStorage, SessionStore};
//! use mealdesk_client::{ApiClient, ClientConfig, ResourceApi};
//! use mealdesk_core::environment::Navigator;
//! use mealdesk_core::{Meals, Route};
//! use std::sync::Arc;
//!
//! struct LogNavigator;
//!
//! impl Navigator for LogNavigator {
//!     fn navigate(&self, route: &Route) {
//!         println!("-> {route}");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_env();
//!     let session = Arc::new(SessionStore::load(Arc::new(FileTokenStorage::new(
//!         &config.token_path,
//!     )))?);
//!
//!     let client = ApiClient::new(&config, session, Arc::new(LogNavigator));
//!     let meals = ResourceApi::<Meals>::new(client);
//!
//!     for meal in meals.list().await? {
//!         println!("{} ({})", meal.name, meal.meal_type);
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod resources;

// Re-export main types for convenience
pub use auth::{AuthApi, LOGIN_PATH};
pub use client::{AUTH_HEADER_MISSING, Accepted, ApiClient, decode_envelope};
pub use config::ClientConfig;
pub use resources::ResourceApi;
