//! # Mealdesk Runtime
//!
//! Query cache and Store runtime for the Mealdesk admin client.
//!
//! This crate provides the Store that coordinates reducer execution and
//! effect handling, the per-resource query cache built on it, and the
//! process context that wires session, HTTP client and caches together.
//!
//! ## Core Components
//!
//! - **Store**: one reducer's state plus the effects it starts
//! - **Query cache**: [`QueryReducer`] over a key → entry map, ordered by a
//!   process-wide [`Sequence`]
//! - **Resource queries**: [`ResourceQueries`], the cache-aware read and
//!   mutation API the views use
//! - **Context**: [`AdminContext`], one per process
//!
//! ## Example
//!
//! ```ignore
//! use mealdesk_runtime::{AdminContext, AdminConfig};
//!
//! let context = AdminContext::from_env(navigator)?;
//!
//! // Served from the cache while fresh
//! let meals = context.meals.list().await?;
//!
//! // Invalidates, refetches the list, then navigates to /meals
//! context.meals.create(MealDraft::new("Oatmeal", MealType::Breakfast)).await?;
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod metrics;
pub mod queries;
pub mod reducer;
pub mod sequence;
pub mod store;

/// Store errors
pub mod error {
    use thiserror::Error;

    /// Why a store refused work
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// `send()` after shutdown began
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Effects still running when the shutdown timeout elapsed
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use cache::{CacheEntry, Fetched, QueryKey, QuerySnapshot, QueryState, QueryStatus};
pub use config::{AdminConfig, QueryConfig};
pub use context::AdminContext;
pub use error::StoreError;
pub use queries::ResourceQueries;
pub use reducer::{QueryAction, QueryEnvironment, QueryReducer, QueryStore};
pub use sequence::Sequence;
pub use store::{EffectHandle, Store};
