//! # Mealdesk Core
//!
//! Core traits and types for the Mealdesk admin client.
//!
//! This crate holds everything the other crates agree on: the reducer
//! abstraction that drives the query cache, the domain entities exchanged
//! with the REST API, the error taxonomy, and the client-side validation
//! rule sets.
//!
//! ## Core Concepts
//!
//! - **State**: cache state for one resource type
//! - **Action**: every input to the cache reducer (fetches, responses, mutations)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side effect descriptions (refetches, navigation)
//! - **Environment**: injected dependencies via traits
//!
//! ## Example
//!
//! ```ignore
//! use mealdesk_core::*;
//!
//! struct VisitReducer;
//!
//! impl Reducer for VisitReducer {
//!     type State = Vec<Route>;
//!     type Action = Route;
//!     type Environment = ();
//!
//!     fn reduce(&self, visited: &mut Vec<Route>, route: Route, _env: &()) -> SmallVec<[Effect<Route>; 4]> {
//!         visited.push(route.clone());
//!         smallvec![Effect::Navigate(route)]
//!     }
//! }
//! ```

pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

pub mod domain;
pub mod envelope;
pub mod error;
pub mod id;
pub mod resource;
pub mod route;
pub mod validation;

pub use domain::{
    AppUser, AppUserDraft, AppUserPatch, AppUsers, LoginCredentials, Meal, MealDraft, MealPatch,
    MealType, Meals, Recipe, RecipeDraft, RecipePatch, Recipes,
};
pub use envelope::Envelope;
pub use error::{ApiError, ErrorKind};
pub use id::EntityId;
pub use resource::{Identified, Operation, Resource, ResourceKind};
pub use route::Route;
pub use validation::{FieldError, Validate, ValidationErrors};

/// Reducer: the cache rules as a pure state transition
///
/// `(State, Action, Environment) -> (State, Effects)`; all I/O is returned
/// as [`Effect`](effect::Effect) values for the store to run.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// State transition for one store
    pub trait Reducer {
        /// What the store holds
        type State;

        /// Inputs: fetch lifecycle, responses, mutations
        type Action;

        /// Injected collaborators (API, clock, sequence)
        type Environment;

        /// Apply `action` to `state` in place
        ///
        /// Must not block or perform I/O; anything asynchronous goes in the
        /// returned effects.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effects: work a reducer asks the store to perform
pub mod effect {
    use crate::route::Route;
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;

    /// Deferred work, possibly yielding a follow-up action
    pub enum Effect<Action> {
        /// Nothing
        None,

        /// All at once
        Parallel(Vec<Effect<Action>>),

        /// One after another; each step finishes, fed-back actions
        /// included, before the next starts
        Sequential(Vec<Effect<Action>>),

        /// Async work whose `Some(action)` is reduced by the same store
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),

        /// Move the view to another route
        Navigate(Route),
    }

    impl<Action: fmt::Debug> fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::None => f.write_str("Effect::None"),
                Self::Parallel(effects) => f.debug_tuple("Effect::Parallel").field(effects).finish(),
                Self::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Self::Future(_) => f.write_str("Effect::Future(<future>)"),
                Self::Navigate(route) => f.debug_tuple("Effect::Navigate").field(route).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Run `effects` concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Self>) -> Self {
            Self::Parallel(effects)
        }

        /// Run `effects` in order
        #[must_use]
        pub const fn chain(effects: Vec<Self>) -> Self {
            Self::Sequential(effects)
        }

        /// Every route this effect tree navigates to, in declaration order
        #[must_use]
        pub fn routes(&self) -> Vec<&Route> {
            match self {
                Self::Navigate(route) => vec![route],
                Self::Parallel(effects) | Self::Sequential(effects) => {
                    effects.iter().flat_map(Effect::routes).collect()
                },
                Self::None | Self::Future(_) => Vec::new(),
            }
        }
    }
}

/// Collaborators injected into reducers and the HTTP layer
pub mod environment {
    use crate::route::Route;
    use chrono::{DateTime, Utc};

    /// Source of "now"; swapped for a fixed clock in tests
    pub trait Clock: Send + Sync {
        /// Current instant
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall clock
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Moves the host application's view to a route
    ///
    /// The router itself lives in the host application. Implementations must
    /// not block; navigation is fire-and-forget from the client's side.
    pub trait Navigator: Send + Sync {
        /// Navigate to `route`
        fn navigate(&self, route: &Route);
    }
}
