//! # Mealdesk Testing
//!
//! Testing utilities and helpers for the Mealdesk admin client.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then builder for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use mealdesk_testing::{RecordingNavigator, test_clock};
//!
//! #[tokio::test]
//! async fn create_returns_to_the_list() {
//!     let navigator = RecordingNavigator::new();
//!     let context = test_context(&server, navigator.clone());
//!
//!     context.meals.create(MealDraft::new("Oatmeal", MealType::Breakfast)).await?;
//!
//!     assert_eq!(navigator.last(), Some(Route::Meals));
//! }
//! ```

use chrono::{DateTime, Utc};
use mealdesk_core::environment::{Clock, Navigator};
use mealdesk_core::route::Route;


/// Deterministic stand-ins for the environment traits
pub mod mocks {
    use super::{Clock, DateTime, Navigator, Route, Utc};
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex, PoisonError};

    /// Clock stopped at one instant
    ///
    /// ```
    /// use mealdesk_testing::mocks::FixedClock;
    /// use mealdesk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let stopped = Utc::now();
    /// assert_eq!(FixedClock::new(stopped).now(), stopped);
    /// ```
    #[derive(Debug, Clone, Copy)]
    pub struct FixedClock(DateTime<Utc>);

    impl FixedClock {
        /// Clock that always reads `instant`
        #[must_use]
        pub const fn new(instant: DateTime<Utc>) -> Self {
            Self(instant)
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    /// Clock stopped at 2025-01-01T00:00:00Z
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }

    /// Navigator that records every route it is sent to
    ///
    /// Clones share the recording, so keep one handle and give the other to
    /// the code under test.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingNavigator {
        routes: Arc<Mutex<Vec<Route>>>,
    }

    impl RecordingNavigator {
        /// Empty recording
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Every route navigated to, oldest first
        #[must_use]
        pub fn routes(&self) -> Vec<Route> {
            self.routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Most recent route
        #[must_use]
        pub fn last(&self) -> Option<Route> {
            self.routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .last()
                .cloned()
        }

        /// How many times the navigator was used
        #[must_use]
        pub fn count(&self) -> usize {
            self.routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, route: &Route) {
            self.routes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(route.clone());
        }
    }
}

pub use mocks::{FixedClock, RecordingNavigator, test_clock};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_new_year_2025() {
        assert_eq!(test_clock().now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn recording_navigator_shares_history_between_clones() {
        let navigator = RecordingNavigator::new();
        let handle = navigator.clone();

        navigator.navigate(&Route::Meals);
        navigator.navigate(&Route::Login);

        assert_eq!(handle.routes(), vec![Route::Meals, Route::Login]);
        assert_eq!(handle.last(), Some(Route::Login));
        assert_eq!(handle.count(), 2);
    }
}
