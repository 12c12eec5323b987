//! Cache-synchronization rules for one resource type.
//!
//! Fetches, responses and mutation results are all actions. The reducer
//! keeps the entries of a [`QueryState`] ordered by sequence number and,
//! after a successful mutation, returns the refetch and navigation effects
//! the caller waits on.

use crate::cache::{Fetched, QueryKey, QueryState};
use crate::config::QueryConfig;
use crate::sequence::Sequence;
use crate::store::Store;
use mealdesk_client::ResourceApi;
use mealdesk_core::{
    ApiError, EntityId, Identified, Resource, SmallVec, effect::Effect, environment::Clock,
    reducer::Reducer, smallvec,
};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Every input to the query cache
#[derive(Clone, Debug, PartialEq)]
pub enum QueryAction<E> {
    /// A fetch numbered `seq` was issued for `key`
    FetchStarted {
        /// Entry being fetched
        key: QueryKey,
        /// Sequence number of the fetch
        seq: u64,
    },

    /// The fetch numbered `seq` completed
    FetchResolved {
        /// Entry that was fetched
        key: QueryKey,
        /// Sequence number of the fetch
        seq: u64,
        /// Response
        result: Result<Fetched<E>, ApiError>,
    },

    /// Mark every entry under `prefix` stale
    Invalidate {
        /// List key for the whole resource, or an item key
        prefix: QueryKey,
    },

    /// A create succeeded
    Created {
        /// Entity returned by the API
        entity: E,
    },

    /// An update succeeded
    Updated {
        /// Entity returned by the API
        entity: E,
    },

    /// A delete succeeded
    Deleted {
        /// Id of the removed entity
        id: EntityId,
    },
}

/// Dependencies of [`QueryReducer`]
pub struct QueryEnvironment<R: Resource> {
    /// Wire operations used by refetch effects
    pub api: ResourceApi<R>,
    /// Timestamps for `updated_at`
    pub clock: Arc<dyn Clock>,
    /// Process-wide ordering
    pub sequence: Sequence,
    /// Cache behavior
    pub config: QueryConfig,
}

impl<R: Resource> QueryEnvironment<R> {
    /// Create an environment
    #[must_use]
    pub fn new(
        api: ResourceApi<R>,
        clock: Arc<dyn Clock>,
        sequence: Sequence,
        config: QueryConfig,
    ) -> Self {
        Self {
            api,
            clock,
            sequence,
            config,
        }
    }
}

impl<R: Resource> Clone for QueryEnvironment<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            clock: Arc::clone(&self.clock),
            sequence: self.sequence.clone(),
            config: self.config.clone(),
        }
    }
}

/// Reducer for the cache of resource `R`
pub struct QueryReducer<R> {
    _resource: PhantomData<fn() -> R>,
}

/// Store running a [`QueryReducer`]
pub type QueryStore<R> = Store<
    QueryState<<R as Resource>::Entity>,
    QueryAction<<R as Resource>::Entity>,
    QueryEnvironment<R>,
    QueryReducer<R>,
>;

impl<R: Resource> QueryReducer<R> {
    /// Creates a new `QueryReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _resource: PhantomData,
        }
    }

    /// Mark everything under `prefix` stale and revalidate the list if it
    /// is covered and was ever loaded
    fn invalidate(
        state: &mut QueryState<R::Entity>,
        prefix: &QueryKey,
        env: &QueryEnvironment<R>,
    ) -> Option<Effect<QueryAction<R::Entity>>> {
        Self::mark_stale(state, prefix, env);

        if prefix.is_list() {
            Self::revalidate_list(state, env)
        } else {
            None
        }
    }

    fn mark_stale(
        state: &mut QueryState<R::Entity>,
        prefix: &QueryKey,
        env: &QueryEnvironment<R>,
    ) {
        let cutoff = env.sequence.current();
        let mut invalidated = 0_usize;
        for (_, entry) in state.matching_mut(prefix) {
            entry.invalidate(cutoff);
            invalidated += 1;
        }
        tracing::debug!(%prefix, invalidated, cutoff, "Invalidated queries");
    }

    fn revalidate_list(
        state: &mut QueryState<R::Entity>,
        env: &QueryEnvironment<R>,
    ) -> Option<Effect<QueryAction<R::Entity>>> {
        if !env.config.revalidate_on_invalidate {
            return None;
        }

        let key = QueryKey::list(R::KIND);
        let entry = state.get_mut(&key).filter(|entry| entry.has_data())?;

        let seq = env.sequence.next();
        entry.begin_fetch(seq);

        let api = env.api.clone();
        Some(Effect::Future(Box::pin(async move {
            let result = api.list().await.map(Fetched::List);
            Some(QueryAction::FetchResolved { key, seq, result })
        })))
    }

    /// Revalidation first, then the list route
    fn then_navigate(
        refetch: Option<Effect<QueryAction<R::Entity>>>,
    ) -> Effect<QueryAction<R::Entity>> {
        let navigate = Effect::Navigate(R::KIND.list_route());
        match refetch {
            Some(refetch) => Effect::chain(vec![refetch, navigate]),
            None => navigate,
        }
    }
}

impl<R: Resource> Reducer for QueryReducer<R> {
    type State = QueryState<R::Entity>;
    type Action = QueryAction<R::Entity>;
    type Environment = QueryEnvironment<R>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            QueryAction::FetchStarted { key, seq } => {
                state.entry(key).begin_fetch(seq);
                SmallVec::new()
            },

            QueryAction::FetchResolved { key, seq, result } => {
                let now = env.clock.now();
                let Some(entry) = state.get_mut(&key) else {
                    tracing::debug!(%key, seq, "Response for an evicted query ignored");
                    return SmallVec::new();
                };

                let listed: Option<HashSet<EntityId>> = match &result {
                    Ok(Fetched::List(items)) => {
                        Some(items.iter().map(|item| item.id().clone()).collect())
                    },
                    _ => None,
                };

                if let Err(reason) = entry.resolve(seq, result, now) {
                    metrics::counter!(crate::metrics::STALE_RESPONSES).increment(1);
                    tracing::debug!(%key, seq, ?reason, "Stale response discarded");
                } else if let Some(listed) = listed {
                    let pruned = state.prune_unlisted(R::KIND, &listed);
                    if pruned > 0 {
                        tracing::debug!(%key, pruned, "Dropped stale items missing from the list");
                    }
                }
                SmallVec::new()
            },

            QueryAction::Invalidate { prefix } => {
                Self::invalidate(state, &prefix, env).into_iter().collect()
            },

            QueryAction::Created { entity } => {
                tracing::debug!(resource = %R::KIND, id = %entity.id(), "Created");
                let refetch = Self::invalidate(state, &QueryKey::list(R::KIND), env);
                smallvec![Self::then_navigate(refetch)]
            },

            QueryAction::Updated { entity } => {
                let id = entity.id().clone();
                tracing::debug!(resource = %R::KIND, %id, "Updated");

                Self::mark_stale(state, &QueryKey::list(R::KIND), env);

                // Drawn after the invalidation cutoff, so the seed is fresh
                let seq = env.sequence.next();
                state
                    .entry(QueryKey::item(R::KIND, id))
                    .seed(seq, entity, env.clock.now());

                let refetch = Self::revalidate_list(state, env);
                smallvec![Self::then_navigate(refetch)]
            },

            QueryAction::Deleted { id } => {
                tracing::debug!(resource = %R::KIND, %id, "Deleted");
                let refetch = Self::invalidate(state, &QueryKey::list(R::KIND), env);
                state.remove(&QueryKey::item(R::KIND, id));
                refetch.into_iter().collect()
            },
        }
    }
}

impl<R> Clone for QueryReducer<R> {
    fn clone(&self) -> Self {
        Self {
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> Default for QueryReducer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> fmt::Debug for QueryReducer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryReducer")
            .field("resource", &R::KIND)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, QueryStatus};
    use mealdesk_auth::SessionStore;
    use mealdesk_auth::mocks::MemoryTokenStorage;
    use mealdesk_client::{ApiClient, ClientConfig};
    use mealdesk_core::{Meal, MealType, Meals, ResourceKind, Route};
    use mealdesk_testing::assertions::{
        assert_has_future_effect, assert_navigates_to, assert_no_effects,
    };
    use mealdesk_testing::{RecordingNavigator, ReducerTest, test_clock};
    use proptest::prelude::*;

    fn env_with(config: QueryConfig) -> QueryEnvironment<Meals> {
        let session = Arc::new(SessionStore::load(Arc::new(MemoryTokenStorage::new())).unwrap());
        let client = ApiClient::new(
            &ClientConfig::default(),
            session,
            Arc::new(RecordingNavigator::new()),
        );
        QueryEnvironment::new(
            ResourceApi::new(client),
            Arc::new(test_clock()),
            Sequence::new(),
            config,
        )
    }

    fn env() -> QueryEnvironment<Meals> {
        env_with(QueryConfig::default())
    }

    fn meal(id: u64, name: &str) -> Meal {
        Meal {
            id: EntityId::from(id),
            name: name.to_string(),
            meal_type: MealType::Breakfast,
            photo: None,
            recipes: Vec::new(),
        }
    }

    fn list_key() -> QueryKey {
        QueryKey::list(ResourceKind::Meals)
    }

    fn item_key(id: u64) -> QueryKey {
        QueryKey::item(ResourceKind::Meals, EntityId::from(id))
    }

    /// Cache with a loaded list and two loaded items, sequence at 3
    fn loaded_state(env: &QueryEnvironment<Meals>) -> QueryState<Meal> {
        let reducer = QueryReducer::<Meals>::new();
        let mut state = QueryState::new();
        let loads = [
            (list_key(), Fetched::List(vec![meal(1, "Oatmeal"), meal(2, "Borscht")])),
            (item_key(1), Fetched::Item(meal(1, "Oatmeal"))),
            (item_key(2), Fetched::Item(meal(2, "Borscht"))),
        ];
        for (key, data) in loads {
            let seq = env.sequence.next();
            reducer.reduce(&mut state, QueryAction::FetchStarted { key: key.clone(), seq }, env);
            reducer.reduce(
                &mut state,
                QueryAction::FetchResolved { key, seq, result: Ok(data) },
                env,
            );
        }
        state
    }

    #[test]
    fn fetch_started_creates_a_loading_entry() {
        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env())
            .given_state(QueryState::new())
            .when_action(QueryAction::FetchStarted { key: list_key(), seq: 1 })
            .then_state(|state| {
                let entry = state.get(&list_key()).unwrap();
                assert_eq!(entry.status, QueryStatus::Loading);
                assert_eq!(entry.latest_seq, 1);
            })
            .then_effects(|effects| assert_no_effects(effects))
            .run();
    }

    #[test]
    fn response_for_missing_entry_is_ignored() {
        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env())
            .given_state(QueryState::new())
            .when_action(QueryAction::FetchResolved {
                key: item_key(9),
                seq: 1,
                result: Ok(Fetched::Item(meal(9, "Ghost"))),
            })
            .then_state(|state| assert!(state.is_empty()))
            .run();
    }

    #[test]
    fn create_before_any_list_load_only_navigates() {
        let env = env();
        let mut state = QueryState::new();
        state.entry(item_key(1)).seed(env.sequence.next(), meal(1, "Oatmeal"), test_clock().now());

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(state)
            .when_action(QueryAction::Created { entity: meal(3, "Varenyky") })
            .then_state(|state| {
                assert!(state.get(&item_key(1)).unwrap().stale);
                assert!(state.get(&list_key()).is_none());
            })
            .then_effects(|effects| {
                assert_eq!(effects.len(), 1);
                assert_navigates_to(effects, &[Route::Meals]);
                assert!(matches!(effects[0], Effect::Navigate(_)));
            })
            .run();
    }

    #[test]
    fn create_revalidates_loaded_list_then_navigates() {
        let env = env();
        let state = loaded_state(&env);

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(state)
            .when_action(QueryAction::Created { entity: meal(3, "Varenyky") })
            .then_state(|state| {
                let list = state.get(&list_key()).unwrap();
                assert!(list.stale);
                assert_eq!(list.status, QueryStatus::Loading);
                assert_eq!(list.latest_seq, 4);
                assert!(state.get(&item_key(1)).unwrap().stale);
                assert!(state.get(&item_key(2)).unwrap().stale);
            })
            .then_effects(|effects| {
                assert!(matches!(&effects[0], Effect::Sequential(chain) if chain.len() == 2));
                assert_has_future_effect(effects);
                assert_navigates_to(effects, &[Route::Meals]);
            })
            .run();
    }

    #[test]
    fn update_seeds_the_item_after_invalidating() {
        let env = env();
        let state = loaded_state(&env);

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(state)
            .when_action(QueryAction::Updated { entity: meal(1, "Porridge") })
            .then_state(|state| {
                let seeded = state.get(&item_key(1)).unwrap();
                assert!(seeded.is_fresh());
                assert_eq!(seeded.data, Some(Fetched::Item(meal(1, "Porridge"))));

                assert!(state.get(&item_key(2)).unwrap().stale);
                assert!(state.get(&list_key()).unwrap().stale);
            })
            .then_effects(|effects| {
                assert_has_future_effect(effects);
                assert_navigates_to(effects, &[Route::Meals]);
            })
            .run();
    }

    #[test]
    fn delete_evicts_the_item_without_navigating() {
        let env = env();
        let state = loaded_state(&env);

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(state)
            .when_action(QueryAction::Deleted { id: EntityId::from(2) })
            .then_state(|state| {
                assert!(state.get(&item_key(2)).is_none());
                assert!(state.get(&item_key(1)).unwrap().stale);
            })
            .then_effects(|effects| {
                assert_has_future_effect(effects);
                assert_navigates_to(effects, &[]);
            })
            .run();
    }

    #[test]
    fn revalidation_can_be_disabled() {
        let env = env_with(QueryConfig::default().with_revalidate_on_invalidate(false));
        let state = loaded_state(&env);

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(state)
            .when_action(QueryAction::Invalidate { prefix: list_key() })
            .then_state(|state| {
                let list = state.get(&list_key()).unwrap();
                assert!(list.stale);
                assert_eq!(list.status, QueryStatus::Success);
            })
            .then_effects(|effects| assert_no_effects(effects))
            .run();
    }

    #[test]
    fn invalidating_an_item_leaves_the_list_alone() {
        let env = env();
        let state = loaded_state(&env);

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(state)
            .when_action(QueryAction::Invalidate { prefix: item_key(1) })
            .then_state(|state| {
                assert!(state.get(&item_key(1)).unwrap().stale);
                assert!(state.get(&list_key()).unwrap().is_fresh());
            })
            .then_effects(|effects| assert_no_effects(effects))
            .run();
    }

    #[test]
    fn stale_response_after_mutation_does_not_refresh() {
        let env = env();
        let early = env.sequence.next();

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(QueryState::new())
            .when_action(QueryAction::FetchStarted { key: list_key(), seq: early })
            .when_action(QueryAction::Created { entity: meal(3, "Varenyky") })
            .when_action(QueryAction::FetchResolved {
                key: list_key(),
                seq: early,
                result: Ok(Fetched::List(vec![meal(1, "Oatmeal")])),
            })
            .then_state(|state| {
                let list: &CacheEntry<Meal> = state.get(&list_key()).unwrap();
                assert!(list.has_data());
                assert!(list.stale);
                assert!(!list.is_fresh());
            })
            .then_navigates(&[])
            .run();
    }

    proptest! {
        #[test]
        fn newest_fetch_wins_in_any_arrival_order(
            order in Just((0..6_usize).collect::<Vec<_>>()).prop_shuffle(),
            failed in proptest::collection::vec(any::<bool>(), 6),
        ) {
            let env = env();
            let reducer = QueryReducer::<Meals>::new();
            let mut state = QueryState::new();

            let seqs: Vec<u64> = (0..6).map(|_| env.sequence.next()).collect();
            for &seq in &seqs {
                reducer.reduce(&mut state, QueryAction::FetchStarted { key: item_key(1), seq }, &env);
            }

            for index in order {
                let seq = seqs[index];
                let result = if failed[index] {
                    Err(ApiError::Network(format!("reset {seq}")))
                } else {
                    Ok(Fetched::Item(meal(1, &format!("v{seq}"))))
                };
                reducer.reduce(
                    &mut state,
                    QueryAction::FetchResolved { key: item_key(1), seq, result },
                    &env,
                );
            }

            let entry = state.get(&item_key(1)).unwrap();
            prop_assert!(entry.in_flight.is_empty());
            prop_assert_ne!(entry.status, QueryStatus::Loading);

            let newest_success = (0..6).rev().find(|&i| !failed[i]).map(|i| seqs[i]);
            match newest_success {
                Some(newest) => {
                    prop_assert_eq!(entry.data_seq, newest);
                    prop_assert_eq!(
                        entry.data.clone(),
                        Some(Fetched::Item(meal(1, &format!("v{newest}"))))
                    );
                },
                None => {
                    prop_assert_eq!(entry.status, QueryStatus::Error);
                    prop_assert!(entry.data.is_none());
                },
            }
            if !failed[5] {
                prop_assert_eq!(entry.status, QueryStatus::Success);
            }
        }
    }

    #[test]
    fn list_refetch_drops_stale_items_it_no_longer_lists() {
        let env = env();
        let state = loaded_state(&env);
        // Three loads, then the revalidation the invalidation issues
        let seq = 4;

        ReducerTest::new(QueryReducer::<Meals>::new())
            .with_env(env)
            .given_state(state)
            .when_action(QueryAction::Invalidate { prefix: list_key() })
            .when_action(QueryAction::FetchResolved {
                key: list_key(),
                seq,
                result: Ok(Fetched::List(vec![meal(1, "Oatmeal")])),
            })
            .then_state(|state| {
                assert!(state.get(&item_key(1)).is_some());
                assert!(state.get(&item_key(2)).is_none());
                assert!(state.get(&list_key()).unwrap().is_fresh());
            })
            .run();
    }
}
