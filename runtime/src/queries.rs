//! Cache-aware reads and mutations for one resource type.

use crate::cache::{CacheEntry, Fetched, QueryKey, QuerySnapshot, QueryState};
use crate::config::QueryConfig;
use crate::metrics::{record_cache_hit, record_cache_miss};
use crate::reducer::{QueryAction, QueryEnvironment, QueryReducer, QueryStore};
use crate::sequence::Sequence;
use mealdesk_client::{Accepted, ResourceApi};
use mealdesk_core::environment::Clock;
use mealdesk_core::{ApiError, EntityId, Resource};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Query and mutation surface the views use for resource `R`
///
/// Reads are served from the cache while the entry is fresh and fetched
/// otherwise. Mutations call the API and then wait until the cache has
/// been invalidated, the list revalidated and any navigation performed.
pub struct ResourceQueries<R: Resource> {
    store: QueryStore<R>,
    api: ResourceApi<R>,
    sequence: Sequence,
}

impl<R: Resource> ResourceQueries<R> {
    /// Create the cache for `R`
    ///
    /// `sequence` must be the one shared by every cache in the process.
    #[must_use]
    pub fn new(
        api: ResourceApi<R>,
        clock: Arc<dyn Clock>,
        sequence: Sequence,
        config: QueryConfig,
    ) -> Self {
        let navigator = Arc::clone(api.client().navigator());
        let environment = QueryEnvironment::new(api.clone(), clock, sequence.clone(), config);
        let store = QueryStore::<R>::new(QueryState::new(), QueryReducer::new(), environment)
            .with_navigator(navigator);

        Self {
            store,
            api,
            sequence,
        }
    }

    /// Wire operations without caching
    #[must_use]
    pub const fn api(&self) -> &ResourceApi<R> {
        &self.api
    }

    /// Every entity of this resource
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the fetch when the cache could not serve
    /// the read.
    #[tracing::instrument(skip(self), fields(resource = %R::KIND))]
    pub async fn list(&self) -> Result<Vec<R::Entity>, ApiError> {
        let key = QueryKey::list(R::KIND);

        let cached = self
            .store
            .state(|state| {
                fresh(state, &key).and_then(|data| match data {
                    Fetched::List(items) => Some(items.clone()),
                    Fetched::Item(_) => None,
                })
            })
            .await;

        if let Some(items) = cached {
            record_cache_hit(R::KIND);
            return Ok(items);
        }

        record_cache_miss(R::KIND);
        self.fetch(key, self.api.list(), Fetched::List).await
    }

    /// One entity by id
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] when the API has no such entity, or any
    /// other [`ApiError`] of the fetch.
    #[tracing::instrument(skip(self), fields(resource = %R::KIND))]
    pub async fn get(&self, id: &EntityId) -> Result<R::Entity, ApiError> {
        let key = QueryKey::item(R::KIND, id.clone());

        let cached = self
            .store
            .state(|state| {
                fresh(state, &key).and_then(|data| match data {
                    Fetched::Item(entity) => Some(entity.clone()),
                    Fetched::List(_) => None,
                })
            })
            .await;

        if let Some(entity) = cached {
            record_cache_hit(R::KIND);
            return Ok(entity);
        }

        record_cache_miss(R::KIND);
        self.fetch(key, self.api.get(id), Fetched::Item).await
    }

    /// Cached state of the list query, without fetching
    pub async fn list_snapshot(&self) -> QuerySnapshot<Vec<R::Entity>> {
        let key = QueryKey::list(R::KIND);
        self.store
            .state(|state| {
                state
                    .get(&key)
                    .map_or_else(QuerySnapshot::idle, CacheEntry::list_snapshot)
            })
            .await
    }

    /// Cached state of one entity, without fetching
    pub async fn item_snapshot(&self, id: &EntityId) -> QuerySnapshot<R::Entity> {
        let key = QueryKey::item(R::KIND, id.clone());
        self.store
            .state(|state| {
                state
                    .get(&key)
                    .map_or_else(QuerySnapshot::idle, CacheEntry::item_snapshot)
            })
            .await
    }

    /// Create an entity
    ///
    /// On success the caches are invalidated, a loaded list is refetched,
    /// and the navigator is sent to the list route before this returns.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] without a request if the draft is invalid
    /// - [`ApiError::Conflict`] for a duplicate; nothing is invalidated and
    ///   no navigation happens
    /// - [`ApiError::Decode`] if the server accepted the draft but its
    ///   response is unreadable; the caches are still invalidated
    /// - any other [`ApiError`] of the request
    #[tracing::instrument(skip(self, draft), fields(resource = %R::KIND))]
    pub async fn create(&self, draft: &R::Draft) -> Result<R::Entity, ApiError> {
        let entity = self.accepted(self.api.create_accepted(draft).await?).await?;
        self.dispatch(QueryAction::Created {
            entity: entity.clone(),
        })
        .await;
        Ok(entity)
    }

    /// Apply a sparse patch
    ///
    /// On success the returned entity is cached under its id, so the next
    /// [`get`](Self::get) needs no request.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create), plus [`ApiError::NotFound`].
    #[tracing::instrument(skip(self, patch), fields(resource = %R::KIND))]
    pub async fn update(&self, id: &EntityId, patch: &R::Patch) -> Result<R::Entity, ApiError> {
        let entity = self.accepted(self.api.update_accepted(id, patch).await?).await?;
        self.dispatch(QueryAction::Updated {
            entity: entity.clone(),
        })
        .await;
        Ok(entity)
    }

    /// Delete an entity
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of the request; the cache is untouched then.
    #[tracing::instrument(skip(self), fields(resource = %R::KIND))]
    pub async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        self.api.delete(id).await?;
        self.dispatch(QueryAction::Deleted { id: id.clone() }).await;
        Ok(())
    }

    /// Ask `confirm` with this resource's prompt, then delete
    ///
    /// Returns `Ok(false)` without a request when the user declines.
    ///
    /// # Errors
    ///
    /// Same as [`delete`](Self::delete).
    pub async fn delete_confirmed(
        &self,
        id: &EntityId,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<bool, ApiError> {
        if !confirm(R::KIND.delete_prompt()) {
            tracing::debug!(resource = %R::KIND, %id, "Delete declined");
            return Ok(false);
        }

        self.delete(id).await?;
        Ok(true)
    }

    /// Mark every cached entry of this resource stale
    ///
    /// A loaded list is refetched before this returns.
    pub async fn invalidate_all(&self) {
        self.dispatch(QueryAction::Invalidate {
            prefix: QueryKey::list(R::KIND),
        })
        .await;
    }

    /// Stop accepting actions and wait for in-flight refetches
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`](crate::StoreError::ShutdownTimeout)
    /// if refetches are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), crate::StoreError> {
        self.store.shutdown(timeout).await
    }

    /// Record the fetch in the cache around `request`
    async fn fetch<T: Clone>(
        &self,
        key: QueryKey,
        request: impl Future<Output = Result<T, ApiError>>,
        wrap: fn(T) -> Fetched<R::Entity>,
    ) -> Result<T, ApiError> {
        let seq = self.sequence.next();
        self.dispatch(QueryAction::FetchStarted {
            key: key.clone(),
            seq,
        })
        .await;

        let result = request.await;

        self.dispatch(QueryAction::FetchResolved {
            key,
            seq,
            result: result.clone().map(wrap),
        })
        .await;

        result
    }

    /// Pass an accepted mutation's entity through
    ///
    /// Without a readable entity there is nothing to seed, but the server
    /// changed, so the whole resource is invalidated before the error is
    /// returned.
    async fn accepted(&self, response: Accepted<R::Entity>) -> Result<R::Entity, ApiError> {
        if let Err(error) = &response {
            tracing::warn!(
                resource = %R::KIND,
                %error,
                "Mutation accepted with an unreadable response"
            );
            self.invalidate_all().await;
        }
        response
    }

    /// Send `action` and wait for every effect it produced
    async fn dispatch(&self, action: QueryAction<R::Entity>) {
        match self.store.send(action).await {
            Ok(mut handle) => handle.wait().await,
            Err(error) => {
                tracing::error!(resource = %R::KIND, %error, "Query cache rejected action");
            },
        }
    }
}

fn fresh<'a, E>(state: &'a QueryState<E>, key: &QueryKey) -> Option<&'a Fetched<E>> {
    state
        .get(key)
        .filter(|entry| entry.is_fresh())
        .and_then(|entry| entry.data.as_ref())
}

impl<R: Resource> Clone for ResourceQueries<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            api: self.api.clone(),
            sequence: self.sequence.clone(),
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceQueries<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceQueries")
            .field("resource", &R::KIND)
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}
