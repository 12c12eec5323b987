//! Query cache state.
//!
//! One [`QueryState`] per resource type maps [`QueryKey`]s to
//! [`CacheEntry`]s. Entries never change on their own: the
//! [`QueryReducer`](crate::QueryReducer) applies fetch, resolve,
//! invalidate and seed transitions to them.

use chrono::{DateTime, Utc};
use mealdesk_core::{ApiError, EntityId, ResourceKind};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Resource type plus optional id
///
/// A key without an id is the list key and also the prefix of every key
/// of that resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// Resource type
    pub resource: ResourceKind,
    /// Entity id for detail queries
    pub id: Option<EntityId>,
}

impl QueryKey {
    /// Key of the resource's list
    #[must_use]
    pub const fn list(resource: ResourceKind) -> Self {
        Self { resource, id: None }
    }

    /// Key of one entity
    #[must_use]
    pub const fn item(resource: ResourceKind, id: EntityId) -> Self {
        Self {
            resource,
            id: Some(id),
        }
    }

    /// Whether this key falls under `prefix`
    #[must_use]
    pub fn matches(&self, prefix: &Self) -> bool {
        self.resource == prefix.resource && (prefix.id.is_none() || prefix.id == self.id)
    }

    /// Whether this is a list key
    #[must_use]
    pub const fn is_list(&self) -> bool {
        self.id.is_none()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{id}", self.resource),
            None => write!(f, "{}", self.resource),
        }
    }
}

/// Lifecycle of one query
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched
    Idle,
    /// A fetch is in flight
    Loading,
    /// Last applied fetch succeeded
    Success,
    /// Last applied fetch failed
    Error,
}

/// Data held by an entry
#[derive(Clone, Debug, PartialEq)]
pub enum Fetched<E> {
    /// Result of a list query
    List(Vec<E>),
    /// Result of a detail query, or a seeded entity
    Item(E),
}

/// Why a response was not applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discarded {
    /// The entry already holds newer data
    Superseded,
    /// A newer fetch for the entry is still in flight
    Outpaced,
}

/// Cached value plus the bookkeeping that orders writes
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry<E> {
    /// Lifecycle
    pub status: QueryStatus,
    /// Last applied data
    pub data: Option<Fetched<E>>,
    /// Error of the last applied failed fetch
    pub error: Option<ApiError>,
    /// Data must be refetched before it is trusted
    pub stale: bool,
    /// Sequence number of `data`; zero when empty
    pub data_seq: u64,
    /// Highest sequence number of a fetch or seed issued for this entry
    pub latest_seq: u64,
    /// Sequence value at the last invalidation
    pub invalidated_at: u64,
    /// Fetches issued and not yet resolved
    pub in_flight: BTreeSet<u64>,
    /// When `data` was written
    pub updated_at: Option<DateTime<Utc>>,
}

impl<E> CacheEntry<E> {
    /// Entry that was never fetched
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            stale: false,
            data_seq: 0,
            latest_seq: 0,
            invalidated_at: 0,
            in_flight: BTreeSet::new(),
            updated_at: None,
        }
    }

    /// Data can be served without a request
    #[must_use]
    pub const fn is_fresh(&self) -> bool {
        matches!(self.status, QueryStatus::Success) && !self.stale && self.data.is_some()
    }

    /// A fetch numbered `seq` was issued
    pub fn begin_fetch(&mut self, seq: u64) {
        self.status = QueryStatus::Loading;
        self.latest_seq = self.latest_seq.max(seq);
        self.in_flight.insert(seq);
    }

    fn newer_in_flight(&self, seq: u64) -> bool {
        self.in_flight.range(seq + 1..).next().is_some()
    }

    /// Leave `Loading` once nothing newer than the held data is in flight
    fn settle(&mut self) {
        if self.status == QueryStatus::Loading && !self.newer_in_flight(self.data_seq) {
            self.status = if self.data.is_some() {
                QueryStatus::Success
            } else {
                QueryStatus::Error
            };
        }
    }

    /// Apply the response of fetch `seq`
    ///
    /// Data is applied when it is newer than the data held; it stays stale
    /// when the fetch was issued before the last invalidation, and the entry
    /// keeps loading while a newer fetch is unresolved. An error is applied
    /// only when no newer fetch was issued.
    ///
    /// # Errors
    ///
    /// Returns why the response was discarded.
    pub fn resolve(
        &mut self,
        seq: u64,
        result: Result<Fetched<E>, ApiError>,
        now: DateTime<Utc>,
    ) -> Result<(), Discarded> {
        self.in_flight.remove(&seq);
        if seq <= self.data_seq {
            self.settle();
            return Err(Discarded::Superseded);
        }

        match result {
            Ok(data) => {
                self.data = Some(data);
                self.data_seq = seq;
                self.error = None;
                self.updated_at = Some(now);
                self.stale = seq <= self.invalidated_at;
                self.status = if self.newer_in_flight(seq) {
                    QueryStatus::Loading
                } else {
                    QueryStatus::Success
                };
                Ok(())
            },
            Err(error) => {
                if seq < self.latest_seq {
                    self.settle();
                    return Err(Discarded::Outpaced);
                }
                self.error = Some(error);
                self.status = QueryStatus::Error;
                Ok(())
            },
        }
    }

    /// Mark stale; fetches issued at or before `cutoff` cannot refresh it
    ///
    /// Idempotent.
    pub fn invalidate(&mut self, cutoff: u64) {
        self.stale = true;
        self.invalidated_at = self.invalidated_at.max(cutoff);
    }

    /// Write a fresh entity numbered `seq`
    ///
    /// Returns `false` if the entry already holds newer data.
    pub fn seed(&mut self, seq: u64, entity: E, now: DateTime<Utc>) -> bool {
        if seq <= self.data_seq {
            return false;
        }

        self.data = Some(Fetched::Item(entity));
        self.data_seq = seq;
        self.latest_seq = self.latest_seq.max(seq);
        self.error = None;
        self.stale = seq <= self.invalidated_at;
        self.status = QueryStatus::Success;
        self.updated_at = Some(now);
        true
    }

    /// Whether the entry ever held data
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

impl<E> Default for CacheEntry<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Every entry of one resource type
#[derive(Clone, Debug, PartialEq)]
pub struct QueryState<E> {
    entries: HashMap<QueryKey, CacheEntry<E>>,
}

impl<E> QueryState<E> {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Entry for `key`
    #[must_use]
    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry<E>> {
        self.entries.get(key)
    }

    /// Mutable entry for `key`
    pub fn get_mut(&mut self, key: &QueryKey) -> Option<&mut CacheEntry<E>> {
        self.entries.get_mut(key)
    }

    /// Entry for `key`, created idle if missing
    pub fn entry(&mut self, key: QueryKey) -> &mut CacheEntry<E> {
        self.entries.entry(key).or_default()
    }

    /// Drop the entry for `key`
    pub fn remove(&mut self, key: &QueryKey) -> Option<CacheEntry<E>> {
        self.entries.remove(key)
    }

    /// Drop stale, idle-network item entries of `resource` whose id is not
    /// in `listed`
    ///
    /// Keeps item entries bounded by what the server still lists. Returns
    /// how many were dropped.
    pub fn prune_unlisted(&mut self, resource: ResourceKind, listed: &HashSet<EntityId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let Some(id) = &key.id else {
                return true;
            };
            key.resource != resource
                || listed.contains(id)
                || !entry.stale
                || !entry.in_flight.is_empty()
        });
        before - self.entries.len()
    }

    /// Entries whose keys fall under `prefix`
    pub fn matching_mut<'a>(
        &'a mut self,
        prefix: &'a QueryKey,
    ) -> impl Iterator<Item = (&'a QueryKey, &'a mut CacheEntry<E>)> + 'a {
        self.entries
            .iter_mut()
            .filter(move |(key, _)| key.matches(prefix))
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for QueryState<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a view needs to render one query, without triggering a fetch
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySnapshot<T> {
    /// Lifecycle
    pub status: QueryStatus,
    /// Last applied data
    pub data: Option<T>,
    /// Error of the last failed fetch
    pub error: Option<ApiError>,
    /// Data must be refetched before it is trusted
    pub is_stale: bool,
    /// When `data` was written
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QuerySnapshot<T> {
    /// Snapshot of a query that was never issued
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_stale: false,
            updated_at: None,
        }
    }

    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.status, QueryStatus::Loading)
    }
}

impl<E: Clone> CacheEntry<E> {
    /// Snapshot of the list data
    #[must_use]
    pub fn list_snapshot(&self) -> QuerySnapshot<Vec<E>> {
        self.snapshot(|data| match data {
            Fetched::List(items) => Some(items.clone()),
            Fetched::Item(_) => None,
        })
    }

    /// Snapshot of the item data
    #[must_use]
    pub fn item_snapshot(&self) -> QuerySnapshot<E> {
        self.snapshot(|data| match data {
            Fetched::Item(item) => Some(item.clone()),
            Fetched::List(_) => None,
        })
    }

    fn snapshot<T>(&self, project: impl FnOnce(&Fetched<E>) -> Option<T>) -> QuerySnapshot<T> {
        QuerySnapshot {
            status: self.status,
            data: self.data.as_ref().and_then(project),
            error: self.error.clone(),
            is_stale: self.stale,
            updated_at: self.updated_at,
        }
    }
}
