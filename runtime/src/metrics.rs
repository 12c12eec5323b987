//! Metric names and descriptions.
//!
//! Counters are recorded through the `metrics` facade. Nothing is exported
//! unless the host process installs a recorder.

use mealdesk_core::ResourceKind;
use metrics::describe_counter;

/// Reads served from a fresh cache entry
pub const CACHE_HITS: &str = "mealdesk_cache_hits_total";

/// Reads that went to the API
pub const CACHE_MISSES: &str = "mealdesk_cache_misses_total";

/// Sessions cleared by an authorization failure
pub const AUTH_EXPIRED: &str = "mealdesk_auth_expired_total";

/// Responses dropped because newer data or a newer fetch existed
pub const STALE_RESPONSES: &str = "mealdesk_stale_responses_total";

/// Register all metric descriptions.
///
/// Safe to call more than once.
pub fn describe_metrics() {
    describe_counter!(CACHE_HITS, "Reads served from a fresh cache entry");
    describe_counter!(CACHE_MISSES, "Reads that fetched from the API");
    describe_counter!(
        AUTH_EXPIRED,
        "Authorization failures that cleared the session"
    );
    describe_counter!(
        STALE_RESPONSES,
        "Responses discarded in favor of newer cache data"
    );
}

pub(crate) fn record_cache_hit(resource: ResourceKind) {
    metrics::counter!(CACHE_HITS, "resource" => resource.as_str()).increment(1);
}

pub(crate) fn record_cache_miss(resource: ResourceKind) {
    metrics::counter!(CACHE_MISSES, "resource" => resource.as_str()).increment(1);
}
