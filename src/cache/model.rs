/// The most recent successfully fetched value for one cache key. Overwritten
/// wholesale on every refresh, never patched in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub cached_at_ms: i64,
}

/// What a cache lookup hands back to callers: the value plus enough metadata
/// to expose staleness and remaining lifetime to the HTTP layer.
#[derive(Debug, Clone)]
pub struct CachedValue<T> {
    pub value: T,
    pub cached_at_ms: i64,
    pub ttl_ms: i64,
    /// True when the value outlived its TTL and is only being served because
    /// the refresh attempt failed.
    pub stale: bool,
}

impl<T> CachedValue<T> {
    /// Seconds a downstream cache may hold this response. Stale responses get
    /// half the configured TTL so clients come back sooner.
    pub fn max_age_secs(&self, now_ms: i64) -> i64 {
        if self.stale {
            return self.ttl_ms / 2000;
        }
        let remaining_ms = self.cached_at_ms + self.ttl_ms - now_ms;
        remaining_ms.max(0) / 1000
    }
}
