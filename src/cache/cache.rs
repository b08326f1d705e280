use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use crate::cache::model::{CacheEntry, CachedValue};

type Slot<T> = Arc<AsyncMutex<Option<CacheEntry<T>>>>;

/// Keyed cache-aside layer with a fixed TTL per instance.
///
/// Lookups go through [FreshnessCache::get_with]: a fresh entry is returned
/// as-is, an expired (or missing) entry triggers the supplied fetch, and a
/// failed fetch falls back to whatever entry is still around, however old.
/// Entries live for the process lifetime; the only eviction is overwrite.
///
/// Each key owns an async mutex that is held across the refresh, so
/// concurrent lookups for the same key cannot stampede the upstream: one
/// caller fetches, the rest queue on the lock and find a fresh entry when
/// they get it.
pub struct FreshnessCache<T> {
    name: &'static str,
    ttl_ms: i64,
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T: Clone> FreshnessCache<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        FreshnessCache {
            name,
            ttl_ms: ttl.as_millis() as i64,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_with<E, F, Fut>(&self, key: &str, fetch: F) -> Result<CachedValue<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        if let Some(current) = entry.as_ref() {
            if Utc::now().timestamp_millis() - current.cached_at_ms < self.ttl_ms {
                debug!("{}: serving '{}' from cache", self.name, key);
                return Ok(self.wrap(current, false));
            }
        }

        debug!("{}: refreshing '{}'", self.name, key);
        match fetch().await {
            Ok(value) => {
                let fresh = CacheEntry {
                    value,
                    cached_at_ms: Utc::now().timestamp_millis(),
                };
                let out = self.wrap(&fresh, false);
                *entry = Some(fresh);
                Ok(out)
            }
            Err(err) => match entry.as_ref() {
                Some(old) => {
                    warn!("{}: refresh of '{}' failed, serving stale entry", self.name, key);
                    Ok(self.wrap(old, true))
                }
                None => Err(err),
            },
        }
    }

    fn slot(&self, key: &str) -> Slot<T> {
        let mut slots = self.slots.lock().unwrap();
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(None)))
            .clone()
    }

    fn wrap(&self, entry: &CacheEntry<T>, stale: bool) -> CachedValue<T> {
        CachedValue {
            value: entry.value.clone(),
            cached_at_ms: entry.cached_at_ms,
            ttl_ms: self.ttl_ms,
            stale,
        }
    }
}
