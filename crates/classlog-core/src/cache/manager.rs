use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{Clock, KeyValueStore};

/// Prefix separating this application's entries from anything else sharing
/// the store.
pub const NAMESPACE: &str = "classRecord_";

/// Datasets are refreshed once a day.
pub const DEFAULT_EXPIRE_HOURS: i64 = 24;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache key must not be empty")]
    MissingKey,
}

/// Persisted payloads with a time-to-live, keyed by dataset.
///
/// Each key owns two store entries: `classRecord_<key>_data` with the JSON
/// payload and `classRecord_<key>_time` with the load time in epoch
/// milliseconds.
#[derive(Clone)]
pub struct ExpiringCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl ExpiringCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    fn data_key(key: &str) -> String {
        format!("{}{}_data", NAMESPACE, key)
    }

    fn time_key(key: &str) -> String {
        format!("{}{}_time", NAMESPACE, key)
    }

    /// Return the cached payload for `key` if it is younger than `expire`,
    /// otherwise run `loader`, persist its result and return it.
    ///
    /// Nothing is written when the loader fails. An empty key is rejected
    /// before the store or the loader is touched.
    pub async fn load_with_cache<T, F, Fut>(&self, key: &str, expire: Duration, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if key.is_empty() {
            return Err(CacheError::MissingKey.into());
        }

        if let Some(payload) = self.read_fresh::<T>(key, expire) {
            debug!(cache = key, "Cache hit");
            return Ok(payload);
        }

        debug!(cache = key, "Cache miss");
        self.evict(key)?;

        let payload = loader().await?;
        self.write(key, &payload)?;
        Ok(payload)
    }

    /// True iff an entry exists for `key` and is younger than `expire`.
    pub fn is_fresh(&self, key: &str, expire: Duration) -> bool {
        match self.age_millis(key) {
            Some(age) => age < expire.num_milliseconds(),
            None => false,
        }
    }

    /// Milliseconds since `key` was stored. Entries stamped in the future
    /// (clock skew) report zero.
    pub fn age_millis(&self, key: &str) -> Option<i64> {
        let stamp = match self.store.get(&Self::time_key(key)) {
            Ok(Some(stamp)) => stamp,
            Ok(None) => return None,
            Err(e) => {
                debug!(cache = key, error = %e, "Failed to read cache timestamp");
                return None;
            }
        };
        match stamp.trim().parse::<i64>() {
            Ok(stored) => Some((self.clock.now_millis() - stored).max(0)),
            Err(_) => {
                warn!(cache = key, stamp = %stamp, "Unreadable cache timestamp");
                None
            }
        }
    }

    fn read_fresh<T: DeserializeOwned>(&self, key: &str, expire: Duration) -> Option<T> {
        if !self.is_fresh(key, expire) {
            return None;
        }
        let raw = match self.store.get(&Self::data_key(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(cache = key, error = %e, "Failed to read cache payload");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(cache = key, error = %e, "Corrupt cache payload, reloading");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, key: &str, payload: &T) -> Result<()> {
        let contents = serde_json::to_string(payload)?;
        self.store.set(&Self::data_key(key), &contents)?;
        self.store
            .set(&Self::time_key(key), &self.clock.now_millis().to_string())?;
        Ok(())
    }

    fn evict(&self, key: &str) -> Result<()> {
        self.store.remove(&Self::data_key(key))?;
        self.store.remove(&Self::time_key(key))?;
        Ok(())
    }

    /// Remove every entry under this cache's namespace. Returns how many
    /// store entries were deleted.
    pub fn clear_all(&self) -> Result<usize> {
        let mut removed = 0;
        for key in self.store.keys()? {
            if key.starts_with(NAMESPACE) {
                self.store.remove(&key)?;
                removed += 1;
            }
        }
        debug!(removed, "Cache cleared");
        Ok(removed)
    }
}

/// Human readable age, e.g. "5m ago" or "2h ago".
pub fn age_display(age_millis: i64) -> String {
    let minutes = age_millis / 60_000;
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
