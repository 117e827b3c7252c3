//! Local caching of loaded datasets.
//!
//! This module provides the `ExpiringCache`, which persists each dataset
//! as serialized JSON together with its load time and serves it back until
//! the entry is older than the caller's time-to-live. Storage goes through
//! the `KeyValueStore` trait so the same cache runs on disk (`FileStore`)
//! or in memory (`MemoryStore`).

pub mod clock;
pub mod manager;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{age_display, CacheError, ExpiringCache, DEFAULT_EXPIRE_HOURS, NAMESPACE};
pub use store::{FileStore, KeyValueStore, MemoryStore};
