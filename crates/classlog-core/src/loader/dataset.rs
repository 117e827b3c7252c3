use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use super::progress::{NoProgress, ProgressStep};
use super::store::EntityStore;
use crate::api::{fetch_json, Fetcher};
use crate::auth::AccessSignal;
use crate::cache::ExpiringCache;
use crate::models::Dataset;

/// Upper bound on item fetches in flight for one dataset.
const MAX_CONCURRENT_FETCHES: usize = 16;

/// Loads one dataset kind: index file, then every item file it lists.
///
/// Results are layered: the in-memory `EntityStore` first, then the
/// persisted `ExpiringCache`, then the network.
pub struct DatasetLoader<'s, T> {
    fetcher: &'s dyn Fetcher,
    cache: &'s ExpiringCache,
    access: &'s AccessSignal,
    store: &'s EntityStore<T>,
    expire: Duration,
}

impl<'s, T: Dataset> DatasetLoader<'s, T> {
    pub fn new(
        fetcher: &'s dyn Fetcher,
        cache: &'s ExpiringCache,
        access: &'s AccessSignal,
        store: &'s EntityStore<T>,
        expire: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache,
            access,
            store,
            expire,
        }
    }

    /// True when loading needs no network: the items are in memory or the
    /// persisted copy is still fresh.
    pub fn is_ready(&self) -> bool {
        self.store.is_loaded() || self.cache.is_fresh(T::KIND.cache_key(), self.expire)
    }

    pub async fn load_all(&self) -> Result<Arc<Vec<T>>> {
        self.load(None, &NoProgress).await
    }

    /// Like `load_all`, calling `on_step` once per item file fetched.
    pub async fn load_all_with(&self, on_step: &dyn ProgressStep) -> Result<Arc<Vec<T>>> {
        self.load(None, on_step).await
    }

    /// Load using an index the caller already fetched.
    pub(crate) async fn load_prefetched(
        &self,
        index: Vec<String>,
        on_step: &dyn ProgressStep,
    ) -> Result<Arc<Vec<T>>> {
        self.load(Some(index), on_step).await
    }

    async fn load(&self, index: Option<Vec<String>>, on_step: &dyn ProgressStep) -> Result<Arc<Vec<T>>> {
        if let Some(items) = self.store.items() {
            return Ok(items);
        }

        let this = self;
        self.store
            .get_or_load(move || async move {
                this.cache
                    .load_with_cache(T::KIND.cache_key(), this.expire, move || {
                        this.fetch_all(index, on_step)
                    })
                    .await
            })
            .await
            .with_context(|| format!("Failed to load {}", T::KIND))
    }

    /// Fetch the index file: the item file names, in display order.
    pub async fn fetch_index(&self) -> Result<Vec<String>> {
        self.access.wait().await;
        let path = T::KIND.index_path();
        fetch_json(self.fetcher, path)
            .await
            .with_context(|| format!("Failed to fetch {} index", T::KIND))
    }

    async fn fetch_all(&self, index: Option<Vec<String>>, on_step: &dyn ProgressStep) -> Result<Vec<T>> {
        let files = match index {
            Some(files) => files,
            None => self.fetch_index().await?,
        };
        self.access.wait().await;

        let kind = T::KIND;
        debug!(%kind, count = files.len(), "Fetching items");

        // Each fetch carries its index position, so ids never depend on
        // which response arrives first
        let fetches = files.into_iter().enumerate().map(|(position, file)| async move {
            let path = kind.item_path(&file);
            let item: T = fetch_json(self.fetcher, &path)
                .await
                .with_context(|| format!("Failed to fetch {} item {}", kind, path))?;
            on_step.step();
            Ok::<_, anyhow::Error>((position, item))
        });

        let fetched: Vec<(usize, T)> = stream::iter(fetches)
            .buffered(MAX_CONCURRENT_FETCHES)
            .try_collect()
            .await?;

        let items: Vec<T> = fetched
            .into_iter()
            .map(|(position, mut item)| {
                item.assign_derived_id(position + 1);
                item
            })
            .collect();

        warn_duplicate_ids(&items);
        info!(%kind, count = items.len(), "Dataset loaded");
        Ok(items)
    }
}

/// Every item file is kept, even when ids repeat; repeats are only logged.
fn warn_duplicate_ids<T: Dataset>(items: &[T]) {
    let mut seen = HashSet::new();
    for item in items {
        let id = item.id();
        if !id.is_empty() && !seen.insert(id) {
            warn!(kind = %T::KIND, id, "Duplicate id");
        }
    }
}
