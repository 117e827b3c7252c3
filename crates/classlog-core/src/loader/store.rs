use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::OnceCell;

/// Load-once holder for one dataset kind's items.
///
/// The first successful load is kept for the life of the store. Callers
/// that arrive while a load is in flight wait for it instead of starting
/// their own; if it fails, the next caller starts a fresh attempt.
#[derive(Debug)]
pub struct EntityStore<T> {
    items: OnceCell<Arc<Vec<T>>>,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            items: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.items.initialized()
    }

    /// The loaded items, shared read-only.
    pub fn items(&self) -> Option<Arc<Vec<T>>> {
        self.items.get().cloned()
    }

    pub async fn get_or_load<F, Fut>(&self, load: F) -> Result<Arc<Vec<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        self.items
            .get_or_try_init(|| async move { load().await.map(Arc::new) })
            .await
            .cloned()
    }
}
