//! Session context: everything one browsing session shares.
//!
//! A `Session` owns the transport, the persisted cache, the access gate and
//! one in-memory store per dataset kind. Views borrow loaders and indexes
//! from it instead of reaching for globals.

use std::sync::{Arc, OnceLock};

use anyhow::Result;
use chrono::Duration;
use tracing::debug;

use crate::api::{DirFetcher, Fetcher, HttpFetcher};
use crate::auth::AccessGate;
use crate::cache::{
    age_display, Clock, ExpiringCache, FileStore, KeyValueStore, SystemClock, DEFAULT_EXPIRE_HOURS,
};
use crate::config::{Config, DataSource};
use crate::loader::{self, DatasetLoader, EntityStore, ProgressReporter};
use crate::models::{Dataset, DatasetKind, GlossaryTerm, Person, Record};
use crate::xref::CrossReferenceIndex;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// How long persisted datasets stay fresh.
    pub expire: Duration,
    /// Hex SHA-256 of the access key; `None` uses the stock key.
    pub access_key_hash: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            expire: Duration::hours(DEFAULT_EXPIRE_HOURS),
            access_key_hash: None,
        }
    }
}

pub struct Session {
    fetcher: Arc<dyn Fetcher>,
    cache: ExpiringCache,
    gate: AccessGate,
    expire: Duration,
    records: EntityStore<Record>,
    people: EntityStore<Person>,
    glossary: EntityStore<GlossaryTerm>,
    xref: OnceLock<Arc<CrossReferenceIndex>>,
}

impl Session {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        options: SessionOptions,
    ) -> Self {
        Self {
            fetcher,
            cache: ExpiringCache::new(store.clone(), clock),
            gate: AccessGate::new(store, options.access_key_hash),
            expire: options.expire,
            records: EntityStore::new(),
            people: EntityStore::new(),
            glossary: EntityStore::new(),
            xref: OnceLock::new(),
        }
    }

    /// Session reading from the configured data source and caching on disk.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher> = match config.data_source()? {
            DataSource::Url(url) => Arc::new(HttpFetcher::new(&url)?),
            DataSource::Dir(dir) => Arc::new(DirFetcher::new(dir)),
        };
        let cache_dir = config.cache_dir()?;
        debug!(?cache_dir, "Cache directory configured");
        let store = Arc::new(FileStore::new(cache_dir)?);

        Ok(Self::new(
            fetcher,
            store,
            Arc::new(SystemClock),
            SessionOptions {
                expire: config.cache_expire(),
                access_key_hash: config.access_key_hash.clone(),
            },
        ))
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn cache(&self) -> &ExpiringCache {
        &self.cache
    }

    pub fn expire(&self) -> Duration {
        self.expire
    }

    fn loader<'s, T: Dataset>(&'s self, store: &'s EntityStore<T>) -> DatasetLoader<'s, T> {
        DatasetLoader::new(
            self.fetcher.as_ref(),
            &self.cache,
            self.gate.signal(),
            store,
            self.expire,
        )
    }

    pub fn records(&self) -> DatasetLoader<'_, Record> {
        self.loader(&self.records)
    }

    pub fn people(&self) -> DatasetLoader<'_, Person> {
        self.loader(&self.people)
    }

    pub fn glossary(&self) -> DatasetLoader<'_, GlossaryTerm> {
        self.loader(&self.glossary)
    }

    /// True when loading everything would hit the network, i.e. a loading
    /// indicator is worth showing.
    pub fn needs_load(&self) -> bool {
        !(self.records().is_ready() && self.people().is_ready() && self.glossary().is_ready())
    }

    /// See [`loader::ensure_all_loaded`].
    pub async fn ensure_all_loaded(&self, progress: Option<&dyn ProgressReporter>) -> Result<()> {
        loader::ensure_all_loaded(self, progress).await
    }

    /// Cross-reference index over this session's records, built once.
    pub async fn cross_references(&self) -> Result<Arc<CrossReferenceIndex>> {
        let records = self.records().load_all().await?;
        let xref = self
            .xref
            .get_or_init(|| Arc::new(CrossReferenceIndex::new(records.clone())));
        Ok(xref.clone())
    }

    /// Drop every persisted dataset. Items already loaded in this session
    /// stay; a new session sees the cleared cache.
    pub fn clear_cache(&self) -> Result<usize> {
        self.cache.clear_all()
    }

    /// Age of each persisted dataset, `None` if not cached.
    pub fn cache_ages(&self) -> Vec<(DatasetKind, Option<String>)> {
        DatasetKind::ALL
            .iter()
            .map(|kind| (*kind, self.cache.age_millis(kind.cache_key()).map(age_display)))
            .collect()
    }
}
