//! classlog core library.
//!
//! Loads a class record site (records, people, glossary) published as
//! static JSON files, keeps the assembled datasets in an expiring local
//! cache, and turns the inline markup used in their text into HTML or
//! plain text.
//!
//! Everything one browsing session shares lives in a [`Session`]:
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use classlog_core::{Config, Session};
//!
//! let mut config = Config::load()?;
//! config.apply_env();
//! let session = Session::from_config(&config)?;
//! session.ensure_all_loaded(None).await?;
//! let xref = session.cross_references().await?;
//! println!("p1 appears in {} records", xref.count_participated("p1"));
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod loader;
pub mod markup;
pub mod models;
pub mod session;
pub mod views;
pub mod xref;

pub use api::{DirFetcher, FetchError, Fetcher, HttpFetcher, MemoryFetcher};
pub use auth::{AccessGate, AccessSignal, Verification};
pub use cache::{CacheError, ExpiringCache, FileStore, KeyValueStore, MemoryStore};
pub use config::{Config, DataSource};
pub use loader::{ProgressReporter, ProgressStep};
pub use models::{DatasetKind, GlossaryTerm, Person, Record, Role};
pub use session::{Session, SessionOptions};
pub use xref::CrossReferenceIndex;
