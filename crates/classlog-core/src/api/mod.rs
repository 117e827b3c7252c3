//! Transport for the static dataset files.
//!
//! All data is published as plain JSON under a site root. The `Fetcher`
//! trait abstracts where that root lives: a web server (`HttpFetcher`), a
//! checked-out copy on disk (`DirFetcher`), or memory (`MemoryFetcher`).

pub mod client;
pub mod error;

pub use client::{fetch_json, DirFetcher, Fetcher, HttpFetcher, MemoryFetcher};
pub use error::FetchError;
