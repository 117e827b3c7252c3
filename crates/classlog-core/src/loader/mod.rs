//! Dataset loading.
//!
//! - `EntityStore`: in-memory, load-once holder per dataset kind
//! - `DatasetLoader`: index + item fetches wrapped by the expiring cache
//! - `ensure_all_loaded`: all three kinds at once with shared progress
//! - `ProgressStep` / `ProgressReporter`: optional progress callbacks

pub mod coordinator;
pub mod dataset;
pub mod progress;
pub mod store;

pub use coordinator::ensure_all_loaded;
pub use dataset::DatasetLoader;
pub use progress::{NoProgress, ProgressReporter, ProgressStep, ProgressTracker};
pub use store::EntityStore;
