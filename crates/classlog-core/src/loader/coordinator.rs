//! Loads records, people and glossary together behind the access gate.

use anyhow::Result;
use tracing::{debug, info};

use super::dataset::DatasetLoader;
use super::progress::{ProgressReporter, ProgressTracker};
use crate::models::Dataset;
use crate::session::Session;

/// Wait for access, then make sure all three datasets are loaded.
///
/// Without a reporter, or when nothing needs the network, the datasets load
/// in parallel and nothing is reported. With a reporter and pending work,
/// the pending index files are fetched first to learn the total item count
/// and the reporter receives the completed fraction after every item.
pub async fn ensure_all_loaded(session: &Session, progress: Option<&dyn ProgressReporter>) -> Result<()> {
    session.gate().wait_for_access_granted().await;

    let records = session.records();
    let people = session.people();
    let glossary = session.glossary();

    let reporter = match progress {
        Some(reporter) if session.needs_load() => reporter,
        _ => {
            debug!("Loading all datasets without progress");
            tokio::try_join!(records.load_all(), people.load_all(), glossary.load_all())?;
            return Ok(());
        }
    };

    let (record_index, people_index, glossary_index) = tokio::try_join!(
        pending_index(&records),
        pending_index(&people),
        pending_index(&glossary),
    )?;

    let total: usize = [&record_index, &people_index, &glossary_index]
        .iter()
        .map(|index| index.as_ref().map_or(0, Vec::len))
        .sum();
    info!(total, "Loading datasets");

    let tracker = ProgressTracker::new(total, reporter);
    if total == 0 {
        reporter.report(0.0);
    }

    tokio::try_join!(
        load_with(&records, record_index, &tracker),
        load_with(&people, people_index, &tracker),
        load_with(&glossary, glossary_index, &tracker),
    )?;
    Ok(())
}

/// The index of a dataset that still has to be fetched, `None` if it is
/// already available without the network.
async fn pending_index<T: Dataset>(loader: &DatasetLoader<'_, T>) -> Result<Option<Vec<String>>> {
    if loader.is_ready() {
        return Ok(None);
    }
    loader.fetch_index().await.map(Some)
}

async fn load_with<T: Dataset>(
    loader: &DatasetLoader<'_, T>,
    index: Option<Vec<String>>,
    tracker: &ProgressTracker<'_>,
) -> Result<()> {
    match index {
        Some(index) => loader.load_prefetched(index, tracker).await?,
        None => loader.load_all_with(tracker).await?,
    };
    Ok(())
}
