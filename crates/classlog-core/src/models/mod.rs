//! Data models for the class record datasets.
//!
//! Every dataset kind is published as an index file (a JSON array of file
//! names) plus one JSON document per item:
//!
//! - `Record`: a dated log entry with markup content
//! - `Person`: someone referenced by records
//! - `GlossaryTerm`: an entry in the class dictionary

pub mod glossary;
pub mod person;
pub mod record;

use serde::{de::DeserializeOwned, Serialize};

pub use glossary::GlossaryTerm;
pub use person::{Person, Role};
pub use record::{Attachment, Importance, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Records,
    People,
    Glossary,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Records, DatasetKind::People, DatasetKind::Glossary];

    /// Directory holding the item files, relative to the site root.
    pub fn base_path(&self) -> &'static str {
        match self {
            DatasetKind::Records => "data/record",
            DatasetKind::People => "data/people",
            DatasetKind::Glossary => "data/glossary",
        }
    }

    pub fn index_path(&self) -> &'static str {
        match self {
            DatasetKind::Records => "data/record/records_index.json",
            DatasetKind::People => "data/people/people_index.json",
            DatasetKind::Glossary => "data/glossary/glossary_index.json",
        }
    }

    pub fn item_path(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_path(), file_name)
    }

    /// Key under which the assembled list is persisted.
    pub fn cache_key(&self) -> &'static str {
        match self {
            DatasetKind::Records => "records",
            DatasetKind::People => "people",
            DatasetKind::Glossary => "glossary",
        }
    }
}

impl std::fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.cache_key())
    }
}

/// An item type that can be loaded as a dataset.
pub trait Dataset: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: DatasetKind;

    fn id(&self) -> &str;

    /// Fills in identifiers derived from the item's 1-based position in the
    /// index file. Most kinds carry their own ids and do nothing.
    fn assign_derived_id(&mut self, _position: usize) {}
}
