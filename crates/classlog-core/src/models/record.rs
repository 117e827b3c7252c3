use serde::{Deserialize, Serialize};

use super::{Dataset, DatasetKind};

/// Width of the zero-padded sequence in derived record ids (`R001`).
const DERIVED_ID_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    #[default]
    Normal,
    High,
    Low,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub file: String,
}

/// One log entry, stored as a single JSON file under `data/record/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Record {
    /// Builds the id given to a record without one: `R` plus its 1-based
    /// position in the index file.
    pub fn derived_id(position: usize) -> String {
        format!("R{:0width$}", position, width = DERIVED_ID_WIDTH)
    }

    /// Numeric part of an `R###` id, if the id has that shape.
    pub fn sequence(&self) -> Option<u64> {
        self.id.strip_prefix('R').and_then(|n| n.parse().ok())
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

impl Dataset for Record {
    const KIND: DatasetKind = DatasetKind::Records;

    fn id(&self) -> &str {
        &self.id
    }

    fn assign_derived_id(&mut self, position: usize) {
        if self.id.is_empty() {
            self.id = Self::derived_id(position);
        }
    }
}
