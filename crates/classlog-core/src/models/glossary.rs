use serde::{Deserialize, Serialize};

use super::{Dataset, DatasetKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub term: String,
    /// Origin date; the default sort key of the glossary list.
    #[serde(default)]
    pub since: String,
    /// Markup text.
    #[serde(default)]
    pub definition: String,
    #[serde(rename = "relatedPeople", default)]
    pub related_people: Vec<String>,
}

impl Dataset for GlossaryTerm {
    const KIND: DatasetKind = DatasetKind::Glossary;

    fn id(&self) -> &str {
        &self.id
    }
}
