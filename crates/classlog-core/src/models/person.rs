use serde::{Deserialize, Serialize};

use super::{Dataset, DatasetKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    #[default]
    #[serde(other)]
    Other,
}

impl Role {
    /// Display order of role groups on the people page.
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Other];

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Student => "Students",
            Role::Teacher => "Teachers",
            Role::Other => "Others",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Teacher => write!(f, "teacher"),
            Role::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub role: Role,
    /// Markup text.
    #[serde(default)]
    pub alias: String,
    /// Markup text.
    #[serde(default)]
    pub bio: String,
}

impl Dataset for Person {
    const KIND: DatasetKind = DatasetKind::People;

    fn id(&self) -> &str {
        &self.id
    }
}
