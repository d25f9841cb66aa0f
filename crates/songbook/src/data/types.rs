//! Common data types for persistence
//!
//! Shared types used across the data module.

use serde::{Deserialize, Serialize};

// =============================================================================
// Song - A single entry in the list
// =============================================================================

/// A song in the list
///
/// Field order matches the stored JSON object: `id`, `title`, `completed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Song {
    /// Identity key used by remove/edit/toggle. Never changes after creation.
    pub id: String,
    /// Display title
    pub title: String,
    /// Whether the song has been checked off (absent in storage means false)
    #[serde(default)]
    pub completed: bool,
}

impl Song {
    /// Create a new, not yet completed song
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    /// Mark completed (builder style)
    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

// =============================================================================
// IdStrategy - How new songs get their id
// =============================================================================

/// How `SongStore::add` assigns ids to new songs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// The trimmed title at creation time is the id. Edits leave it behind.
    #[default]
    #[serde(rename = "title")]
    TitleAsId,
    /// Monotonic counter ("1", "2", ...) independent of the title
    Sequential,
}

impl IdStrategy {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            IdStrategy::TitleAsId => "title",
            IdStrategy::Sequential => "sequential",
        }
    }
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(IdStrategy::TitleAsId),
            "sequential" => Ok(IdStrategy::Sequential),
            other => Err(format!("unknown id strategy '{}'", other)),
        }
    }
}
