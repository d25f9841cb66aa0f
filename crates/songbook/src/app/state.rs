//! Shared session state and commands
//!
//! `SongCommand` is the mutation request any front end can send.
//! `Phase` tracks the list screen's load lifecycle.

use crate::data::types::Song;

/// Mutations a front end can request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongCommand {
    Add(String),
    Remove(String),
    Edit { id: String, title: String },
    ToggleCompleted(String),
}

/// Load lifecycle of the list screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Created, nothing loaded yet
    #[default]
    Uninitialized,
    /// Reading the stored list
    Loading,
    /// Loaded (or given up loading); mutations are accepted
    Ready,
}

impl Phase {
    /// Check if mutations are accepted
    pub fn is_ready(&self) -> bool {
        matches!(self, Phase::Ready)
    }
}

/// What the detail view gets when a song is opened
///
/// The id is passed through verbatim; the song is looked up for convenience
/// and may be missing if the id is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongDetail {
    pub id: String,
    pub song: Option<Song>,
}
