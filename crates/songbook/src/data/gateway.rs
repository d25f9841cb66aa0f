//! Song list persistence
//!
//! Writes the whole list as one JSON array under a fixed key, and reads it back.

use crate::config::storage::SONGS_KEY;
use crate::data::storage::KeyValueStore;
use crate::data::types::Song;
use crate::error::StorageError;

/// Saves and loads the full song list through a key-value store
#[derive(Debug, Clone)]
pub struct PersistenceGateway<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceGateway<S> {
    /// Create a gateway using the default `songs` key
    pub fn new(store: S) -> Self {
        Self::with_key(store, SONGS_KEY)
    }

    /// Create a gateway writing under a custom key
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Key the list is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write the full list, replacing whatever was stored before
    pub fn save(&self, songs: &[Song]) -> Result<(), StorageError> {
        let json = serde_json::to_string(songs)?;
        self.store.set_item(&self.key, &json)?;
        log::debug!("Saved {} songs under '{}'", songs.len(), self.key);
        Ok(())
    }

    /// Read the list back
    ///
    /// Nothing stored yet (or a blank value) is an empty list, not an error.
    pub fn load(&self) -> Result<Vec<Song>, StorageError> {
        let content = match self.store.get_item(&self.key)? {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt(format!("Failed to parse '{}': {}", self.key, e))
        })
    }

    /// Drop the stored list
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove_item(&self.key)
    }
}
