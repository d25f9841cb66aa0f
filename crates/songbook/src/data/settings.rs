//! Application settings management
//!
//! User preferences stored next to the song list.

use crate::config::settings::VERSION;
use crate::config::storage::SETTINGS_KEY;
use crate::data::storage::KeyValueStore;
use crate::data::types::IdStrategy;
use crate::error::{Result, StorageError};
use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Document format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// How new songs get their id
    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Name shown in the list greeting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

fn default_version() -> u32 {
    VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: VERSION,
            id_strategy: IdStrategy::default(),
            display_name: None,
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings, defaults if nothing is stored
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self> {
        let content = match store.get_item(SETTINGS_KEY)? {
            Some(c) if !c.trim().is_empty() => c,
            _ => return Ok(Self::default()),
        };

        let settings = serde_json::from_str(&content).map_err(|e| {
            StorageError::Corrupt(format!("Failed to parse '{}': {}", SETTINGS_KEY, e))
        })?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load_or_default<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match Self::load(store) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Save settings
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(StorageError::from)?;
        store.set_item(SETTINGS_KEY, &json)?;
        Ok(())
    }

    /// Greeting line for the list header
    pub fn greeting(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!("Hi {},", name),
            _ => "Hello,".to_string(),
        }
    }
}
