//! Data persistence
//!
//! Handles the song list, its storage, and settings.

pub mod gateway;
pub mod settings;
pub mod songs;
pub mod storage;
pub mod types;

// Re-export common types
pub use gateway::PersistenceGateway;
pub use settings::Settings;
pub use songs::SongStore;
pub use storage::{data_dir, FileStore, KeyValueStore, MemoryStore};
pub use types::{IdStrategy, Song};
