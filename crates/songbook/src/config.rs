//! Configuration constants for songbook

/// Application metadata
pub mod app {
    /// Application name (used for the data directory, etc.)
    pub const NAME: &str = "songbook";
}

/// Storage layout
pub mod storage {
    /// Key the song list is stored under
    pub const SONGS_KEY: &str = "songs";

    /// Key the settings document is stored under
    pub const SETTINGS_KEY: &str = "settings";

    /// File extension used by the file-backed store
    pub const FILE_EXTENSION: &str = "json";
}

/// Settings-related configuration
pub mod settings {
    /// Settings document format version
    pub const VERSION: u32 = 1;
}
