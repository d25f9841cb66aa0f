//! Key-value storage layer
//!
//! A string-keyed, string-valued store in the shape of a device's local
//! storage (`getItem` / `setItem`), with a file-backed and an in-memory
//! implementation.

use crate::config::{app::NAME, storage::FILE_EXTENSION};
use crate::error::{AppError, Result, StorageError};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Local key-value storage
///
/// Implementations must be shareable with the background persister thread.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if nothing was stored yet
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), StorageError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> std::result::Result<(), StorageError>;
}

/// Get the default application data directory path
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::config_dir)
        .map(|p| p.join(NAME))
        .ok_or_else(|| AppError::Config(
            "Could not determine data directory. HOME environment variable may not be set.".to_string()
        ))
}

// =============================================================================
// FileStore - one JSON file per key
// =============================================================================

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create a store in the default data directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(data_dir()?))
    }

    /// Directory backing this store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`
    ///
    /// Keys become file names, so only ASCII letters, digits, `-` and `_`
    /// are accepted. Anything else could leave the store's directory.
    pub fn path_for(&self, key: &str) -> std::result::Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", key, FILE_EXTENSION)))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        read_file(&self.path_for(key)?)
    }

    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
        let path = self.path_for(key)?;
        create_dir_if_needed(&self.dir)?;
        write_file(&path, value)
    }

    fn remove_item(&self, key: &str) -> std::result::Result<(), StorageError> {
        delete_file(&self.path_for(key)?)
    }
}

/// Create a directory if it doesn't exist, with proper error handling
fn create_dir_if_needed(path: &Path) -> std::result::Result<(), StorageError> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot create directory {:?}", path)
                }
                ErrorKind::NotFound => {
                    format!("Cannot create directory {:?}: parent path does not exist", path)
                }
                _ => {
                    format!("Failed to create directory {:?}: {}", path, e)
                }
            };
            Err(StorageError::Unavailable(msg))
        }
    }
}

/// Read file contents. A missing file means the key was never written.
fn read_file(path: &Path) -> std::result::Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => Err(StorageError::Unavailable(format!(
                "Permission denied: cannot read {:?}",
                path
            ))),
            ErrorKind::InvalidData => Err(StorageError::Corrupt(format!(
                "{:?} is not valid UTF-8",
                path
            ))),
            _ => Err(StorageError::Unavailable(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        },
    }
}

/// Sibling path a write is staged in before being renamed over `path`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write file contents through a staging file, so readers see either the
/// old contents or the new ones, never a truncated file
fn write_file(path: &Path, content: &str) -> std::result::Result<(), StorageError> {
    let staging = staging_path(path);
    let result = fs::write(&staging, content).and_then(|()| fs::rename(&staging, path));
    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&staging);
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot write to {:?}", path)
                }
                ErrorKind::NotFound => {
                    format!("Cannot write to {:?}: parent directory does not exist", path)
                }
                ErrorKind::ReadOnlyFilesystem => {
                    format!("Cannot write to {:?}: filesystem is read-only", path)
                }
                _ => {
                    format!("Failed to write to {:?}: {}", path, e)
                }
            };
            Err(StorageError::Unavailable(msg))
        }
    }
}

/// Delete a file, treating "already gone" as success
fn delete_file(path: &Path) -> std::result::Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(()),
            ErrorKind::PermissionDenied => Err(StorageError::Unavailable(format!(
                "Permission denied: cannot delete {:?}",
                path
            ))),
            _ => Err(StorageError::Unavailable(format!(
                "Failed to delete {:?}: {}",
                path, e
            ))),
        },
    }
}

// =============================================================================
// MemoryStore - process-local map
// =============================================================================

/// In-memory store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    /// When set, every call fails with `Unavailable`
    offline: Mutex<bool>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one key
    pub fn with_item(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Simulate the device store becoming unavailable (or back online)
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap_or_else(|e| e.into_inner()) = offline;
    }

    fn check_online(&self) -> std::result::Result<(), StorageError> {
        if *self.offline.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(StorageError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        self.check_online()?;
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
        self.check_online()?;
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> std::result::Result<(), StorageError> {
        self.check_online()?;
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> std::result::Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_store(name: &str) -> FileStore {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        FileStore::new(temp_dir().join(format!("songbook_test_{}_{}", id, name)))
    }

    fn cleanup(store: &FileStore) {
        let _ = fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_set_and_get() {
        let store = temp_store("set_get");

        store.set_item("songs", "[]").unwrap();
        assert!(store.path_for("songs").unwrap().exists());
        assert_eq!(store.get_item("songs").unwrap(), Some("[]".to_string()));

        cleanup(&store);
    }

    #[test]
    fn test_get_missing_key() {
        let store = temp_store("missing");
        assert_eq!(store.get_item("songs").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = temp_store("overwrite");

        store.set_item("songs", "first").unwrap();
        store.set_item("songs", "second").unwrap();
        assert_eq!(store.get_item("songs").unwrap(), Some("second".to_string()));

        cleanup(&store);
    }

    #[test]
    fn test_creates_nested_dir() {
        let base = temp_store("nested");
        let store = FileStore::new(base.dir().join("subdir").join("deeper"));

        store.set_item("songs", "[]").unwrap();
        assert!(store.path_for("songs").unwrap().exists());

        cleanup(&base);
    }

    #[test]
    fn test_remove() {
        let store = temp_store("remove");

        store.set_item("songs", "[]").unwrap();
        store.remove_item("songs").unwrap();
        assert_eq!(store.get_item("songs").unwrap(), None);

        // Removing again is fine
        store.remove_item("songs").unwrap();

        cleanup(&store);
    }

    #[test]
    fn test_path_uses_key_and_extension() {
        let store = FileStore::new("/tmp/songbook");
        assert_eq!(store.path_for("songs").unwrap(), PathBuf::from("/tmp/songbook/songs.json"));
    }

    #[test]
    fn test_rejects_keys_outside_dir() {
        let store = temp_store("bad_keys");

        for key in ["", "..", "../songs", "a/b", "a\\b", ".hidden", "songs.json"] {
            assert!(
                matches!(store.path_for(key), Err(StorageError::InvalidKey(_))),
                "key {:?} should be rejected",
                key
            );
            assert!(matches!(store.set_item(key, "[]"), Err(StorageError::InvalidKey(_))));
            assert!(matches!(store.get_item(key), Err(StorageError::InvalidKey(_))));
            assert!(matches!(store.remove_item(key), Err(StorageError::InvalidKey(_))));
        }
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_write_leaves_no_staging_file() {
        let store = temp_store("staging");

        store.set_item("songs", "first").unwrap();
        store.set_item("songs", "second").unwrap();

        let path = store.path_for("songs").unwrap();
        assert!(!staging_path(&path).exists());
        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("songs.json")]);

        cleanup(&store);
    }

    #[test]
    fn test_stale_staging_file_does_not_affect_reads() {
        let store = temp_store("stale_staging");
        store.set_item("songs", "[]").unwrap();

        // Leftover from an interrupted write
        let path = store.path_for("songs").unwrap();
        fs::write(staging_path(&path), "[{trunc").unwrap();

        assert_eq!(store.get_item("songs").unwrap(), Some("[]".to_string()));
        store.set_item("songs", "[1]").unwrap();
        assert_eq!(store.get_item("songs").unwrap(), Some("[1]".to_string()));
        assert!(!staging_path(&path).exists());

        cleanup(&store);
    }

    #[test]
    fn test_unreadable_path_is_unavailable() {
        let store = temp_store("is_dir");
        // A directory where the file should be cannot be read as a string
        fs::create_dir_all(store.path_for("songs").unwrap()).unwrap();

        let result = store.get_item("songs");
        assert!(matches!(result, Err(StorageError::Unavailable(_))));

        cleanup(&store);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").unwrap(), None);

        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap(), Some("v".to_string()));

        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_offline() {
        let store = MemoryStore::with_item("k", "v");
        store.set_offline(true);

        assert!(matches!(store.get_item("k"), Err(StorageError::Unavailable(_))));
        assert!(matches!(store.set_item("k", "w"), Err(StorageError::Unavailable(_))));

        store.set_offline(false);
        assert_eq!(store.get_item("k").unwrap(), Some("v".to_string()));
    }
}
