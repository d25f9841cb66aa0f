//! List screen session
//!
//! Owns the song list and its persister, and drives the screen's
//! `Uninitialized -> Loading -> Ready` lifecycle. Front ends hold one
//! `SongSession`, render `snapshot()`, and call the mutation methods.

use std::sync::Arc;

use crate::app::persister::Persister;
use crate::app::state::{Phase, SongCommand, SongDetail};
use crate::data::gateway::PersistenceGateway;
use crate::data::settings::Settings;
use crate::data::songs::SongStore;
use crate::data::storage::KeyValueStore;
use crate::data::types::{IdStrategy, Song};
use crate::error::{AppError, Result, StorageError};

/// Song list screen: owns the list, loads it on mount, and saves it after each change
pub struct SongSession<S: KeyValueStore + 'static> {
    phase: Phase,
    songs: SongStore,
    gateway: Arc<PersistenceGateway<S>>,
    persister: Persister,
    /// Why the last load came back empty, if it failed
    load_error: Option<StorageError>,
}

impl<S: KeyValueStore + 'static> SongSession<S> {
    /// Create an unmounted session over `gateway`
    pub fn new(gateway: PersistenceGateway<S>, strategy: IdStrategy) -> Result<Self> {
        let gateway = Arc::new(gateway);
        let persister = Persister::spawn(Arc::clone(&gateway))?;
        Ok(Self {
            phase: Phase::Uninitialized,
            songs: SongStore::with_strategy(strategy),
            gateway,
            persister,
            load_error: None,
        })
    }

    /// Read settings from `store`, build a session on it, and mount it
    pub fn open(store: S) -> Result<Self> {
        let settings = Settings::load_or_default(&store);
        let mut session = Self::new(PersistenceGateway::new(store), settings.id_strategy)?;
        session.mount();
        Ok(session)
    }

    /// Load the stored list. Runs once; later calls do nothing.
    ///
    /// Always ends in `Ready`. A failed load leaves an empty list.
    pub fn mount(&mut self) {
        if self.phase != Phase::Uninitialized {
            return;
        }

        self.phase = Phase::Loading;
        match self.gateway.load() {
            Ok(songs) => {
                log::info!("Loaded {} songs", songs.len());
                self.songs.replace(songs);
            }
            Err(e) => {
                log::warn!("Error loading songs, starting empty: {}", e);
                self.songs.replace(Vec::new());
                self.load_error = Some(e);
            }
        }
        self.phase = Phase::Ready;
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Error from the last load, if it failed
    pub fn load_error(&self) -> Option<&StorageError> {
        self.load_error.as_ref()
    }

    /// Current list, in display order
    pub fn snapshot(&self) -> &[Song] {
        self.songs.snapshot()
    }

    /// Underlying list
    pub fn songs(&self) -> &SongStore {
        &self.songs
    }

    /// Add a song to the end of the list
    pub fn add(&mut self, title: &str) -> Result<Song> {
        self.ensure_ready()?;
        let song = self.songs.add(title)?;
        self.persist();
        Ok(song)
    }

    /// Remove a song by id (no-op if absent)
    pub fn remove(&mut self, id: &str) -> Result<Option<Song>> {
        self.ensure_ready()?;
        let removed = self.songs.remove(id);
        if removed.is_some() {
            self.persist();
        }
        Ok(removed)
    }

    /// Change a song's title; its id stays the same
    pub fn edit(&mut self, id: &str, title: &str) -> Result<()> {
        self.ensure_ready()?;
        let before = self.songs.revision();
        self.songs.edit(id, title)?;
        if self.songs.revision() != before {
            self.persist();
        }
        Ok(())
    }

    /// Flip a song's completed flag (no-op if absent)
    pub fn toggle_completed(&mut self, id: &str) -> Result<Option<bool>> {
        self.ensure_ready()?;
        let completed = self.songs.toggle_completed(id);
        if completed.is_some() {
            self.persist();
        }
        Ok(completed)
    }

    /// Apply a front-end command
    pub fn apply(&mut self, cmd: SongCommand) -> Result<()> {
        match cmd {
            SongCommand::Add(title) => self.add(&title).map(|_| ()),
            SongCommand::Remove(id) => self.remove(&id).map(|_| ()),
            SongCommand::Edit { id, title } => self.edit(&id, &title),
            SongCommand::ToggleCompleted(id) => self.toggle_completed(&id).map(|_| ()),
        }
    }

    /// Detail view for `id`
    pub fn detail(&self, id: &str) -> SongDetail {
        SongDetail {
            id: id.to_string(),
            song: self.songs.get(id).cloned(),
        }
    }

    /// Block until queued saves have been written
    pub fn flush(&self) {
        self.persister.flush();
    }

    /// Number of saves that failed this session
    pub fn failed_saves(&self) -> u64 {
        self.persister.failures()
    }

    /// Flush pending saves and stop the persister
    pub fn close(self) {
        self.persister.shutdown();
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.phase.is_ready() {
            Ok(())
        } else {
            Err(AppError::NotReady)
        }
    }

    fn persist(&self) {
        self.persister
            .persist(self.songs.revision(), self.songs.snapshot().to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::storage::SONGS_KEY;
    use crate::data::storage::MemoryStore;
    use crate::error::Rejected;

    fn session_over(store: &Arc<MemoryStore>) -> SongSession<Arc<MemoryStore>> {
        let gateway = PersistenceGateway::new(Arc::clone(store));
        let mut session = SongSession::new(gateway, IdStrategy::TitleAsId).unwrap();
        session.mount();
        session
    }

    fn stored(store: &Arc<MemoryStore>) -> Vec<Song> {
        PersistenceGateway::new(Arc::clone(store)).load().unwrap()
    }

    #[test]
    fn test_lifecycle() {
        let store = Arc::new(MemoryStore::new());
        let gateway = PersistenceGateway::new(Arc::clone(&store));
        let mut session = SongSession::new(gateway, IdStrategy::TitleAsId).unwrap();
        assert_eq!(session.phase(), Phase::Uninitialized);

        session.mount();
        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.snapshot().is_empty());
        assert!(session.load_error().is_none());
    }

    #[test]
    fn test_mutation_before_mount_rejected() {
        let store = Arc::new(MemoryStore::new());
        let gateway = PersistenceGateway::new(Arc::clone(&store));
        let mut session = SongSession::new(gateway, IdStrategy::TitleAsId).unwrap();

        assert!(matches!(session.add("Yesterday"), Err(AppError::NotReady)));
        assert!(matches!(session.remove("Yesterday"), Err(AppError::NotReady)));
        assert!(session.snapshot().is_empty());
    }

    #[test]
    fn test_mount_loads_stored_list() {
        let store = Arc::new(MemoryStore::with_item(
            SONGS_KEY,
            r#"[{"id":"Yesterday","title":"Yesterday","completed":true}]"#,
        ));

        let session = session_over(&store);

        assert_eq!(session.snapshot(), &[Song::new("Yesterday", "Yesterday").completed()]);
    }

    #[test]
    fn test_mount_twice_keeps_state() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(&store);
        session.add("Yesterday").unwrap();

        session.mount();

        assert_eq!(session.snapshot().len(), 1);
    }

    #[test]
    fn test_corrupt_store_yields_empty_ready() {
        let store = Arc::new(MemoryStore::with_item(SONGS_KEY, "[{broken"));

        let session = session_over(&store);

        assert_eq!(session.phase(), Phase::Ready);
        assert!(session.snapshot().is_empty());
        assert!(matches!(session.load_error(), Some(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_unavailable_store_yields_empty_ready() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);

        let session = session_over(&store);

        assert_eq!(session.phase(), Phase::Ready);
        assert!(matches!(session.load_error(), Some(StorageError::Unavailable(_))));
    }

    #[test]
    fn test_mutations_are_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(&store);

        session.add("Yesterday").unwrap();
        session.add("Let It Be").unwrap();
        session.toggle_completed("Yesterday").unwrap();
        session.flush();

        assert_eq!(
            stored(&store),
            vec![
                Song::new("Yesterday", "Yesterday").completed(),
                Song::new("Let It Be", "Let It Be"),
            ]
        );
    }

    #[test]
    fn test_rejected_add_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(&store);

        let result = session.add("   ");
        session.flush();

        assert!(matches!(result, Err(AppError::Rejected(Rejected::EmptyTitle))));
        assert!(store.get_item(SONGS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_noop_remove_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(&store);

        assert_eq!(session.remove("missing").unwrap(), None);
        session.flush();

        assert!(store.get_item(SONGS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_failed_save_keeps_memory_state() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(&store);
        store.set_offline(true);

        session.add("Yesterday").unwrap();
        session.flush();

        assert_eq!(session.snapshot().len(), 1);
        assert_eq!(session.failed_saves(), 1);
    }

    #[test]
    fn test_apply_commands() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(&store);

        session.apply(SongCommand::Add("Hey Jude".to_string())).unwrap();
        session
            .apply(SongCommand::Edit {
                id: "Hey Jude".to_string(),
                title: "Hey Jude (Remastered)".to_string(),
            })
            .unwrap();
        session.apply(SongCommand::ToggleCompleted("Hey Jude".to_string())).unwrap();

        let song = &session.snapshot()[0];
        assert_eq!(song.id, "Hey Jude");
        assert_eq!(song.title, "Hey Jude (Remastered)");
        assert!(song.completed);

        session.apply(SongCommand::Remove("Hey Jude".to_string())).unwrap();
        assert!(session.snapshot().is_empty());
    }

    #[test]
    fn test_detail_passthrough() {
        let store = Arc::new(MemoryStore::new());
        let mut session = session_over(&store);
        session.add("Yesterday").unwrap();

        let found = session.detail("Yesterday");
        assert_eq!(found.id, "Yesterday");
        assert_eq!(found.song, Some(Song::new("Yesterday", "Yesterday")));

        let missing = session.detail("Gone");
        assert_eq!(missing.id, "Gone");
        assert!(missing.song.is_none());
    }

    #[test]
    fn test_reload_after_close() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut session = session_over(&store);
            session.add("Yesterday").unwrap();
            session.add("Let It Be").unwrap();
            session.remove("Yesterday").unwrap();
            session.close();
        }

        let session = session_over(&store);
        assert_eq!(session.snapshot(), &[Song::new("Let It Be", "Let It Be")]);
    }

    #[test]
    fn test_numeric_title_at_u64_max_survives_reload() {
        let store = Arc::new(MemoryStore::new());
        let max = u64::MAX.to_string();
        {
            let mut session = session_over(&store);
            session.add(&max).unwrap();
            session.close();
        }

        let mut session = session_over(&store);
        assert_eq!(session.snapshot(), &[Song::new(&max, &max)]);

        session.add("Yesterday").unwrap();
        assert_eq!(session.songs().len(), 2);
    }
}
