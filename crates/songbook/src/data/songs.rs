//! Song list management
//!
//! In-memory, ordered song list. Persistence lives in `gateway`; this type
//! only owns the list and its mutation rules.

use crate::data::types::{IdStrategy, Song};
use crate::error::Rejected;

/// Ordered list of songs
///
/// Insertion order is display order. Lookups are by `id`, which is unique
/// across the list and never changes once assigned.
#[derive(Debug, Clone)]
pub struct SongStore {
    songs: Vec<Song>,
    strategy: IdStrategy,
    /// Next id handed out under `IdStrategy::Sequential`; `None` once the
    /// counter has run past `u64::MAX`
    next_seq: Option<u64>,
    /// Bumped on every applied mutation
    revision: u64,
}

impl Default for SongStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SongStore {
    /// Create a new empty store using title ids
    pub fn new() -> Self {
        Self::with_strategy(IdStrategy::default())
    }

    /// Create a new empty store with the given id strategy
    pub fn with_strategy(strategy: IdStrategy) -> Self {
        Self {
            songs: Vec::new(),
            strategy,
            next_seq: Some(1),
            revision: 0,
        }
    }

    /// Create a store holding `songs` in the given order
    pub fn from_songs(strategy: IdStrategy, songs: Vec<Song>) -> Self {
        let mut store = Self::with_strategy(strategy);
        store.replace(songs);
        store
    }

    /// Replace the whole list (used on load). Prior contents are discarded.
    pub fn replace(&mut self, songs: Vec<Song>) {
        // Title ids can look numeric too; only sequential ids feed the counter
        self.next_seq = match self.strategy {
            IdStrategy::TitleAsId => Some(1),
            IdStrategy::Sequential => songs
                .iter()
                .filter_map(|s| s.id.parse::<u64>().ok())
                .max()
                .map_or(Some(1), |max| max.checked_add(1)),
        };
        self.songs = songs;
        self.revision += 1;
    }

    /// Add a song to the end of the list
    ///
    /// The title is trimmed. Rejected if it is empty, if an existing title
    /// matches the new song's id, or if the new id is already taken.
    pub fn add(&mut self, candidate_title: &str) -> Result<Song, Rejected> {
        let title = candidate_title.trim();
        if title.is_empty() {
            return Err(Rejected::EmptyTitle);
        }

        let id = match self.strategy {
            IdStrategy::TitleAsId => title.to_string(),
            IdStrategy::Sequential => match self.next_seq {
                Some(seq) => seq.to_string(),
                None => return Err(Rejected::IdsExhausted),
            },
        };

        // Title-as-id compares existing titles against the new id; for
        // sequential ids the title itself is the thing to compare.
        let candidate = match self.strategy {
            IdStrategy::TitleAsId => id.as_str(),
            IdStrategy::Sequential => title,
        };
        if self
            .songs
            .iter()
            .any(|s| s.title.trim() == candidate || s.id == id)
        {
            return Err(Rejected::Duplicate(title.to_string()));
        }

        if self.strategy == IdStrategy::Sequential {
            self.next_seq = self.next_seq.and_then(|seq| seq.checked_add(1));
        }

        let song = Song::new(id, title);
        self.songs.push(song.clone());
        self.revision += 1;
        log::debug!("Added song '{}' ({} total)", song.id, self.songs.len());
        Ok(song)
    }

    /// Remove a song by id. Unknown ids are ignored.
    ///
    /// Returns the removed song, if any.
    pub fn remove(&mut self, id: &str) -> Option<Song> {
        let index = self.songs.iter().position(|s| s.id == id)?;
        let song = self.songs.remove(index);
        self.revision += 1;
        log::debug!("Removed song '{}'", id);
        Some(song)
    }

    /// Change a song's title. The id is left untouched.
    ///
    /// Unknown ids are ignored once the title has been validated.
    pub fn edit(&mut self, id: &str, new_title: &str) -> Result<(), Rejected> {
        let title = new_title.trim();
        if title.is_empty() {
            return Err(Rejected::EmptyTitle);
        }

        if let Some(song) = self.songs.iter_mut().find(|s| s.id == id) {
            song.title = title.to_string();
            self.revision += 1;
            log::debug!("Retitled song '{}' to '{}'", id, title);
        }
        Ok(())
    }

    /// Flip a song's completed flag. Unknown ids are ignored.
    ///
    /// Returns the new value, if the song exists.
    pub fn toggle_completed(&mut self, id: &str) -> Option<bool> {
        let song = self.songs.iter_mut().find(|s| s.id == id)?;
        song.completed = !song.completed;
        self.revision += 1;
        Some(song.completed)
    }

    /// Current list, in display order
    pub fn snapshot(&self) -> &[Song] {
        &self.songs
    }

    /// Get a song by id
    pub fn get(&self, id: &str) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == id)
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Number of songs marked completed
    pub fn completed_count(&self) -> usize {
        self.songs.iter().filter(|s| s.completed).count()
    }

    /// Mutation counter, bumped by every change that reached the list
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
