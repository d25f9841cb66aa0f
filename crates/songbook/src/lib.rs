//! Songbook
//!
//! Ordered song list with add/edit/remove/complete operations, persisted as
//! one JSON document in a local key-value store.
//!
//! ## Quick start
//!
//! ```no_run
//! use songbook::app::SongSession;
//! use songbook::data::FileStore;
//!
//! # fn main() -> songbook::error::Result<()> {
//! let mut session = SongSession::open(FileStore::open_default()?)?;
//! session.add("Yesterday")?;
//! session.toggle_completed("Yesterday")?;
//! session.close();
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;

pub use app::{Phase, SongCommand, SongDetail, SongSession};
pub use data::{IdStrategy, PersistenceGateway, Song, SongStore};
pub use error::{AppError, Rejected, Result, StorageError};
