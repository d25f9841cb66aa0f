//! Session layer
//!
//! The list screen's lifecycle, its commands, and background persistence.

pub mod persister;
pub mod session;
pub mod state;

pub use persister::Persister;
pub use session::SongSession;
pub use state::{Phase, SongCommand, SongDetail};
