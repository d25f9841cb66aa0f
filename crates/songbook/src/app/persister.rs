//! Background persistence
//!
//! Saves run on a dedicated thread fed through a crossbeam channel, so the
//! mutation path never waits on storage. Every request carries a full
//! snapshot, which makes last-write-wins safe: when several requests are
//! queued only the newest one is written.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::data::gateway::PersistenceGateway;
use crate::data::storage::KeyValueStore;
use crate::data::types::Song;
use crate::error::{AppError, Result};

/// Requests handled by the persister thread
enum PersistCommand {
    Save { revision: u64, songs: Vec<Song> },
    /// Reply once everything queued before this has been written
    Flush(Sender<()>),
    Shutdown,
}

/// Counters shared with the worker thread
#[derive(Debug, Default)]
struct PersistStats {
    writes: AtomicU64,
    failures: AtomicU64,
    last_written_revision: AtomicU64,
}

/// Handle to the persister thread
pub struct Persister {
    tx: Sender<PersistCommand>,
    stats: Arc<PersistStats>,
    handle: Option<JoinHandle<()>>,
}

impl Persister {
    /// Start the persister thread for `gateway`
    pub fn spawn<S: KeyValueStore + 'static>(gateway: Arc<PersistenceGateway<S>>) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let stats = Arc::new(PersistStats::default());

        let worker_stats = Arc::clone(&stats);
        let handle = std::thread::Builder::new()
            .name("songbook-persist".to_string())
            .spawn(move || run(&gateway, &rx, &worker_stats))
            .map_err(spawn_error)?;

        Ok(Self {
            tx,
            stats,
            handle: Some(handle),
        })
    }

    /// Queue a snapshot for saving. Never blocks and never fails the caller.
    pub fn persist(&self, revision: u64, songs: Vec<Song>) {
        if self.tx.send(PersistCommand::Save { revision, songs }).is_err() {
            log::warn!("Persister stopped; revision {} not saved", revision);
        }
    }

    /// Block until every snapshot queued so far has been handled
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(PersistCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> u64 {
        self.stats.writes.load(Ordering::Relaxed)
    }

    /// Number of failed writes so far
    pub fn failures(&self) -> u64 {
        self.stats.failures.load(Ordering::Relaxed)
    }

    /// Revision of the last snapshot that reached storage
    pub fn last_written_revision(&self) -> u64 {
        self.stats.last_written_revision.load(Ordering::Relaxed)
    }

    /// Write anything still queued, then stop the thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.tx.send(PersistCommand::Shutdown);
            if handle.join().is_err() {
                log::error!("Persister thread panicked");
            }
        }
    }
}

impl Drop for Persister {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_error(e: std::io::Error) -> AppError {
    AppError::Spawn(format!("persister thread: {}", e))
}

/// Worker loop (blocking, runs on the persister thread)
fn run<S: KeyValueStore>(
    gateway: &PersistenceGateway<S>,
    rx: &Receiver<PersistCommand>,
    stats: &PersistStats,
) {
    while let Ok(first) = rx.recv() {
        let mut latest: Option<(u64, Vec<Song>)> = None;
        let mut acks = Vec::new();
        let mut stop = false;

        // Coalesce everything already queued behind the first request
        for cmd in std::iter::once(first).chain(rx.try_iter()) {
            match cmd {
                PersistCommand::Save { revision, songs } => latest = Some((revision, songs)),
                PersistCommand::Flush(ack) => acks.push(ack),
                PersistCommand::Shutdown => {
                    stop = true;
                    break;
                }
            }
        }

        if let Some((revision, songs)) = latest {
            match gateway.save(&songs) {
                Ok(()) => {
                    stats.writes.fetch_add(1, Ordering::Relaxed);
                    stats.last_written_revision.store(revision, Ordering::Relaxed);
                }
                Err(e) => {
                    // In-memory list stays authoritative; the next save retries with a full snapshot
                    stats.failures.fetch_add(1, Ordering::Relaxed);
                    log::warn!("Failed to save songs (revision {}): {}", revision, e);
                }
            }
        }

        for ack in acks {
            let _ = ack.send(());
        }

        if stop {
            break;
        }
    }
    log::debug!("Persister thread exiting");
}
