//! In-memory workspace store for testing and simulation.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::debug;

use tascboard_common::{BoardId, Error, OrgId, Result, TascId, TrackId};
use tascboard_model::{
    Board, BoardSnapshot, Organization, Tasc, TascSnapshot, Track, TrackSnapshot,
};

use crate::store::WorkspaceStore;

/// Tables, each kept in insertion order.
#[derive(Default)]
struct Tables {
    orgs: Vec<Organization>,
    boards: Vec<Board>,
    tracks: Vec<Track>,
    tascs: Vec<Tasc>,
}

/// In-memory workspace store.
///
/// Useful for testing and the CLI simulator. All data is stored in memory
/// and lost on drop. Update calls can be slowed down or made to fail to
/// exercise the auto-sync controller.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    latency: Duration,
    failures_left: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            latency: Duration::ZERO,
            failures_left: AtomicUsize::new(0),
        }
    }

    /// Delay every update call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `count` update calls fail with a network error.
    pub fn fail_next_updates(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulated round trip for update calls.
    async fn round_trip(&self) -> Result<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            debug!("Simulating update failure");
            return Err(Error::Network("Simulated connection failure".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_organization(&self, org: Organization) -> Result<Organization> {
        let mut tables = self.write();
        if tables.orgs.iter().any(|o| o.id == org.id) {
            return Err(Error::AlreadyExists(format!("Organization {}", org.id)));
        }
        tables.orgs.push(org.clone());
        Ok(org)
    }

    async fn get_organization(&self, id: &OrgId) -> Result<Organization> {
        self.read()
            .orgs
            .iter()
            .find(|o| &o.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Organization {}", id)))
    }

    async fn create_board(&self, board: Board) -> Result<Board> {
        let mut tables = self.write();
        if !tables.orgs.iter().any(|o| o.id == board.org) {
            return Err(Error::NotFound(format!("Organization {}", board.org)));
        }
        if tables.boards.iter().any(|b| b.id == board.id) {
            return Err(Error::AlreadyExists(format!("Board {}", board.id)));
        }
        board.snapshot().validate()?;
        tables.boards.push(board.clone());
        Ok(board)
    }

    async fn get_board(&self, id: &BoardId) -> Result<Board> {
        self.read()
            .boards
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Board {}", id)))
    }

    async fn list_boards(&self, org: &OrgId) -> Result<Vec<Board>> {
        Ok(self
            .read()
            .boards
            .iter()
            .filter(|b| &b.org == org)
            .cloned()
            .collect())
    }

    async fn update_board(&self, id: &BoardId, snapshot: BoardSnapshot) -> Result<Board> {
        self.round_trip().await?;
        snapshot.validate()?;

        let mut tables = self.write();
        let board = tables
            .boards
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| Error::NotFound(format!("Board {}", id)))?;
        board.apply(snapshot);
        Ok(board.clone())
    }

    async fn create_track(&self, track: Track) -> Result<Track> {
        let mut tables = self.write();
        if !tables.boards.iter().any(|b| b.id == track.board) {
            return Err(Error::NotFound(format!("Board {}", track.board)));
        }
        if tables.tracks.iter().any(|t| t.id == track.id) {
            return Err(Error::AlreadyExists(format!("Track {}", track.id)));
        }
        track.snapshot().validate()?;
        tables.tracks.push(track.clone());
        Ok(track)
    }

    async fn get_track(&self, id: &TrackId) -> Result<Track> {
        self.read()
            .tracks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Track {}", id)))
    }

    async fn list_tracks(&self, board: &BoardId) -> Result<Vec<Track>> {
        Ok(self
            .read()
            .tracks
            .iter()
            .filter(|t| &t.board == board)
            .cloned()
            .collect())
    }

    async fn update_track(&self, id: &TrackId, snapshot: TrackSnapshot) -> Result<Track> {
        self.round_trip().await?;
        snapshot.validate()?;

        let mut tables = self.write();
        let track = tables
            .tracks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Track {}", id)))?;
        track.apply(snapshot);
        Ok(track.clone())
    }

    async fn create_tasc(&self, tasc: Tasc) -> Result<Tasc> {
        let mut tables = self.write();
        if !tables.tracks.iter().any(|t| t.id == tasc.track) {
            return Err(Error::NotFound(format!("Track {}", tasc.track)));
        }
        if tables.tascs.iter().any(|t| t.id == tasc.id) {
            return Err(Error::AlreadyExists(format!("Tasc {}", tasc.id)));
        }
        tasc.snapshot().validate()?;
        tables.tascs.push(tasc.clone());
        Ok(tasc)
    }

    async fn get_tasc(&self, id: &TascId) -> Result<Tasc> {
        self.read()
            .tascs
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Tasc {}", id)))
    }

    async fn list_tascs(&self, track: &TrackId) -> Result<Vec<Tasc>> {
        Ok(self
            .read()
            .tascs
            .iter()
            .filter(|t| &t.track == track)
            .cloned()
            .collect())
    }

    async fn update_tasc(&self, id: &TascId, snapshot: TascSnapshot) -> Result<Tasc> {
        self.round_trip().await?;
        snapshot.validate()?;

        let mut tables = self.write();
        let tasc = tables
            .tascs
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| Error::NotFound(format!("Tasc {}", id)))?;
        tasc.apply(snapshot);
        Ok(tasc.clone())
    }
}
