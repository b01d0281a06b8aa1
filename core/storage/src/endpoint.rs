//! Save endpoints for the board, track and tasc detail editors.
//!
//! Each endpoint is bound to one entity and one acting user. A successful
//! save is followed by an activity entry; a failure to record activity is
//! logged and does not fail the save.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use tascboard_common::{BoardId, Result, TascId, TrackId, UserId};
use tascboard_model::{Board, BoardSnapshot, Tasc, TascSnapshot, Track, TrackSnapshot};
use tascboard_sync::SaveHandler;

use crate::activity::{ActivityEntry, ActivityKind, ActivityLog};
use crate::store::WorkspaceStore;

async fn record_activity(activity: &dyn ActivityLog, entry: ActivityEntry) {
    let kind = entry.kind;
    if let Err(err) = activity.record(entry).await {
        warn!("Failed to record {:?} activity: {}", kind, err);
    }
}

/// Persists board detail edits.
pub struct BoardEndpoint {
    store: Arc<dyn WorkspaceStore>,
    activity: Arc<dyn ActivityLog>,
    board: BoardId,
    actor: UserId,
}

impl BoardEndpoint {
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        activity: Arc<dyn ActivityLog>,
        board: BoardId,
        actor: UserId,
    ) -> Self {
        Self {
            store,
            activity,
            board,
            actor,
        }
    }
}

#[async_trait]
impl SaveHandler<BoardSnapshot> for BoardEndpoint {
    type Output = Board;

    async fn save(&self, values: BoardSnapshot) -> Result<Board> {
        let board = self.store.update_board(&self.board, values).await?;
        record_activity(
            self.activity.as_ref(),
            ActivityEntry::new(
                board.id.clone(),
                self.actor.clone(),
                ActivityKind::BoardUpdated,
                board.id.as_str(),
                format!("Updated board \"{}\"", board.name),
            ),
        )
        .await;
        Ok(board)
    }
}

/// Persists track detail edits.
pub struct TrackEndpoint {
    store: Arc<dyn WorkspaceStore>,
    activity: Arc<dyn ActivityLog>,
    track: TrackId,
    actor: UserId,
}

impl TrackEndpoint {
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        activity: Arc<dyn ActivityLog>,
        track: TrackId,
        actor: UserId,
    ) -> Self {
        Self {
            store,
            activity,
            track,
            actor,
        }
    }
}

#[async_trait]
impl SaveHandler<TrackSnapshot> for TrackEndpoint {
    type Output = Track;

    async fn save(&self, values: TrackSnapshot) -> Result<Track> {
        let track = self.store.update_track(&self.track, values).await?;
        record_activity(
            self.activity.as_ref(),
            ActivityEntry::new(
                track.board.clone(),
                self.actor.clone(),
                ActivityKind::TrackUpdated,
                track.id.as_str(),
                format!("Updated track \"{}\"", track.name),
            ),
        )
        .await;
        Ok(track)
    }
}

/// Persists tasc detail edits.
pub struct TascEndpoint {
    store: Arc<dyn WorkspaceStore>,
    activity: Arc<dyn ActivityLog>,
    tasc: TascId,
    actor: UserId,
}

impl TascEndpoint {
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        activity: Arc<dyn ActivityLog>,
        tasc: TascId,
        actor: UserId,
    ) -> Self {
        Self {
            store,
            activity,
            tasc,
            actor,
        }
    }
}

#[async_trait]
impl SaveHandler<TascSnapshot> for TascEndpoint {
    type Output = Tasc;

    async fn save(&self, values: TascSnapshot) -> Result<Tasc> {
        let tasc = self.store.update_tasc(&self.tasc, values).await?;
        let board = self.store.get_track(&tasc.track).await?.board;
        record_activity(
            self.activity.as_ref(),
            ActivityEntry::new(
                board,
                self.actor.clone(),
                ActivityKind::TascUpdated,
                tasc.id.as_str(),
                format!("Updated tasc \"{}\"", tasc.name),
            ),
        )
        .await;
        Ok(tasc)
    }
}
