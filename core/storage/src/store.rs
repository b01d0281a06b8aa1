//! Workspace store trait definition.

use async_trait::async_trait;

use tascboard_common::{BoardId, OrgId, Result, TascId, TrackId};
use tascboard_model::{
    Board, BoardSnapshot, Organization, Tasc, TascSnapshot, Track, TrackSnapshot,
};

/// Store for organizations, boards, tracks and tascs.
///
/// Implementations are the remote side of the auto-sync protocol: the
/// `update_*` calls are what a detail editor's save lands on.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Get the store name (e.g., "memory").
    fn name(&self) -> &str;

    /// Create an organization.
    ///
    /// # Errors
    /// - Organization id already taken
    async fn create_organization(&self, org: Organization) -> Result<Organization>;

    /// Get an organization.
    async fn get_organization(&self, id: &OrgId) -> Result<Organization>;

    /// Create a board.
    ///
    /// # Preconditions
    /// - Owning organization must exist
    ///
    /// # Errors
    /// - Organization not found
    /// - Board id already taken
    async fn create_board(&self, board: Board) -> Result<Board>;

    /// Get a board.
    async fn get_board(&self, id: &BoardId) -> Result<Board>;

    /// List boards of an organization, ordered by creation time.
    async fn list_boards(&self, org: &OrgId) -> Result<Vec<Board>>;

    /// Apply an edited snapshot to a board.
    ///
    /// # Postconditions
    /// - The stored board's editable fields equal `snapshot`
    /// - Returns the updated board
    ///
    /// # Errors
    /// - Board not found
    /// - Snapshot fails validation
    async fn update_board(&self, id: &BoardId, snapshot: BoardSnapshot) -> Result<Board>;

    /// Create a track on an existing board.
    async fn create_track(&self, track: Track) -> Result<Track>;

    /// Get a track.
    async fn get_track(&self, id: &TrackId) -> Result<Track>;

    /// List tracks of a board, ordered by creation time.
    async fn list_tracks(&self, board: &BoardId) -> Result<Vec<Track>>;

    /// Apply an edited snapshot to a track.
    async fn update_track(&self, id: &TrackId, snapshot: TrackSnapshot) -> Result<Track>;

    /// Create a tasc on an existing track.
    async fn create_tasc(&self, tasc: Tasc) -> Result<Tasc>;

    /// Get a tasc.
    async fn get_tasc(&self, id: &TascId) -> Result<Tasc>;

    /// List tascs of a track, ordered by creation time.
    async fn list_tascs(&self, track: &TrackId) -> Result<Vec<Tasc>>;

    /// Apply an edited snapshot to a tasc.
    async fn update_tasc(&self, id: &TascId, snapshot: TascSnapshot) -> Result<Tasc>;
}
