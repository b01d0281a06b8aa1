//! Capability-check port.
//!
//! Views and editors never ask the store about roles directly. They get a
//! `CapabilityCheck` injected and ask it whether a user may do something.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use tascboard_common::{BoardId, Result, TascId, TrackId, UserId};
use tascboard_model::Capability;

use crate::store::WorkspaceStore;

/// What a capability is checked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CapabilityScope {
    Board(BoardId),
    Track(TrackId),
    Tasc(TascId),
}

/// Answers whether a user holds a capability on a scope.
#[async_trait]
pub trait CapabilityCheck: Send + Sync {
    /// # Errors
    /// - The scope does not exist
    async fn can(
        &self,
        user: &UserId,
        capability: Capability,
        scope: &CapabilityScope,
    ) -> Result<bool>;
}

/// Capability check backed by board memberships in a store.
pub struct RoleCapabilities {
    store: Arc<dyn WorkspaceStore>,
}

impl RoleCapabilities {
    pub fn new(store: Arc<dyn WorkspaceStore>) -> Self {
        Self { store }
    }

    async fn board_of(&self, scope: &CapabilityScope) -> Result<BoardId> {
        match scope {
            CapabilityScope::Board(board) => Ok(board.clone()),
            CapabilityScope::Track(track) => Ok(self.store.get_track(track).await?.board),
            CapabilityScope::Tasc(tasc) => {
                let track = self.store.get_tasc(tasc).await?.track;
                Ok(self.store.get_track(&track).await?.board)
            }
        }
    }
}

#[async_trait]
impl CapabilityCheck for RoleCapabilities {
    async fn can(
        &self,
        user: &UserId,
        capability: Capability,
        scope: &CapabilityScope,
    ) -> Result<bool> {
        let board_id = self.board_of(scope).await?;
        let board = self.store.get_board(&board_id).await?;
        let allowed = board
            .role_of(user)
            .is_some_and(|role| role.grants(capability));
        debug!(
            "Capability {:?} for {} on board {}: {}",
            capability, user, board_id, allowed
        );
        Ok(allowed)
    }
}
