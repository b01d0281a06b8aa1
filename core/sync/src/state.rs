//! Sync status shown next to a detail editor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state sync status of an auto-synced editor.
///
/// This is the only persistent feedback an editor shows. Save failures
/// are reported through the error callback and do not leave a state
/// behind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Everything the user typed has been persisted, or there is
    /// nothing new to persist.
    #[default]
    Synced,
    /// Local edits are waiting for the debounce window to close.
    Unsaved,
    /// A save call is in flight.
    Saving,
}

impl SyncState {
    /// Label used by the status pill.
    pub fn label(self) -> &'static str {
        match self {
            SyncState::Synced => "synced",
            SyncState::Unsaved => "unsaved",
            SyncState::Saving => "saving",
        }
    }

    /// Whether local edits may not have reached the endpoint yet.
    pub fn is_pending(self) -> bool {
        !matches!(self, SyncState::Synced)
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
