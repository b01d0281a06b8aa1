//! Activity history port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use tascboard_common::{BoardId, Result, UserId};

/// Kind of recorded activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    BoardUpdated,
    TrackUpdated,
    TascUpdated,
}

/// One entry in a board's activity history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    /// Board the activity belongs to.
    pub board: BoardId,
    pub actor: UserId,
    pub kind: ActivityKind,
    /// Id of the changed board, track or tasc.
    pub subject: String,
    pub summary: String,
    pub at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        board: BoardId,
        actor: UserId,
        kind: ActivityKind,
        subject: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            board,
            actor,
            kind,
            subject: subject.into(),
            summary: summary.into(),
            at: Utc::now(),
        }
    }
}

/// Records activity for the history view.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append an entry.
    async fn record(&self, entry: ActivityEntry) -> Result<()>;

    /// Entries for a board, oldest first.
    async fn entries_for(&self, board: &BoardId) -> Result<Vec<ActivityEntry>>;
}

/// In-memory activity log.
#[derive(Default)]
pub struct MemoryActivityLog {
    entries: RwLock<Vec<ActivityEntry>>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn record(&self, entry: ActivityEntry) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        Ok(())
    }

    async fn entries_for(&self, board: &BoardId) -> Result<Vec<ActivityEntry>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| &e.board == board)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_are_scoped_to_board() {
        let log = MemoryActivityLog::new();
        let alice = UserId::new("alice").unwrap();
        let b1 = BoardId::new("b1").unwrap();
        let b2 = BoardId::new("b2").unwrap();

        log.record(ActivityEntry::new(
            b1.clone(),
            alice.clone(),
            ActivityKind::BoardUpdated,
            "b1",
            "Updated board",
        ))
        .await
        .unwrap();
        log.record(ActivityEntry::new(
            b2,
            alice,
            ActivityKind::TrackUpdated,
            "t9",
            "Updated track",
        ))
        .await
        .unwrap();

        let entries = log.entries_for(&b1).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ActivityKind::BoardUpdated);
    }

    #[test]
    fn test_entry_serialization() {
        let entry = ActivityEntry::new(
            BoardId::new("b1").unwrap(),
            UserId::new("alice").unwrap(),
            ActivityKind::TascUpdated,
            "x1",
            "Moved to done",
        );
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"tasc_updated\""));
    }
}
