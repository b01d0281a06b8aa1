//! Persisted records: organizations, boards, tracks and tascs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tascboard_common::{BoardId, OrgId, TascId, TrackId, UserId};

use crate::role::{Membership, Role};
use crate::snapshot::{BoardSnapshot, TascSnapshot, TrackSnapshot};

/// Workflow status of a tasc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TascStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

/// A tenant. Owns boards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(id: OrgId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A board within an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub org: OrgId,
    pub name: String,
    pub description: String,
    pub members: Vec<Membership>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Board {
    /// Create a board owned by `owner`.
    pub fn new(id: BoardId, org: OrgId, name: impl Into<String>, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id,
            org,
            name: name.into(),
            description: String::new(),
            members: vec![Membership::new(owner, Role::Owner)],
            created_at: now,
            modified_at: now,
        }
    }

    /// Role of a user on this board, if they are a member.
    pub fn role_of(&self, user: &UserId) -> Option<Role> {
        self.members
            .iter()
            .find(|m| &m.user == user)
            .map(|m| m.role)
    }

    /// Editable fields of this board.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            members: self.members.clone(),
        }
    }

    /// Overwrite the editable fields from a snapshot.
    pub fn apply(&mut self, snapshot: BoardSnapshot) {
        self.name = snapshot.name;
        self.description = snapshot.description;
        self.members = snapshot.members;
        self.modified_at = Utc::now();
    }
}

/// A track (a lane of work) within a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub board: BoardId,
    pub name: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Track {
    pub fn new(id: TrackId, board: BoardId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            board,
            name: name.into(),
            description: String::new(),
            start_date: None,
            end_date: None,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn snapshot(&self) -> TrackSnapshot {
        TrackSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn apply(&mut self, snapshot: TrackSnapshot) {
        self.name = snapshot.name;
        self.description = snapshot.description;
        self.start_date = snapshot.start_date;
        self.end_date = snapshot.end_date;
        self.modified_at = Utc::now();
    }
}

/// A work item within a track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tasc {
    pub id: TascId,
    pub track: TrackId,
    pub name: String,
    pub description: String,
    pub status: TascStatus,
    pub assignees: Vec<UserId>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Tasc {
    pub fn new(id: TascId, track: TrackId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            track,
            name: name.into(),
            description: String::new(),
            status: TascStatus::Todo,
            assignees: Vec::new(),
            due_date: None,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn snapshot(&self) -> TascSnapshot {
        TascSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            assignees: self.assignees.clone(),
            due_date: self.due_date,
        }
    }

    pub fn apply(&mut self, snapshot: TascSnapshot) {
        self.name = snapshot.name;
        self.description = snapshot.description;
        self.status = snapshot.status;
        self.assignees = snapshot.assignees;
        self.due_date = snapshot.due_date;
        self.modified_at = Utc::now();
    }
}
