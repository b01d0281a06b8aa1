//! Editable snapshots for the detail editors.
//!
//! A snapshot holds exactly the fields a user can change in a detail
//! editor. Snapshots are what the auto-sync controller serializes,
//! compares and hands to a save endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tascboard_common::{Error, Result, UserId};

use crate::entity::TascStatus;
use crate::role::Membership;

/// Maximum length of a board, track or tasc name.
pub const MAX_NAME_LEN: usize = 120;

fn validate_name(kind: &str, name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} name cannot be empty", kind)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(Error::Validation(format!(
            "{} name exceeds {} characters",
            kind, MAX_NAME_LEN
        )));
    }
    Ok(())
}

/// Editable fields of a board.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub name: String,
    pub description: String,
    pub members: Vec<Membership>,
}

impl BoardSnapshot {
    /// Validate the snapshot before persisting.
    ///
    /// # Errors
    /// - Name empty or too long
    /// - A user listed more than once in members
    pub fn validate(&self) -> Result<()> {
        validate_name("Board", &self.name)?;
        for (i, member) in self.members.iter().enumerate() {
            if self.members[..i].iter().any(|m| m.user == member.user) {
                return Err(Error::Validation(format!(
                    "User {} is listed twice",
                    member.user
                )));
            }
        }
        Ok(())
    }
}

/// Editable fields of a track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    pub name: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TrackSnapshot {
    /// Validate the snapshot before persisting.
    ///
    /// # Errors
    /// - Name empty or too long
    /// - End date before start date
    pub fn validate(&self) -> Result<()> {
        validate_name("Track", &self.name)?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::Validation(format!(
                    "Track ends ({}) before it starts ({})",
                    end, start
                )));
            }
        }
        Ok(())
    }
}

/// Editable fields of a tasc.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TascSnapshot {
    pub name: String,
    pub description: String,
    pub status: TascStatus,
    pub assignees: Vec<UserId>,
    pub due_date: Option<NaiveDate>,
}

impl TascSnapshot {
    /// Validate the snapshot before persisting.
    pub fn validate(&self) -> Result<()> {
        validate_name("Tasc", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;

    #[test]
    fn test_blank_name_rejected() {
        let snapshot = BoardSnapshot {
            name: "   ".to_string(),
            ..Default::default()
        };
        assert!(matches!(snapshot.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_long_name_rejected() {
        let snapshot = TascSnapshot {
            name: "x".repeat(MAX_NAME_LEN + 1),
            ..Default::default()
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_duplicate_member_rejected() {
        let user = UserId::new("u1").unwrap();
        let snapshot = BoardSnapshot {
            name: "Roadmap".to_string(),
            description: String::new(),
            members: vec![
                Membership::new(user.clone(), Role::Owner),
                Membership::new(user, Role::Viewer),
            ],
        };
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_track_dates_must_be_ordered() {
        let mut snapshot = TrackSnapshot {
            name: "Q3".to_string(),
            description: String::new(),
            start_date: NaiveDate::from_ymd_opt(2026, 7, 1),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 1),
        };
        assert!(snapshot.validate().is_err());

        snapshot.end_date = NaiveDate::from_ymd_opt(2026, 9, 30);
        assert!(snapshot.validate().is_ok());
    }
}
