//! Common types used throughout Tascboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from a string.
            ///
            /// # Errors
            /// - Returns error if id is empty or contains whitespace
            pub fn new(id: impl Into<String>) -> crate::Result<Self> {
                let id = id.into();
                if id.is_empty() {
                    return Err(crate::Error::InvalidInput(concat!(
                        $label,
                        " cannot be empty"
                    )
                    .to_string()));
                }
                if id.chars().any(char::is_whitespace) {
                    return Err(crate::Error::InvalidInput(format!(
                        "{} cannot contain whitespace: {:?}",
                        $label, id
                    )));
                }
                Ok(Self(id))
            }

            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Get the inner string value.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = crate::Error;

            fn try_from(value: String) -> crate::Result<Self> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier for an organization (tenant).
    OrgId,
    "OrgId"
);
entity_id!(
    /// Unique identifier for a board within an organization.
    BoardId,
    "BoardId"
);
entity_id!(
    /// Unique identifier for a track within a board.
    TrackId,
    "TrackId"
);
entity_id!(
    /// Unique identifier for a tasc (work item) within a track.
    TascId,
    "TascId"
);
entity_id!(
    /// Unique identifier for a user account.
    UserId,
    "UserId"
);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_board_id_creation() {
        let id = BoardId::new("roadmap").unwrap();
        assert_eq!(id.as_str(), "roadmap");
        assert_eq!(id.to_string(), "roadmap");
    }

    #[test]
    fn test_empty_id_fails() {
        assert!(OrgId::new("").is_err());
        assert!(TascId::new("has space").is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(TrackId::generate(), TrackId::generate());
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<UserId>("\"\"").is_err());
        let id: UserId = serde_json::from_str("\"u-1\"").unwrap();
        assert_eq!(id.as_str(), "u-1");
    }

    proptest! {
        #[test]
        fn prop_non_blank_ids_round_trip_through_json(raw in "[a-zA-Z0-9_-]{1,32}") {
            let id = TascId::new(raw.clone()).unwrap();
            let json = serde_json::to_string(&id).unwrap();
            prop_assert_eq!(json, format!("\"{}\"", raw));
        }
    }
}
