//! Domain model for Tascboard.
//!
//! This module provides:
//! - Organizations, boards, tracks and tascs as persisted records
//! - Roles, memberships and the capabilities they grant
//! - Editable snapshots: the field sets the detail editors auto-sync
//!
//! # Architecture
//! Records carry identity and timestamps; snapshots carry only the fields
//! a user can edit. Endpoints apply a snapshot to a record.

pub mod entity;
pub mod role;
pub mod snapshot;

pub use entity::{Board, Organization, Tasc, TascStatus, Track};
pub use role::{Capability, Membership, Role};
pub use snapshot::{BoardSnapshot, TascSnapshot, TrackSnapshot, MAX_NAME_LEN};
