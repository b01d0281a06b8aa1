//! Common utilities and types shared across Tascboard crates.
//!
//! This module provides the workspace error type and the strongly typed
//! identifiers used for organizations, boards, tracks, tascs and users.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{BoardId, OrgId, TascId, TrackId, UserId};
