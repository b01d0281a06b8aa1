//! Persistence and collaborator ports for Tascboard.
//!
//! This module provides a trait-based interface for the workspace store,
//! the save endpoints the detail editors auto-sync against, and the ports
//! for the collaborators those endpoints talk to.
//!
//! # Design Principles
//! - Store isolation: editors only see `SaveHandler`s, never the store
//! - Async operations: every store and port call is async
//! - Injected collaborators: activity log and capability checks are traits

pub mod activity;
pub mod capability;
pub mod endpoint;
pub mod memory;
pub mod store;

pub use activity::{ActivityEntry, ActivityKind, ActivityLog, MemoryActivityLog};
pub use capability::{CapabilityCheck, CapabilityScope, RoleCapabilities};
pub use endpoint::{BoardEndpoint, TascEndpoint, TrackEndpoint};
pub use memory::MemoryStore;
pub use store::WorkspaceStore;
