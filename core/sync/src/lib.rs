//! Tascboard auto-sync engine.
//!
//! This module keeps detail editors persisted while the user types:
//! - Debounced saves after a quiet period
//! - Single-flight saves; overlapping attempts are dropped
//! - No-op detection by canonical snapshot comparison
//! - Tri-state status (`synced`, `unsaved`, `saving`) for UI feedback

pub mod config;
pub mod controller;
pub mod handler;
pub mod snapshot;
pub mod state;

// Re-export main types
pub use config::AutoSyncConfig;
pub use controller::{AutoSyncController, AutoSyncOptions, ErrorCallback, SuccessCallback};
pub use handler::{save_fn, SaveFn, SaveHandler};
pub use snapshot::CanonicalSnapshot;
pub use state::SyncState;
