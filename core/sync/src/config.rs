//! Auto-sync configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for auto-sync behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSyncConfig {
    /// Quiet period in milliseconds.
    ///
    /// After a change, the controller waits this long before saving.
    /// Additional changes reset the timer.
    pub debounce_delay_ms: u64,

    /// Schedule another debounce cycle when a save completes and the
    /// latest values already differ from what was just saved.
    ///
    /// Off by default: edits whose timer fired during an in-flight save
    /// wait for the next change event.
    pub trailing_save: bool,
}

impl AutoSyncConfig {
    /// Default quiet period (2 seconds).
    pub const DEFAULT_DEBOUNCE_DELAY_MS: u64 = 2000;

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable or disable the trailing save.
    pub fn with_trailing_save(mut self, trailing_save: bool) -> Self {
        self.trailing_save = trailing_save;
        self
    }

    /// The debounce delay as a duration.
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }
}

impl Default for AutoSyncConfig {
    fn default() -> Self {
        Self {
            debounce_delay_ms: Self::DEFAULT_DEBOUNCE_DELAY_MS,
            trailing_save: false,
        }
    }
}
