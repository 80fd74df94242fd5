use crate::constants::{MAX_KNOWN_LEDGERS, MAX_USERNAME_LENGTH, TRACE_WINDOW_RADIUS};

/// Configuration for desync detection and incident reporting
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Finalized ledgers retained per role while waiting for a counterpart
    pub max_known_ledgers: usize,
    /// Stack samples kept on each side of a divergence point
    pub trace_window_radius: usize,
    /// Longest accepted display name, in bytes
    pub max_username_length: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_known_ledgers: MAX_KNOWN_LEDGERS,
            trace_window_radius: TRACE_WINDOW_RADIUS,
            max_username_length: MAX_USERNAME_LENGTH,
        }
    }
}
