// Framing

/// Payloads larger than this (in bytes) are split into MORE/END fragments.
/// Sized for the tightest transport's single-message limit.
pub const FRAGMENT_SIZE: usize = 50_000;

/// Absolute ceiling on a reassembled message. Anything larger is treated as
/// corruption or abuse and closes the connection.
pub const MAX_FRAGMENTED_MESSAGE_SIZE: usize = 32 * 1024 * 1024;

// Sync

/// Number of finalized ledgers retained per role while waiting for a
/// counterpart
pub const MAX_KNOWN_LEDGERS: usize = 30;

/// Samples kept on each side of a divergence point in incident reports
pub const TRACE_WINDOW_RADIUS: usize = 40;

/// Longest display name accepted on the wire, in bytes
pub const MAX_USERNAME_LENGTH: usize = 32;
