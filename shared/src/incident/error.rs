use lockstep_serde::SerdeErr;
use thiserror::Error;

/// Errors raised while assembling, encoding or storing an incident report.
///
/// None of these affect the session; callers log them and carry on.
#[derive(Debug, Error)]
pub enum IncidentError {
    #[error("incident sink failed: {reason}")]
    Sink { reason: String },

    #[error("incident writer thread panicked")]
    WorkerPanicked,

    #[error("could not spawn incident writer: {reason}")]
    Spawn { reason: String },

    #[error("archive compression failed: {reason}")]
    Compression { reason: String },

    #[error("archive entry {name} is {size} bytes, more than the maximum of {max}")]
    EntryTooLarge {
        name: String,
        size: usize,
        max: usize,
    },

    #[error("malformed archive: {0}")]
    Malformed(#[from] SerdeErr),
}
