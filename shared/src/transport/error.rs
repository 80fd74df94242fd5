use thiserror::Error;

/// Errors that can occur while handing frames to the underlying transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport was closed by either side
    #[error("Transport is closed")]
    Closed,

    /// The transport refused or failed to send a frame
    #[error("Failed to send frame: {reason}")]
    SendFailed { reason: String },
}
