use lockstep_serde::SerdeErr;
use thiserror::Error;

use crate::{protocol::PacketId, protocol::ProtocolViolation, transport::TransportError};

/// Errors raised while splitting or reassembling messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    /// Message (declared or accumulated) exceeds the absolute ceiling
    #[error("Message of {size} bytes exceeds the maximum of {limit} bytes. This indicates protocol corruption or abuse")]
    OversizedMessage { size: usize, limit: usize },

    /// Reassembled message does not match the length its first fragment declared
    #[error("Reassembled message is {received} bytes but its first fragment declared {declared}")]
    FragmentLengthMismatch { declared: usize, received: usize },

    /// Payload exceeds the fragment ceiling on a packet that can't be fragmented
    #[error("Payload of {size} bytes for {packet:?} exceeds the fragment size of {limit} bytes and the packet is not fragmentable")]
    NotFragmentable {
        packet: PacketId,
        size: usize,
        limit: usize,
    },
}

/// Coarse classification of a [`ConnectionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedMessage,
    OversizedMessage,
    ProtocolViolation,
    Transport,
    Disconnected,
}

/// Connection-level errors. Every one of these is fatal to the connection
/// it occurred on: the framing contract was broken, so further bytes can't
/// be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Bad length prefix, truncated buffer or invalid value
    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] SerdeErr),

    /// Framing error
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    /// Protocol violation
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    /// Transport error
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Connection is already closed
    #[error("Connection is disconnected")]
    Disconnected,
}

impl ConnectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectionError::MalformedMessage(_) => ErrorKind::MalformedMessage,
            ConnectionError::Framing(FramingError::FragmentLengthMismatch { .. }) => {
                ErrorKind::MalformedMessage
            }
            ConnectionError::Framing(_) => ErrorKind::OversizedMessage,
            ConnectionError::Protocol(_) => ErrorKind::ProtocolViolation,
            ConnectionError::Transport(_) => ErrorKind::Transport,
            ConnectionError::Disconnected => ErrorKind::Disconnected,
        }
    }
}
