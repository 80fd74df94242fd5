use thiserror::Error;

use crate::{connection::ConnectionState, protocol::PacketId, types::HostType};

/// Violations of the framing or dispatch contract. Always fatal to the
/// connection they occur on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// Received a frame with no header byte
    #[error("Received an empty frame with no header byte")]
    EmptyFrame,

    /// Header named a packet id outside the catalog
    #[error("Unknown packet id {id} (catalog is closed). This may indicate a malformed or malicious packet")]
    UnknownPacketId { id: u8 },

    /// Header carried the reserved fragment flag value
    #[error("Invalid fragment flag bits {bits:#04b} in frame header")]
    InvalidFragmentFlag { bits: u8 },

    /// A packet that may never be fragmented arrived with a fragment flag
    #[error("Packet {packet:?} is not fragmentable but arrived with a fragment flag set")]
    UnexpectedFragment { packet: PacketId },

    /// An END fragment arrived with no fragmented message in flight
    #[error("Final fragment of {packet:?} arrived with no fragmented message in flight")]
    FragmentWithoutStart { packet: PacketId },

    /// A fragment for a different packet arrived while one was in flight
    #[error("Fragment of {received:?} arrived while {in_flight:?} was still being reassembled")]
    InterleavedFragment {
        in_flight: PacketId,
        received: PacketId,
    },

    /// A packet only the receiving role may send arrived from its peer
    #[error("Packet {packet:?} is sent by the {receiver:?} and cannot be received by it")]
    WrongDirection { packet: PacketId, receiver: HostType },

    /// A reliable message arrived that the current state has no handler for
    #[error("No handler for reliable packet {packet:?} in state {state:?}")]
    NoHandler {
        packet: PacketId,
        state: ConnectionState,
    },

    /// A handler requested a state change the role does not allow
    #[error("Illegal connection state transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// Remote speaks a different packet catalog version
    #[error("Remote protocol version {remote} does not match local version {local}")]
    UnsupportedProtocolVersion { remote: u32, local: u32 },
}
