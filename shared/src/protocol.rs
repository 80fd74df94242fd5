mod error;
mod packet_id;
mod payloads;

pub use error::ProtocolViolation;
pub use packet_id::{PacketId, MAX_PACKET_ID};
pub use payloads::*;

/// Version of the packet catalog. The catalog is closed and versioned as one
/// unit: any change to an id, a payload grammar or a flag bumps this.
pub const PROTOCOL_VERSION: u32 = 1;
