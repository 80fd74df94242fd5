use lockstep_serde::{ByteReader, SerdeErr};

use super::{PacketSender, TransportError};
use crate::types::Delivery;

/// Reaches a peer through a relay host: every frame is prefixed with the
/// 4-byte id of the peer it is meant for and forwarded upstream
pub struct RelaySender {
    upstream: Box<dyn PacketSender>,
    target: u32,
}

impl RelaySender {
    pub fn new(upstream: Box<dyn PacketSender>, target: u32) -> Self {
        Self { upstream, target }
    }

    pub fn target(&self) -> u32 {
        self.target
    }
}

impl PacketSender for RelaySender {
    fn send(&mut self, frame: &[u8], delivery: Delivery) -> Result<(), TransportError> {
        let mut relayed = Vec::with_capacity(frame.len() + 4);
        relayed.extend_from_slice(&self.target.to_le_bytes());
        relayed.extend_from_slice(frame);
        self.upstream.send(&relayed, delivery)
    }

    fn close(&mut self) {
        self.upstream.close();
    }
}

/// Splits a relayed frame into the target peer id and the inner frame
pub fn split_relayed(bytes: &[u8]) -> Result<(u32, &[u8]), SerdeErr> {
    let mut reader = ByteReader::from_slice(bytes);
    let target = reader.read_u32()?;
    Ok((target, &bytes[4..]))
}
