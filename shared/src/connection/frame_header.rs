// One header byte precedes every frame: the 6-bit packet id in the high
// bits, the 2-bit fragment flag in the low bits.

use crate::protocol::{PacketId, ProtocolViolation};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FragFlag {
    // A whole message in one frame
    None = 0,
    // A fragment with more to follow
    More = 1,
    // The last fragment
    End = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub packet: PacketId,
    pub flag: FragFlag,
}

impl FrameHeader {
    pub fn new(packet: PacketId, flag: FragFlag) -> Self {
        Self { packet, flag }
    }

    pub fn to_byte(self) -> u8 {
        (self.packet.id() << 2) | self.flag as u8
    }

    pub fn from_byte(byte: u8) -> Result<Self, ProtocolViolation> {
        let flag = match byte & 0b11 {
            0 => FragFlag::None,
            1 => FragFlag::More,
            2 => FragFlag::End,
            bits => return Err(ProtocolViolation::InvalidFragmentFlag { bits }),
        };
        let packet = PacketId::from_id(byte >> 2)?;
        Ok(Self { packet, flag })
    }

    /// Splits a raw frame into its header and body
    pub fn split(frame: &[u8]) -> Result<(Self, &[u8]), ProtocolViolation> {
        let (first, body) = frame.split_first().ok_or(ProtocolViolation::EmptyFrame)?;
        Ok((Self::from_byte(*first)?, body))
    }
}
