use lockstep_serde::{ByteReader, SerdeErr};

use crate::{
    connection::{
        error::{ConnectionError, FramingError},
        frame_header::{FragFlag, FrameHeader},
    },
    protocol::{PacketId, ProtocolViolation},
};

struct InFlight {
    packet: PacketId,
    declared: usize,
    buffer: Vec<u8>,
}

/// Reassembles fragmented messages for one connection. Only one fragmented
/// message may be in flight per connection, and fragments are assumed to
/// arrive in order.
pub struct FragmentReceiver {
    in_flight: Option<InFlight>,
    max_message_size: usize,
}

impl FragmentReceiver {
    pub fn new(max_message_size: usize) -> Self {
        Self {
            in_flight: None,
            max_message_size,
        }
    }

    pub fn is_reassembling(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Accepts one frame body.
    ///
    /// Returns Ok(None) if more fragments are needed, Ok(Some(reader)) once a
    /// whole message is available, or Err if the frame breaks the protocol
    pub fn receive(
        &mut self,
        header: FrameHeader,
        body: &[u8],
    ) -> Result<Option<ByteReader>, ConnectionError> {
        if header.flag == FragFlag::None {
            return Ok(Some(ByteReader::from_slice(body)));
        }

        if !header.packet.is_fragmentable() {
            return Err(ProtocolViolation::UnexpectedFragment {
                packet: header.packet,
            }
            .into());
        }

        let result = self.accumulate(header, body);
        if result.is_err() {
            self.in_flight = None;
        }
        result
    }

    fn accumulate(
        &mut self,
        header: FrameHeader,
        body: &[u8],
    ) -> Result<Option<ByteReader>, ConnectionError> {
        match self.in_flight.as_mut() {
            Some(in_flight) => {
                if in_flight.packet != header.packet {
                    return Err(ProtocolViolation::InterleavedFragment {
                        in_flight: in_flight.packet,
                        received: header.packet,
                    }
                    .into());
                }
                in_flight.buffer.extend_from_slice(body);
            }
            None => {
                if header.flag == FragFlag::End {
                    return Err(ProtocolViolation::FragmentWithoutStart {
                        packet: header.packet,
                    }
                    .into());
                }
                let started = self.start(header.packet, body)?;
                self.in_flight = Some(started);
            }
        }

        let Some(in_flight) = self.in_flight.as_ref() else {
            return Ok(None);
        };
        if in_flight.buffer.len() > self.max_message_size {
            return Err(FramingError::OversizedMessage {
                size: in_flight.buffer.len(),
                limit: self.max_message_size,
            }
            .into());
        }
        if in_flight.buffer.len() > in_flight.declared {
            return Err(FramingError::FragmentLengthMismatch {
                declared: in_flight.declared,
                received: in_flight.buffer.len(),
            }
            .into());
        }

        if header.flag == FragFlag::More {
            return Ok(None);
        }

        let Some(finished) = self.in_flight.take() else {
            return Ok(None);
        };
        if finished.buffer.len() != finished.declared {
            return Err(FramingError::FragmentLengthMismatch {
                declared: finished.declared,
                received: finished.buffer.len(),
            }
            .into());
        }
        Ok(Some(ByteReader::new(finished.buffer)))
    }

    fn start(&self, packet: PacketId, body: &[u8]) -> Result<InFlight, ConnectionError> {
        let mut reader = ByteReader::from_slice(body);
        let declared = reader.read_i32()?;
        if declared < 0 {
            return Err(SerdeErr::NegativeLength { length: declared }.into());
        }
        let declared = declared as usize;
        if declared > self.max_message_size {
            return Err(FramingError::OversizedMessage {
                size: declared,
                limit: self.max_message_size,
            }
            .into());
        }

        let mut buffer = Vec::with_capacity(declared);
        buffer.extend_from_slice(reader.read_to_end());
        Ok(InFlight {
            packet,
            declared,
            buffer,
        })
    }
}
