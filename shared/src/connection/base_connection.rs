use log::trace;

use crate::{
    connection::{
        connection_config::ConnectionConfig, error::ConnectionError,
        fragment_receiver::FragmentReceiver, fragmenter::split_message,
        frame_header::FrameHeader, state_machine::IncomingMessage,
    },
    protocol::{Packet, PacketId},
    transport::{PacketSender, Transport},
    types::Delivery,
};

/// Framing and fragmentation for one connection, written once against the
/// [`Transport`] abstraction
pub struct BaseConnection {
    transport: Transport,
    fragments: FragmentReceiver,
    config: ConnectionConfig,
    closed: bool,
}

impl BaseConnection {
    pub fn new(transport: Transport, config: &ConnectionConfig) -> Self {
        Self {
            transport,
            fragments: FragmentReceiver::new(config.max_message_size),
            config: config.clone(),
            closed: false,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Frames `payload` as `packet` (fragmenting if needed) and hands every
    /// frame to the transport with the packet's delivery mode
    pub fn send_payload(
        &mut self,
        packet: PacketId,
        payload: &[u8],
    ) -> Result<(), ConnectionError> {
        if self.closed {
            return Err(ConnectionError::Disconnected);
        }
        let delivery = packet.delivery();
        let frames = split_message(packet, payload, &self.config)?;
        trace!(
            "sending {:?}: {} bytes in {} frame(s)",
            packet,
            payload.len(),
            frames.len()
        );
        for frame in frames {
            self.transport.send(&frame, delivery)?;
        }
        Ok(())
    }

    pub fn send<P: Packet>(&mut self, packet: &P) -> Result<(), ConnectionError> {
        self.send_payload(P::ID, &packet.to_payload())
    }

    /// Strips the header from a received frame. Returns the whole message
    /// once available, or None while a fragmented message is still arriving
    pub fn read_frame(
        &mut self,
        frame: &[u8],
        delivery: Delivery,
    ) -> Result<Option<IncomingMessage>, ConnectionError> {
        if self.closed {
            return Err(ConnectionError::Disconnected);
        }
        let (header, body) = FrameHeader::split(frame)?;
        let reader = self.fragments.receive(header, body)?;
        Ok(reader.map(|reader| IncomingMessage {
            packet: header.packet,
            delivery,
            reader,
        }))
    }

    /// Closes the transport. Safe to call more than once.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.transport.close();
        }
    }
}
