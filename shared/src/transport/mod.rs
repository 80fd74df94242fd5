pub mod error;
mod loopback;
mod relay;

pub use error::TransportError;
pub use loopback::{LoopbackEnd, LoopbackPipe, LoopbackReceiver};
pub use relay::{split_relayed, RelaySender};

use crate::types::Delivery;

/// The capability set every connection variant provides: hand raw frame
/// bytes to the transport, and close it.
pub trait PacketSender: Send {
    fn send(&mut self, frame: &[u8], delivery: Delivery) -> Result<(), TransportError>;

    fn close(&mut self);
}

/// The connection variants the framing, fragmentation and dispatch logic is
/// written against
pub enum Transport {
    /// In-process pipe, e.g. a host playing on its own server
    Loopback(LoopbackEnd),
    /// A peer reached through an external reliable-UDP or P2P library
    Networked(Box<dyn PacketSender>),
    /// A peer reached through a relay host
    Relay(RelaySender),
}

impl Transport {
    pub fn networked<S: PacketSender + 'static>(sender: S) -> Self {
        Transport::Networked(Box::new(sender))
    }
}

impl PacketSender for Transport {
    fn send(&mut self, frame: &[u8], delivery: Delivery) -> Result<(), TransportError> {
        match self {
            Transport::Loopback(end) => end.send(frame, delivery),
            Transport::Networked(sender) => sender.send(frame, delivery),
            Transport::Relay(relay) => relay.send(frame, delivery),
        }
    }

    fn close(&mut self) {
        match self {
            Transport::Loopback(end) => end.close(),
            Transport::Networked(sender) => sender.close(),
            Transport::Relay(relay) => relay.close(),
        }
    }
}

impl From<LoopbackEnd> for Transport {
    fn from(end: LoopbackEnd) -> Self {
        Transport::Loopback(end)
    }
}

impl From<RelaySender> for Transport {
    fn from(relay: RelaySender) -> Self {
        Transport::Relay(relay)
    }
}
