use lockstep_serde::ByteReader;

use crate::{
    connection::{connection_state::ConnectionState, error::ConnectionError, Transition},
    protocol::{Packet, PacketId, MAX_PACKET_ID},
};

const TABLE_SIZE: usize = MAX_PACKET_ID as usize + 1;

/// A packet handler. Runs synchronously on the thread pumping the
/// connection, must not block, and queues any replies into the [`Outbox`].
pub type PacketHandler<C> =
    fn(&mut C, &mut Outbox, &mut ByteReader) -> Result<Transition, ConnectionError>;

/// Fixed mapping from packet id to handler for one connection state
pub struct DispatchTable<C> {
    handlers: [Option<PacketHandler<C>>; TABLE_SIZE],
}

impl<C> DispatchTable<C> {
    pub fn new() -> Self {
        Self {
            handlers: [None; TABLE_SIZE],
        }
    }

    pub fn on(mut self, packet: PacketId, handler: PacketHandler<C>) -> Self {
        self.handlers[packet.id() as usize] = Some(handler);
        self
    }

    pub fn get(&self, packet: PacketId) -> Option<PacketHandler<C>> {
        self.handlers[packet.id() as usize]
    }

    pub fn handles(&self, packet: PacketId) -> bool {
        self.get(packet).is_some()
    }
}

impl<C> Default for DispatchTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// One dispatch table per non-terminal state of a role, built once
pub struct StateTables<C> {
    tables: Vec<(ConnectionState, DispatchTable<C>)>,
}

impl<C> StateTables<C> {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn with(mut self, state: ConnectionState, table: DispatchTable<C>) -> Self {
        self.tables.retain(|(existing, _)| *existing != state);
        self.tables.push((state, table));
        self
    }

    pub fn get(&self, state: ConnectionState) -> Option<&DispatchTable<C>> {
        self.tables
            .iter()
            .find(|(existing, _)| *existing == state)
            .map(|(_, table)| table)
    }
}

impl<C> Default for StateTables<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Replies queued by handlers, flushed by the owning connection once the
/// handler has returned
#[derive(Default)]
pub struct Outbox {
    queued: Vec<(PacketId, Box<[u8]>)>,
}

impl Outbox {
    pub fn new() -> Self {
        Self { queued: Vec::new() }
    }

    pub fn push<P: Packet>(&mut self, packet: &P) {
        self.queued.push((P::ID, packet.to_payload()));
    }

    pub fn push_raw(&mut self, packet: PacketId, payload: Box<[u8]>) {
        self.queued.push((packet, payload));
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, (PacketId, Box<[u8]>)> {
        self.queued.drain(..)
    }
}
