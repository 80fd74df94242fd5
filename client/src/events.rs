use std::{mem, vec::IntoIter};

use lockstep_shared::{Divergence, IncidentReport, PlayerId, ServerDesynced, Tick};

pub struct Events {
    connections: Vec<PlayerId>,
    disconnections: Vec<Option<String>>,
    synced: Vec<Tick>,
    desyncs: Vec<(Box<Divergence>, IncidentReport)>,
    peer_desyncs: Vec<ServerDesynced>,

    empty: bool,
}

impl Default for Events {
    fn default() -> Self {
        Self::new()
    }
}

impl Events {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            synced: Vec::new(),
            desyncs: Vec::new(),
            peer_desyncs: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: Event>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: Event>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, player_id: PlayerId) {
        self.connections.push(player_id);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, reason: Option<String>) {
        self.disconnections.push(reason);
        self.empty = false;
    }

    pub(crate) fn push_synced(&mut self, tick: Tick) {
        self.synced.push(tick);
        self.empty = false;
    }

    pub(crate) fn push_desync(&mut self, divergence: Box<Divergence>, report: IncidentReport) {
        self.desyncs.push((divergence, report));
        self.empty = false;
    }

    pub(crate) fn push_peer_desync(&mut self, notice: ServerDesynced) {
        self.peer_desyncs.push(notice);
        self.empty = false;
    }
}

// Event Trait
pub trait Event {
    type Iter;

    fn iter(events: &mut Events) -> Self::Iter;

    fn has(events: &Events) -> bool;
}

// ConnectEvent
pub struct ConnectEvent;
impl Event for ConnectEvent {
    type Iter = IntoIter<PlayerId>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.connections).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent, with the server's reason when it sent one
pub struct DisconnectEvent;
impl Event for DisconnectEvent {
    type Iter = IntoIter<Option<String>>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.disconnections).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.disconnections.is_empty()
    }
}

// SyncedEvent
pub struct SyncedEvent;
impl Event for SyncedEvent {
    type Iter = IntoIter<Tick>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.synced).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.synced.is_empty()
    }
}

// DesyncEvent
pub struct DesyncEvent;
impl Event for DesyncEvent {
    type Iter = IntoIter<(Box<Divergence>, IncidentReport)>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.desyncs).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.desyncs.is_empty()
    }
}

// PeerDesyncedEvent
pub struct PeerDesyncedEvent;
impl Event for PeerDesyncedEvent {
    type Iter = IntoIter<ServerDesynced>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.peer_desyncs).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.peer_desyncs.is_empty()
    }
}
