use std::{mem, vec::IntoIter};

use lockstep_shared::{PlayerId, Tick};

use crate::{user::UserKey, LockstepServerError};

/// A client reported a desync against the reference ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesyncReport {
    pub user_key: UserKey,
    pub player_id: PlayerId,
    pub last_valid_tick: Option<Tick>,
    pub divergence_index: u32,
}

pub struct Events {
    connections: Vec<UserKey>,
    disconnections: Vec<(UserKey, Option<String>)>,
    errors: Vec<LockstepServerError>,
    desyncs: Vec<DesyncReport>,
    traces: Vec<(UserKey, String)>,

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
            errors: Vec::new(),
            desyncs: Vec::new(),
            traces: Vec::new(),

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

    pub(crate) fn push_connection(&mut self, user_key: &UserKey) {
        self.connections.push(*user_key);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, user_key: &UserKey, username: Option<String>) {
        self.disconnections.push((*user_key, username));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: LockstepServerError) {
        self.errors.push(error);
        self.empty = false;
    }

    pub(crate) fn push_desync(&mut self, report: DesyncReport) {
        self.desyncs.push(report);
        self.empty = false;
    }

    pub(crate) fn push_traces(&mut self, user_key: &UserKey, text: String) {
        self.traces.push((*user_key, text));
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
    type Iter = IntoIter<UserKey>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.connections).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent
pub struct DisconnectEvent;
impl Event for DisconnectEvent {
    type Iter = IntoIter<(UserKey, Option<String>)>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.disconnections).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.disconnections.is_empty()
    }
}

// ErrorEvent
pub struct ErrorEvent;
impl Event for ErrorEvent {
    type Iter = IntoIter<LockstepServerError>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.errors).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.errors.is_empty()
    }
}

// DesyncEvent
pub struct DesyncEvent;
impl Event for DesyncEvent {
    type Iter = IntoIter<DesyncReport>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.desyncs).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.desyncs.is_empty()
    }
}

// TracesEvent
pub struct TracesEvent;
impl Event for TracesEvent {
    type Iter = IntoIter<(UserKey, String)>;

    fn iter(events: &mut Events) -> Self::Iter {
        mem::take(&mut events.traces).into_iter()
    }

    fn has(events: &Events) -> bool {
        !events.traces.is_empty()
    }
}
