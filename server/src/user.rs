use std::sync::Arc;

use lockstep_shared::{PlayerId, Tick};

// UserKey
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct UserKey(u64);

impl UserKey {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

/// Shared across every connection's context
pub(crate) struct JoinInfo {
    pub session_seed: u64,
    pub world: Vec<u8>,
    pub max_username_length: usize,
}

/// Work a handler cannot do alone because it involves other connections
pub(crate) enum ServerAction {
    Joined,
    Command(Vec<u8>),
    /// Raw ledger bytes, already validated
    SyncInfo(Box<[u8]>),
    Desynced {
        last_valid_tick: Option<Tick>,
        divergence_index: u32,
    },
    Traces(String),
}

/// Per-connection state the server's packet handlers operate on
pub(crate) struct UserContext {
    pub key: UserKey,
    pub player_id: PlayerId,
    pub username: Option<String>,
    /// Server tick at the time the current message is processed
    pub tick: Tick,
    pub join: Arc<JoinInfo>,
    pub actions: Vec<ServerAction>,
}

impl UserContext {
    pub fn new(key: UserKey, player_id: PlayerId, tick: Tick, join: Arc<JoinInfo>) -> Self {
        Self {
            key,
            player_id,
            username: None,
            tick,
            join,
            actions: Vec::new(),
        }
    }
}
