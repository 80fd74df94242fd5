use std::default::Default;

use lockstep_shared::{ConnectionConfig, SyncConfig};

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Used to configure the connections with Clients
    pub connection: ConnectionConfig,
    /// Username limits and ledger retention
    pub sync: SyncConfig,
    /// Seed handed to every client's simulation. Drawn at random when None.
    pub session_seed: Option<u64>,
    /// Connections beyond this are refused
    pub max_players: usize,
    /// Initial world state sent to each joining client
    pub world_data: Vec<u8>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            sync: SyncConfig::default(),
            session_seed: None,
            max_players: 16,
            world_data: Vec::new(),
        }
    }
}
