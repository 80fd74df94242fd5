use std::default::Default;

use lockstep_shared::{ConnectionConfig, SyncConfig};

/// Contains Config properties which will be used by a Client
#[derive(Clone)]
pub struct ClientConfig {
    /// Used to configure the connection with the Server
    pub connection: ConnectionConfig,
    /// Ledger retention and incident window size
    pub sync: SyncConfig,
    /// Display name sent while joining
    pub username: String,
    /// Ask the server to accept a steam session before the protocol check
    pub steam_handshake: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            sync: SyncConfig::default(),
            username: "player".to_string(),
            steam_handshake: false,
        }
    }
}
