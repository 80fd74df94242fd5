use std::{collections::BTreeMap, mem, sync::Arc};

use log::{debug, info, warn};

use lockstep_shared::{
    ConnectionState, Delivery, DispatchOutcome, HostType, Packet, PacketId, PacketSender,
    PeerConnection, PlayerId, ServerCommand, ServerDesynced, ServerDisconnect, ServerTimeControl,
    Tick, Transport,
};

use super::server_config::ServerConfig;
use crate::{
    connection::handlers::server_tables,
    events::{DesyncReport, Events},
    user::{JoinInfo, ServerAction, UserContext, UserKey},
    LockstepServerError,
};

/// Authoritative host of a lockstep session.
///
/// The server does not simulate. It owns the tick counter, stamps every
/// command with it, and relays the reference player's ledgers so the other
/// clients can compare against them. The reference player is the first to
/// reach Playing.
pub struct Server {
    config: ServerConfig,
    join: Arc<JoinInfo>,
    users: BTreeMap<UserKey, PeerConnection<UserContext>>,
    next_user_key: u64,
    next_player_id: PlayerId,
    tick: Tick,
    reference: Option<UserKey>,
    events: Events,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let session_seed = config.session_seed.unwrap_or_else(|| fastrand::u64(..));
        info!(
            "server started (seed {:016x}, {} bytes of world data)",
            session_seed,
            config.world_data.len()
        );
        let join = Arc::new(JoinInfo {
            session_seed,
            world: config.world_data.clone(),
            max_username_length: config.sync.max_username_length,
        });
        Self {
            config,
            join,
            users: BTreeMap::new(),
            next_user_key: 0,
            next_player_id: 0,
            tick: 0,
            reference: None,
            events: Events::new(),
        }
    }

    // Connections

    /// Registers a new connection in Joining
    pub fn accept(&mut self, mut transport: Transport) -> Result<UserKey, LockstepServerError> {
        if self.users.len() >= self.config.max_players {
            transport.close();
            return Err(LockstepServerError::ServerFull {
                max_players: self.config.max_players,
            });
        }

        let user_key = UserKey::new(self.next_user_key);
        self.next_user_key += 1;
        let player_id = self.next_player_id;
        self.next_player_id += 1;

        let context = UserContext::new(user_key, player_id, self.tick, self.join.clone());
        let connection = PeerConnection::new(
            HostType::Server,
            ConnectionState::Joining,
            server_tables(),
            transport,
            &self.config.connection,
            context,
        );
        self.users.insert(user_key, connection);
        info!("accepted {:?} as player {}", user_key, player_id);
        Ok(user_key)
    }

    /// Feeds one frame received from `user_key`.
    ///
    /// A fatal error closes that connection, emits error and disconnect
    /// events, and is returned.
    pub fn receive(
        &mut self,
        user_key: &UserKey,
        frame: &[u8],
        delivery: Delivery,
    ) -> Result<DispatchOutcome, LockstepServerError> {
        let Some(connection) = self.users.get_mut(user_key) else {
            return Err(LockstepServerError::UnknownUser {
                user_key: *user_key,
            });
        };

        connection.context_mut().tick = self.tick;
        let result = connection.receive(frame, delivery);
        let actions = mem::take(&mut connection.context_mut().actions);
        let disconnected = connection.is_disconnected();

        for action in actions {
            self.apply(*user_key, action);
        }
        if disconnected {
            self.remove_user(user_key);
        }

        result.map_err(|error| {
            self.events
                .push_error(LockstepServerError::connection(*user_key, error.clone()));
            LockstepServerError::connection(*user_key, error)
        })
    }

    /// Sends a disconnect reason and closes the connection
    pub fn disconnect(
        &mut self,
        user_key: &UserKey,
        reason: &str,
    ) -> Result<(), LockstepServerError> {
        let Some(connection) = self.users.get_mut(user_key) else {
            return Err(LockstepServerError::UnknownUser {
                user_key: *user_key,
            });
        };
        if let Err(error) = connection.send(&ServerDisconnect {
            reason: reason.to_string(),
        }) {
            debug!("disconnect reason not delivered to {:?}: {}", user_key, error);
        }
        connection.disconnect();
        self.remove_user(user_key);
        Ok(())
    }

    // Time

    /// Advances the authoritative tick and tells every playing client
    pub fn advance_tick(&mut self) -> Tick {
        self.tick += 1;
        self.broadcast(&ServerTimeControl { tick: self.tick }, None);
        self.tick
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    // Queries

    pub fn session_seed(&self) -> u64 {
        self.join.session_seed
    }

    pub fn reference_player(&self) -> Option<UserKey> {
        self.reference
    }

    pub fn user_keys(&self) -> Vec<UserKey> {
        self.users.keys().copied().collect()
    }

    pub fn users_count(&self) -> usize {
        self.users.len()
    }

    pub fn user_exists(&self, user_key: &UserKey) -> bool {
        self.users.contains_key(user_key)
    }

    pub fn user_state(&self, user_key: &UserKey) -> Option<ConnectionState> {
        self.users.get(user_key).map(PeerConnection::state)
    }

    pub fn username(&self, user_key: &UserKey) -> Option<&str> {
        self.users
            .get(user_key)
            .and_then(|connection| connection.context().username.as_deref())
    }

    pub fn player_id(&self, user_key: &UserKey) -> Option<PlayerId> {
        self.users
            .get(user_key)
            .map(|connection| connection.context().player_id)
    }

    /// Takes every event produced since the last call
    pub fn take_events(&mut self) -> Events {
        mem::take(&mut self.events)
    }

    // Private

    fn apply(&mut self, sender: UserKey, action: ServerAction) {
        let Some(player_id) = self.player_id(&sender) else {
            return;
        };
        match action {
            ServerAction::Joined => {
                self.events.push_connection(&sender);
                if self.reference.is_none() {
                    info!("player {} is the reference player", player_id);
                    self.reference = Some(sender);
                }
            }
            ServerAction::Command(data) => {
                let command = ServerCommand {
                    tick: self.tick,
                    player_id,
                    data,
                };
                self.broadcast(&command, None);
            }
            ServerAction::SyncInfo(bytes) => {
                if self.reference == Some(sender) {
                    self.broadcast_payload(PacketId::ServerSyncInfo, &bytes, Some(sender));
                } else {
                    debug!("ledger from non-reference player {} not relayed", player_id);
                }
            }
            ServerAction::Desynced {
                last_valid_tick,
                divergence_index,
            } => {
                self.events.push_desync(DesyncReport {
                    user_key: sender,
                    player_id,
                    last_valid_tick,
                    divergence_index,
                });
                let notice = ServerDesynced {
                    player_id,
                    last_valid_tick,
                };
                self.broadcast(&notice, Some(sender));
            }
            ServerAction::Traces(text) => {
                self.events.push_traces(&sender, text);
            }
        }
    }

    fn broadcast<P: Packet>(&mut self, packet: &P, except: Option<UserKey>) {
        self.broadcast_payload(P::ID, &packet.to_payload(), except);
    }

    /// Sends to every playing user but `except`. Users whose transport fails
    /// are disconnected.
    fn broadcast_payload(&mut self, packet: PacketId, payload: &[u8], except: Option<UserKey>) {
        let mut failed = Vec::new();
        for (user_key, connection) in self.users.iter_mut() {
            if Some(*user_key) == except || connection.state() != ConnectionState::Playing {
                continue;
            }
            if let Err(error) = connection.send_payload(packet, payload) {
                warn!("sending {:?} to {:?} failed: {}", packet, user_key, error);
                connection.disconnect();
                failed.push((*user_key, error));
            }
        }
        for (user_key, error) in failed {
            self.events
                .push_error(LockstepServerError::connection(user_key, error));
            self.remove_user(&user_key);
        }
    }

    fn remove_user(&mut self, user_key: &UserKey) {
        let Some(connection) = self.users.remove(user_key) else {
            return;
        };
        let username = connection.context().username.clone();
        info!("{:?} ({:?}) disconnected", user_key, username);
        self.events.push_disconnection(user_key, username);

        if self.reference == Some(*user_key) {
            self.reference = self
                .users
                .iter()
                .find(|(_, connection)| connection.state() == ConnectionState::Playing)
                .map(|(key, _)| *key);
            if let Some(next) = self.reference {
                info!("{:?} is now the reference player", next);
            }
        }
    }
}
