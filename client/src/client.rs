use std::mem;

use log::{info, warn};

use lockstep_shared::{
    BacktraceCapture, ClientCommand, ClientKeepAlive, ClientProtocol, ClientSteamRequest,
    ConnectionError, ConnectionState, Delivery, DispatchOutcome, HostType, Outbox, PacketId,
    PeerConnection, PlayerId, ServerCommand, Session, SnapshotProvider, StackCapture, Tick,
    Transport, PROTOCOL_VERSION,
};

use crate::{
    client_config::ClientConfig, connection::handlers::client_tables, context::ClientContext,
    events::Events, LockstepClientError,
};

/// One participant of a lockstep session.
///
/// After joining, the embedding simulation records its random draws through
/// [`Client::session_mut`] and closes each tick window with
/// [`Client::close_sync_window`]. Ledgers relayed from the reference player
/// are compared as they arrive.
pub struct Client {
    connection: PeerConnection<ClientContext>,
    connect_sent: bool,
}

impl Client {
    pub fn new(config: ClientConfig, transport: Transport) -> Self {
        Self::with_stack_capture(config, transport, Box::new(BacktraceCapture))
    }

    pub fn with_stack_capture(
        config: ClientConfig,
        transport: Transport,
        capture: Box<dyn StackCapture>,
    ) -> Self {
        let initial = if config.steam_handshake {
            ConnectionState::AwaitingSteamAccept
        } else {
            ConnectionState::Joining
        };
        let context = ClientContext::new(config.username, config.sync, capture);
        Self {
            connection: PeerConnection::new(
                HostType::Client,
                initial,
                client_tables(),
                transport,
                &config.connection,
                context,
            ),
            connect_sent: false,
        }
    }

    /// Attaches a source of state snapshots for incident reports
    pub fn set_snapshot_provider(&mut self, provider: Box<dyn SnapshotProvider>) {
        self.connection
            .context_mut()
            .assembler
            .set_snapshots(provider);
    }

    /// Starts the handshake
    pub fn connect(&mut self) -> Result<(), LockstepClientError> {
        if self.connect_sent {
            return Err(LockstepClientError::AlreadyConnecting);
        }
        self.connect_sent = true;
        let sent = match self.connection.state() {
            ConnectionState::AwaitingSteamAccept => self.connection.send(&ClientSteamRequest),
            _ => self.connection.send(&ClientProtocol {
                version: PROTOCOL_VERSION,
            }),
        };
        sent.map_err(|error| self.fail_on_send(error))?;
        info!("connecting as {}", self.connection.context().username);
        Ok(())
    }

    /// Feeds one frame received from the server
    pub fn receive(
        &mut self,
        frame: &[u8],
        delivery: Delivery,
    ) -> Result<DispatchOutcome, LockstepClientError> {
        let was_connected = !self.connection.is_disconnected();
        let result = self.connection.receive(frame, delivery);
        if was_connected && self.connection.is_disconnected() {
            let reason = self.connection.context().disconnect_reason.clone();
            self.connection.context_mut().events.push_disconnection(reason);
        }
        Ok(result?)
    }

    pub fn disconnect(&mut self) {
        if !self.connection.is_disconnected() {
            self.connection.disconnect();
            self.connection.context_mut().events.push_disconnection(None);
        }
    }

    // Gameplay

    pub fn send_command(&mut self, data: Vec<u8>) -> Result<(), LockstepClientError> {
        self.require_playing()?;
        self.connection
            .send(&ClientCommand { data })
            .map_err(|error| self.fail_on_send(error))
    }

    pub fn send_keep_alive(&mut self, id: u32) -> Result<(), LockstepClientError> {
        self.require_playing()?;
        self.connection
            .send(&ClientKeepAlive { id })
            .map_err(|error| self.fail_on_send(error))
    }

    /// Commands stamped by the server, in arrival order
    pub fn take_commands(&mut self) -> Vec<ServerCommand> {
        self.connection.context_mut().commands.drain(..).collect()
    }

    // Sync

    pub fn session(&self) -> Option<&Session> {
        self.connection.context().session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.connection.context_mut().session.as_mut()
    }

    /// Finalizes the local ledger, sends it to the server and compares it
    /// against any reference ledger already received for the same window
    pub fn close_sync_window(&mut self, next_start_tick: Tick) -> Result<(), LockstepClientError> {
        self.require_playing()?;
        let context = self.connection.context_mut();
        let Some(session) = context.session.as_mut() else {
            return Err(LockstepClientError::NotPlaying {
                state: ConnectionState::Joining,
            });
        };
        let closed = session.close_window(next_start_tick);

        // the ledger goes out ahead of any desync report it triggered
        let mut outbox = Outbox::new();
        outbox.push_raw(PacketId::ClientSyncInfo, closed.bytes);
        context.handle_outcome(closed.outcome, &mut outbox);

        let messages: Vec<_> = outbox.drain().collect();
        let total = messages.len();
        for (sent, (packet, payload)) in messages.into_iter().enumerate() {
            if let Err(error) = self.connection.send_payload(packet, &payload) {
                warn!("{} of {} sync messages were not sent", total - sent, total);
                return Err(self.fail_on_send(error));
            }
        }
        Ok(())
    }

    /// Clears the desync latch and restarts ledger recording at `start_tick`
    pub fn resync(&mut self, start_tick: Tick) -> Result<(), LockstepClientError> {
        self.require_playing()?;
        match self.session_mut() {
            Some(session) => {
                session.resync(start_tick);
                Ok(())
            }
            None => {
                warn!("resync requested without a session");
                Ok(())
            }
        }
    }

    pub fn is_desynced(&self) -> bool {
        self.session().is_some_and(Session::is_desynced)
    }

    // Queries

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn is_playing(&self) -> bool {
        self.connection.state() == ConnectionState::Playing
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.connection.context().player_id
    }

    pub fn session_seed(&self) -> Option<u64> {
        self.connection.context().session_seed
    }

    pub fn world_data(&self) -> &[u8] {
        &self.connection.context().world
    }

    pub fn server_tick(&self) -> Tick {
        self.connection.context().server_tick
    }

    pub fn last_keep_alive(&self) -> Option<u32> {
        self.connection.context().last_keep_alive
    }

    pub fn disconnect_reason(&self) -> Option<&str> {
        self.connection.context().disconnect_reason.as_deref()
    }

    /// Takes every event produced since the last call
    pub fn take_events(&mut self) -> Events {
        mem::take(&mut self.connection.context_mut().events)
    }

    /// A failed send leaves the transport unusable, so the connection is
    /// closed before the error is handed back
    fn fail_on_send(&mut self, error: ConnectionError) -> LockstepClientError {
        warn!("send failed in state {:?}: {}", self.connection.state(), error);
        self.disconnect();
        error.into()
    }

    fn require_playing(&self) -> Result<(), LockstepClientError> {
        match self.connection.state() {
            ConnectionState::Playing => Ok(()),
            state => Err(LockstepClientError::NotPlaying { state }),
        }
    }
}
