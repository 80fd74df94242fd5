use log::warn;

use crate::{
    connection::{
        base_connection::BaseConnection,
        connection_config::ConnectionConfig,
        connection_state::ConnectionState,
        dispatch_table::{Outbox, StateTables},
        error::ConnectionError,
        state_machine::{DispatchOutcome, StateMachine},
    },
    protocol::{Packet, PacketId},
    transport::Transport,
    types::{Delivery, HostType},
};

/// A connection to one peer: framing, the role's state machine, and the
/// role-specific context the handlers operate on.
///
/// Any fatal error while receiving closes the transport and latches the
/// connection into [`ConnectionState::Disconnected`].
pub struct PeerConnection<C: 'static> {
    base: BaseConnection,
    machine: StateMachine<C>,
    context: C,
    outbox: Outbox,
}

impl<C: 'static> PeerConnection<C> {
    pub fn new(
        host_type: HostType,
        initial: ConnectionState,
        tables: &'static StateTables<C>,
        transport: Transport,
        config: &ConnectionConfig,
        context: C,
    ) -> Self {
        Self {
            base: BaseConnection::new(transport, config),
            machine: StateMachine::new(host_type, initial, tables),
            context,
            outbox: Outbox::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    pub fn is_disconnected(&self) -> bool {
        self.machine.is_disconnected()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Feeds one received frame through reassembly and dispatch
    pub fn receive(
        &mut self,
        frame: &[u8],
        delivery: Delivery,
    ) -> Result<DispatchOutcome, ConnectionError> {
        if self.machine.is_disconnected() {
            return Err(ConnectionError::Disconnected);
        }
        let result = self.receive_inner(frame, delivery);
        if let Err(error) = &result {
            warn!(
                "{:?} connection failed in state {:?}: {}",
                self.machine.host_type(),
                self.machine.state(),
                error
            );
            // replies queued before the failure (e.g. a disconnect reason)
            // still go out
            let _ = self.flush_outbox();
            self.disconnect();
        }
        result
    }

    fn receive_inner(
        &mut self,
        frame: &[u8],
        delivery: Delivery,
    ) -> Result<DispatchOutcome, ConnectionError> {
        let Some(message) = self.base.read_frame(frame, delivery)? else {
            return Ok(DispatchOutcome::Pending);
        };
        let outcome = self
            .machine
            .dispatch(&mut self.context, &mut self.outbox, message)?;
        self.flush_outbox()?;
        if self.machine.is_disconnected() {
            // a handler chose to end the connection
            self.base.close();
        }
        Ok(outcome)
    }

    fn flush_outbox(&mut self) -> Result<(), ConnectionError> {
        let mut result = Ok(());
        for (packet, payload) in self.outbox.drain() {
            if let Err(error) = self.base.send_payload(packet, &payload) {
                result = Err(error);
                break;
            }
        }
        result
    }

    pub fn send<P: Packet>(&mut self, packet: &P) -> Result<(), ConnectionError> {
        self.base.send(packet)
    }

    pub fn send_payload(
        &mut self,
        packet: PacketId,
        payload: &[u8],
    ) -> Result<(), ConnectionError> {
        self.base.send_payload(packet, payload)
    }

    /// Moves the state machine outside of a handler, e.g. when a client
    /// starts its handshake
    pub fn enter(&mut self, state: ConnectionState) -> Result<(), ConnectionError> {
        self.machine.enter(state)
    }

    pub fn disconnect(&mut self) {
        self.base.close();
        // Disconnected is reachable from every state
        let _ = self.machine.enter(ConnectionState::Disconnected);
    }
}
