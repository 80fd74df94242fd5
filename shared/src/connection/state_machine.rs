use log::{debug, info};
use lockstep_serde::ByteReader;

use crate::{
    connection::{
        connection_state::{ConnectionState, Transition},
        dispatch_table::{DispatchTable, Outbox, StateTables},
        error::ConnectionError,
    },
    protocol::{PacketId, ProtocolViolation},
    types::{Delivery, HostType},
};

/// A complete message, reassembled if it was fragmented
pub struct IncomingMessage {
    pub packet: PacketId,
    pub delivery: Delivery,
    pub reader: ByteReader,
}

/// What happened to one received frame
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran
    Handled,
    /// Unreliable message with no handler in the current state, dropped
    Dropped,
    /// Fragment buffered, message not complete yet
    Pending,
}

/// Per-connection state machine. Exactly one dispatch table is active at a
/// time: the one owned by the current state. Entering a state swaps it.
pub struct StateMachine<C: 'static> {
    host_type: HostType,
    state: ConnectionState,
    tables: &'static StateTables<C>,
}

impl<C: 'static> StateMachine<C> {
    pub fn new(
        host_type: HostType,
        initial: ConnectionState,
        tables: &'static StateTables<C>,
    ) -> Self {
        Self {
            host_type,
            state: initial,
            tables,
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_disconnected(&self) -> bool {
        self.state == ConnectionState::Disconnected
    }

    fn active_table(&self) -> Option<&'static DispatchTable<C>> {
        self.tables.get(self.state)
    }

    /// Moves to `next`, validated against the role's legal transitions
    pub fn enter(&mut self, next: ConnectionState) -> Result<(), ConnectionError> {
        if next == self.state {
            return Ok(());
        }
        if !self.state.can_enter(next, self.host_type) {
            return Err(ProtocolViolation::InvalidTransition {
                from: self.state,
                to: next,
            }
            .into());
        }
        info!(
            "{:?} connection: {:?} -> {:?}",
            self.host_type, self.state, next
        );
        self.state = next;
        Ok(())
    }

    /// Resolves the message against the table of the state current right
    /// now and runs its handler. Packets the peer's role never sends are
    /// rejected whatever their delivery.
    pub fn dispatch(
        &mut self,
        context: &mut C,
        outbox: &mut Outbox,
        message: IncomingMessage,
    ) -> Result<DispatchOutcome, ConnectionError> {
        if self.is_disconnected() {
            return Err(ConnectionError::Disconnected);
        }

        let IncomingMessage {
            packet,
            delivery,
            mut reader,
        } = message;

        if packet.sender() == self.host_type {
            return Err(ProtocolViolation::WrongDirection {
                packet,
                receiver: self.host_type,
            }
            .into());
        }

        let Some(handler) = self.active_table().and_then(|table| table.get(packet)) else {
            if delivery.is_reliable() {
                return Err(ProtocolViolation::NoHandler {
                    packet,
                    state: self.state,
                }
                .into());
            }
            debug!(
                "dropping unreliable {:?} with no handler in state {:?}",
                packet, self.state
            );
            return Ok(DispatchOutcome::Dropped);
        };

        match handler(context, outbox, &mut reader)? {
            Transition::Stay => {}
            Transition::Enter(next) => self.enter(next)?,
        }
        Ok(DispatchOutcome::Handled)
    }
}
