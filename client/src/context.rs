use std::collections::VecDeque;

use log::warn;

use lockstep_shared::{
    ClientDesynced, ClientTraces, IncidentAssembler, Outbox, PlayerId, ServerCommand, Session,
    StackCapture, SyncConfig, SyncOutcome, Tick,
};

use crate::events::Events;

/// Everything the client's packet handlers read and write
pub(crate) struct ClientContext {
    pub username: String,
    pub sync: SyncConfig,
    pub player_id: Option<PlayerId>,
    pub session_seed: Option<u64>,
    pub world: Vec<u8>,
    pub server_tick: Tick,
    pub last_keep_alive: Option<u32>,
    pub disconnect_reason: Option<String>,
    pub commands: VecDeque<ServerCommand>,
    pub session: Option<Session>,
    /// Handed to the session when it starts
    pub capture: Option<Box<dyn StackCapture>>,
    pub assembler: IncidentAssembler,
    pub events: Events,
}

impl ClientContext {
    pub fn new(username: String, sync: SyncConfig, capture: Box<dyn StackCapture>) -> Self {
        Self {
            username,
            assembler: IncidentAssembler::new(&sync),
            sync,
            player_id: None,
            session_seed: None,
            world: Vec::new(),
            server_tick: 0,
            last_keep_alive: None,
            disconnect_reason: None,
            commands: VecDeque::new(),
            session: None,
            capture: Some(capture),
            events: Events::new(),
        }
    }

    pub fn start_session(&mut self, start_tick: Tick) {
        let capture = self
            .capture
            .take()
            .unwrap_or_else(|| Box::new(lockstep_shared::NoCapture));
        // the server keeps the trimmed name, so ledgers carry it too
        self.session = Some(Session::new(
            self.sync.clone(),
            self.username.trim().to_string(),
            start_tick,
            capture,
        ));
    }

    /// Reacts to a comparison result. A divergence is reported to the server
    /// and turned into an incident report.
    pub fn handle_outcome(&mut self, outcome: SyncOutcome, outbox: &mut Outbox) {
        match outcome {
            SyncOutcome::Consistent { tick } => self.events.push_synced(tick),
            SyncOutcome::Diverged(divergence) => {
                warn!("desynced: {}", divergence.message);
                outbox.push(&ClientDesynced {
                    last_valid_tick: divergence.last_valid_tick,
                    divergence_index: u32::try_from(divergence.divergence_index)
                        .unwrap_or(u32::MAX),
                });
                outbox.push(&ClientTraces {
                    text: divergence.traces.clone(),
                });
                let report = self.assembler.assemble(&divergence);
                self.events.push_desync(divergence, report);
            }
            SyncOutcome::Ignored | SyncOutcome::Stored | SyncOutcome::Unmatched => {}
        }
    }
}
