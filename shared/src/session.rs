use lockstep_serde::{ByteReader, Serde, SerdeErr};
use log::info;

use crate::{
    sync::{
        Ledger, LedgerRecorder, StackCapture, SyncConfig, SyncCoordinator, SyncObserver,
        SyncOutcome,
    },
    types::{RegionId, Tick},
};

/// Result of finalizing the local window
pub struct ClosedWindow {
    /// Encoded ledger, ready to be sent to the peer
    pub bytes: Box<[u8]>,
    pub outcome: SyncOutcome,
}

/// Everything one participant tracks for desync detection during a game.
///
/// Created when the game starts, dropped when it ends, and passed by
/// reference to whatever needs it.
pub struct Session {
    config: SyncConfig,
    username: String,
    recorder: LedgerRecorder,
    coordinator: SyncCoordinator,
}

impl Session {
    pub fn new(
        config: SyncConfig,
        username: impl Into<String>,
        start_tick: Tick,
        capture: Box<dyn StackCapture>,
    ) -> Self {
        let username = username.into();
        info!("session started for {} at tick {}", username, start_tick);
        Self {
            recorder: LedgerRecorder::new(start_tick, username.clone(), capture),
            coordinator: SyncCoordinator::new(config.clone()),
            config,
            username,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn current_ledger(&self) -> &Ledger {
        self.recorder.current()
    }

    pub fn coordinator(&self) -> &SyncCoordinator {
        &self.coordinator
    }

    pub fn add_observer(&mut self, observer: Box<dyn SyncObserver>) {
        self.coordinator.add_observer(observer);
    }

    pub fn is_desynced(&self) -> bool {
        self.coordinator.is_desynced()
    }

    pub fn last_valid_tick(&self) -> Option<Tick> {
        self.coordinator.last_valid_tick()
    }

    // Simulation hooks

    pub fn record_command_draw(&mut self, rng_state: u64) {
        self.recorder.record_command_draw(rng_state);
    }

    pub fn record_world_draw(&mut self, rng_state: u64) {
        self.recorder.record_world_draw(rng_state);
    }

    pub fn record_region_draw(&mut self, region_id: RegionId, rng_state: u64) {
        self.recorder.record_region_draw(region_id, rng_state);
    }

    pub fn capture_checkpoint(&mut self, annotation: Option<&str>, capture_stack: bool) {
        self.recorder.capture_checkpoint(annotation, capture_stack);
    }

    pub fn begin_fast_forward(&mut self) {
        self.recorder.begin_fast_forward();
        self.coordinator.set_skipping(true);
    }

    pub fn end_fast_forward(&mut self) {
        self.recorder.end_fast_forward();
        self.coordinator.set_skipping(false);
    }

    pub fn abort_fast_forward(&mut self) {
        self.recorder.abort_fast_forward();
        self.coordinator.set_skipping(false);
    }

    /// Finalizes the local ledger, submits it for comparison and starts the
    /// next window at `next_start_tick`
    pub fn close_window(&mut self, next_start_tick: Tick) -> ClosedWindow {
        let ledger = self.recorder.close_window(next_start_tick);
        let bytes = ledger.to_bytes();
        let outcome = self.coordinator.add_ledger(ledger);
        ClosedWindow { bytes, outcome }
    }

    pub fn receive_remote_ledger(
        &mut self,
        reader: &mut ByteReader,
    ) -> Result<SyncOutcome, SerdeErr> {
        let ledger = Ledger::de_with(reader, self.config.max_username_length)?;
        Ok(self.coordinator.add_ledger(ledger))
    }

    /// Clears the desync latch and restarts recording at `start_tick`
    pub fn resync(&mut self, start_tick: Tick) {
        self.coordinator.resync();
        self.recorder.restart(start_tick);
        info!("session resynced at tick {}", start_tick);
    }
}
