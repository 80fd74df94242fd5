use std::collections::VecDeque;

use log::{debug, info, warn};

use crate::types::Tick;

use super::{
    bisect::divergence_window,
    config::SyncConfig,
    desync::DesyncReason,
    ledger::{Ledger, LedgerRole},
};

/// Receives consistency results as they are decided
pub trait SyncObserver: Send {
    fn on_consistent(&mut self, last_valid_tick: Tick);
    fn on_divergence(&mut self, divergence: &Divergence);
}

/// A detected inconsistency between the local simulation and a peer's
#[derive(Clone, Debug)]
pub struct Divergence {
    pub reason: DesyncReason,
    pub message: String,
    pub last_valid_tick: Option<Tick>,
    pub local: Ledger,
    pub remote: Ledger,
    /// First stack sample where the two sides disagree
    pub divergence_index: usize,
    /// Both sides' samples around `divergence_index`
    pub traces: String,
}

#[derive(Debug)]
pub enum SyncOutcome {
    /// Session is desynced or catching up
    Ignored,
    /// Waiting for a counterpart
    Stored,
    Consistent { tick: Tick },
    /// No retained counterpart covers this window
    Unmatched,
    Diverged(Box<Divergence>),
}

/// Pairs local ledgers with remote ones for the same window and diffs them.
///
/// History only ever holds ledgers of a single role: the side that is ahead.
pub struct SyncCoordinator {
    config: SyncConfig,
    history: VecDeque<Ledger>,
    desynced: bool,
    skipping: bool,
    last_valid_tick: Option<Tick>,
    observers: Vec<Box<dyn SyncObserver>>,
}

impl SyncCoordinator {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            history: VecDeque::with_capacity(config.max_known_ledgers),
            config,
            desynced: false,
            skipping: false,
            last_valid_tick: None,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn SyncObserver>) {
        self.observers.push(observer);
    }

    pub fn is_desynced(&self) -> bool {
        self.desynced
    }

    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    pub fn last_valid_tick(&self) -> Option<Tick> {
        self.last_valid_tick
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Suppresses comparisons while the simulation fast-forwards
    pub fn set_skipping(&mut self, skipping: bool) {
        self.skipping = skipping;
    }

    /// Clears the desync latch and forgets every retained ledger
    pub fn resync(&mut self) {
        info!(
            "sync history reset (last valid tick {:?})",
            self.last_valid_tick
        );
        self.desynced = false;
        self.history.clear();
    }

    /// Accepts a finalized ledger from either side
    pub fn add_ledger(&mut self, ledger: Ledger) -> SyncOutcome {
        if self.desynced || self.skipping {
            return SyncOutcome::Ignored;
        }

        let Some(held_role) = self.history.front().map(Ledger::role) else {
            self.history.push_back(ledger);
            return SyncOutcome::Stored;
        };

        if held_role == ledger.role() {
            self.history.push_back(ledger);
            while self.history.len() > self.config.max_known_ledgers {
                self.history.pop_front();
            }
            return SyncOutcome::Stored;
        }

        let start_tick = ledger.start_tick();
        self.history.retain(|held| held.start_tick() >= start_tick);

        match self.history.front().map(Ledger::start_tick) {
            None => {
                self.history.push_back(ledger);
                SyncOutcome::Stored
            }
            Some(oldest) if oldest == start_tick => match self.history.pop_front() {
                Some(counterpart) => self.compare(counterpart, ledger),
                None => SyncOutcome::Unmatched,
            },
            Some(oldest) => {
                debug!(
                    "dropping ledger for tick {}: oldest retained counterpart starts at {}",
                    start_tick, oldest
                );
                SyncOutcome::Unmatched
            }
        }
    }

    fn compare(&mut self, a: Ledger, b: Ledger) -> SyncOutcome {
        let (local, remote) = match a.role() {
            LedgerRole::Local => (a, b),
            LedgerRole::Remote => (b, a),
        };
        let tick = local.start_tick();

        match local.check_for_desync(&remote) {
            Ok(()) => {
                self.last_valid_tick = Some(tick);
                for observer in &mut self.observers {
                    observer.on_consistent(tick);
                }
                SyncOutcome::Consistent { tick }
            }
            Err(reason) => {
                self.desynced = true;
                let (traces, divergence_index) =
                    divergence_window(&local, &remote, self.config.trace_window_radius);
                let message = reason.to_string();
                warn!(
                    "desync at tick {} against {}: {}",
                    tick,
                    remote.username(),
                    message
                );
                let divergence = Divergence {
                    reason,
                    message,
                    last_valid_tick: self.last_valid_tick,
                    local,
                    remote,
                    divergence_index,
                    traces,
                };
                for observer in &mut self.observers {
                    observer.on_divergence(&divergence);
                }
                SyncOutcome::Diverged(Box::new(divergence))
            }
        }
    }
}
