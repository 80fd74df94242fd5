use std::backtrace::Backtrace;

use log::debug;

use crate::types::{RegionId, Tick};

use super::ledger::Ledger;

/// Source of call stacks for checkpoints
pub trait StackCapture: Send {
    fn capture(&mut self) -> String;
}

/// Captures the current thread's backtrace, keeping only symbol names.
///
/// File paths and addresses are dropped so two identical binaries produce
/// identical text, and so identical hashes, for the same call path.
#[derive(Default)]
pub struct BacktraceCapture;

impl StackCapture for BacktraceCapture {
    fn capture(&mut self) -> String {
        let rendered = Backtrace::force_capture().to_string();
        let mut symbols = String::with_capacity(rendered.len() / 2);
        for line in rendered.lines() {
            let line = line.trim_start();
            let Some((index, symbol)) = line.split_once(": ") else {
                continue;
            };
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            symbols.push_str(symbol.trim());
            symbols.push('\n');
        }
        symbols
    }
}

/// Records annotations only
#[derive(Default)]
pub struct NoCapture;

impl StackCapture for NoCapture {
    fn capture(&mut self) -> String {
        String::new()
    }
}

/// Owns the local ledger for the window currently being simulated.
///
/// The simulation tick loop is the only writer. Finished windows leave
/// through [`LedgerRecorder::close_window`] by value.
pub struct LedgerRecorder {
    current: Ledger,
    username: String,
    fast_forwarding: bool,
    capture: Box<dyn StackCapture>,
}

impl LedgerRecorder {
    pub fn new(
        start_tick: Tick,
        username: impl Into<String>,
        capture: Box<dyn StackCapture>,
    ) -> Self {
        let username = username.into();
        Self {
            current: Ledger::new_local(start_tick, username.clone()),
            username,
            fast_forwarding: false,
            capture,
        }
    }

    pub fn current(&self) -> &Ledger {
        &self.current
    }

    pub fn is_fast_forwarding(&self) -> bool {
        self.fast_forwarding
    }

    pub fn record_command_draw(&mut self, rng_state: u64) {
        self.before_append();
        self.current.push_command_draw(rng_state);
    }

    pub fn record_world_draw(&mut self, rng_state: u64) {
        self.before_append();
        self.current.push_world_draw(rng_state);
    }

    pub fn record_region_draw(&mut self, region_id: RegionId, rng_state: u64) {
        self.before_append();
        self.current.push_region_draw(region_id, rng_state);
    }

    /// Appends a stack sample. With `capture_stack` off the stack is empty
    /// but the annotation is still recorded and hashed.
    pub fn capture_checkpoint(&mut self, annotation: Option<&str>, capture_stack: bool) {
        self.before_append();
        let stack = if capture_stack {
            self.capture.capture()
        } else {
            String::new()
        };
        self.current
            .push_checkpoint(annotation.unwrap_or_default(), stack);
    }

    pub fn begin_fast_forward(&mut self) {
        debug!("fast-forward started at tick {}", self.current.start_tick());
        self.fast_forwarding = true;
    }

    pub fn end_fast_forward(&mut self) {
        self.fast_forwarding = false;
    }

    /// Cancels catch-up. Ledgers already marked provisional stay marked.
    pub fn abort_fast_forward(&mut self) {
        debug!("fast-forward aborted");
        self.fast_forwarding = false;
    }

    /// Finalizes the current window and starts a fresh ledger at `next_start_tick`
    pub fn close_window(&mut self, next_start_tick: Tick) -> Ledger {
        let next = Ledger::new_local(next_start_tick, self.username.clone());
        std::mem::replace(&mut self.current, next)
    }

    /// Drops the current window and starts over at `start_tick`
    pub fn restart(&mut self, start_tick: Tick) {
        self.current = Ledger::new_local(start_tick, self.username.clone());
    }

    fn before_append(&mut self) {
        if self.fast_forwarding && !self.current.is_provisional() {
            self.current.mark_provisional();
        }
    }
}
