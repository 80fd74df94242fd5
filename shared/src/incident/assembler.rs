use std::fmt::Write;

use crate::sync::{format_trace_window, Divergence, Ledger, SyncConfig, TraceWindow};

use super::archive::IncidentArchive;

/// Supplies a serialized copy of the local simulation state, if available
pub trait SnapshotProvider: Send {
    fn snapshot(&mut self) -> Option<Vec<u8>>;
}

/// Everything collected about one desync, ready to be archived
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncidentReport {
    pub summary: String,
    pub local_ledger: Box<[u8]>,
    pub remote_ledger: Box<[u8]>,
    pub local_traces: String,
    pub remote_traces: String,
    pub snapshot: Option<Vec<u8>>,
}

impl IncidentReport {
    pub fn to_archive(&self) -> IncidentArchive {
        let mut archive = IncidentArchive::new();
        archive.insert("info.txt", self.summary.as_bytes());
        archive.insert("local_ledger.bin", self.local_ledger.to_vec());
        archive.insert("remote_ledger.bin", self.remote_ledger.to_vec());
        archive.insert("local_traces.txt", self.local_traces.as_bytes());
        archive.insert("remote_traces.txt", self.remote_traces.as_bytes());
        if let Some(snapshot) = &self.snapshot {
            archive.insert("snapshot.bin", snapshot.clone());
        }
        archive
    }
}

/// Turns a [`Divergence`] into an [`IncidentReport`]
pub struct IncidentAssembler {
    trace_window_radius: usize,
    snapshots: Option<Box<dyn SnapshotProvider>>,
}

impl IncidentAssembler {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            trace_window_radius: config.trace_window_radius,
            snapshots: None,
        }
    }

    pub fn with_snapshots(mut self, provider: Box<dyn SnapshotProvider>) -> Self {
        self.set_snapshots(provider);
        self
    }

    pub fn set_snapshots(&mut self, provider: Box<dyn SnapshotProvider>) {
        self.snapshots = Some(provider);
    }

    pub fn assemble(&mut self, divergence: &Divergence) -> IncidentReport {
        IncidentReport {
            summary: summary(divergence),
            local_ledger: divergence.local.to_bytes(),
            remote_ledger: divergence.remote.to_bytes(),
            local_traces: self.traces(&divergence.local, divergence.divergence_index),
            remote_traces: self.traces(&divergence.remote, divergence.divergence_index),
            snapshot: self
                .snapshots
                .as_mut()
                .and_then(|provider| provider.snapshot()),
        }
    }

    fn traces(&self, ledger: &Ledger, index: usize) -> String {
        let len = ledger.stack_samples().len().max(ledger.stack_hashes().len());
        match TraceWindow::around(index, len, self.trace_window_radius) {
            Some(window) => format_trace_window(ledger, window.start, window.end, window.highlight),
            None => String::new(),
        }
    }
}

fn summary(divergence: &Divergence) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Reason: {}", divergence.message);
    match divergence.last_valid_tick {
        Some(tick) => {
            let _ = writeln!(text, "Last valid tick: {}", tick);
        }
        None => text.push_str("Last valid tick: none\n"),
    }
    let _ = writeln!(text, "Desynced window: {}", divergence.local.start_tick());
    let _ = writeln!(text, "Divergence index: {}", divergence.divergence_index);
    for (label, ledger) in [("Local", &divergence.local), ("Remote", &divergence.remote)] {
        let _ = writeln!(
            text,
            "{}: {} (provisional: {}, stack samples: {})",
            label,
            ledger.username(),
            ledger.is_provisional(),
            ledger.stack_hashes().len()
        );
    }
    text
}
