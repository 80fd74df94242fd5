//! Desync detection: per-participant fingerprint ledgers, the coordinator
//! that pairs and diffs them, and bisection of hashed stack samples.

mod bisect;
mod config;
mod coordinator;
mod desync;
mod ledger;
mod recorder;

pub use bisect::{divergence_index, divergence_window, format_trace_window, TraceWindow};
pub use config::SyncConfig;
pub use coordinator::{Divergence, SyncCoordinator, SyncObserver, SyncOutcome};
pub use desync::DesyncReason;
pub use ledger::{fingerprint, stack_hash, Ledger, LedgerRole, RegionFingerprints, StackSample};
pub use recorder::{BacktraceCapture, LedgerRecorder, NoCapture, StackCapture};
