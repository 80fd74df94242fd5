//! Incident reports for detected desyncs, and writing them off the network
//! thread.

mod archive;
mod assembler;
mod error;
mod worker;

pub use archive::{ArchiveEntry, IncidentArchive, MAX_ARCHIVE_ENTRY_SIZE};
pub use assembler::{IncidentAssembler, IncidentReport, SnapshotProvider};
pub use error::IncidentError;
pub use worker::{FileSink, IncidentJob, IncidentSink, IncidentWorker};
