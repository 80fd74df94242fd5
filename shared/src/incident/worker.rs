use std::{
    fs,
    path::PathBuf,
    thread::{self, JoinHandle},
};

use log::{info, warn};

use super::{archive::IncidentArchive, error::IncidentError};

/// Destination for finished incident archives
pub trait IncidentSink: Send + 'static {
    fn store(&mut self, archive: &IncidentArchive) -> Result<(), IncidentError>;
}

/// Writes the encoded archive to a single file
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl IncidentSink for FileSink {
    fn store(&mut self, archive: &IncidentArchive) -> Result<(), IncidentError> {
        let bytes = archive.to_bytes()?;
        fs::write(&self.path, bytes).map_err(|err| IncidentError::Sink {
            reason: format!("{}: {}", self.path.display(), err),
        })?;
        info!("incident archive written to {}", self.path.display());
        Ok(())
    }
}

pub struct IncidentWorker;

impl IncidentWorker {
    /// Stores `archive` on a background thread
    pub fn spawn(
        mut sink: Box<dyn IncidentSink>,
        archive: IncidentArchive,
    ) -> Result<IncidentJob, IncidentError> {
        let handle = thread::Builder::new()
            .name("incident-writer".to_string())
            .spawn(move || {
                let result = sink.store(&archive);
                if let Err(err) = &result {
                    warn!("incident report not stored: {}", err);
                }
                result
            })
            .map_err(|err| IncidentError::Spawn {
                reason: err.to_string(),
            })?;

        Ok(IncidentJob {
            handle: Some(handle),
            result: None,
        })
    }
}

/// Completion handle for a background write
pub struct IncidentJob {
    handle: Option<JoinHandle<Result<(), IncidentError>>>,
    result: Option<Result<(), IncidentError>>,
}

impl IncidentJob {
    /// Returns the outcome once the write has finished, without blocking
    pub fn poll(&mut self) -> Option<&Result<(), IncidentError>> {
        if self.result.is_none() {
            let finished = self
                .handle
                .as_ref()
                .is_some_and(|handle| handle.is_finished());
            if finished {
                self.join();
            }
        }
        self.result.as_ref()
    }

    pub fn is_finished(&mut self) -> bool {
        self.poll().is_some()
    }

    /// Blocks until the write has finished
    pub fn wait(mut self) -> Result<(), IncidentError> {
        self.join();
        self.result.unwrap_or(Err(IncidentError::WorkerPanicked))
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.result = Some(handle.join().unwrap_or(Err(IncidentError::WorkerPanicked)));
        }
    }
}
