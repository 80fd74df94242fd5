use std::fmt;

use crate::types::RegionId;

use super::ledger::Ledger;

/// Why two ledgers covering the same window disagree
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DesyncReason {
    /// The two sides simulated different sets of regions
    RegionMismatch {
        local: Vec<RegionId>,
        remote: Vec<RegionId>,
    },
    RegionFingerprints { region_id: RegionId, index: usize },
    WorldFingerprints { index: usize },
    CommandFingerprints { index: usize },
    /// Diagnostic only; fingerprints all matched
    StackHashes { index: usize },
}

impl DesyncReason {
    /// Stack hashes are a weaker signal than the fingerprint checks
    pub fn is_trace_only(&self) -> bool {
        matches!(self, Self::StackHashes { .. })
    }
}

impl fmt::Display for DesyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegionMismatch { local, remote } => write!(
                f,
                "Map instances don't match (local {:?}, remote {:?})",
                local, remote
            ),
            Self::RegionFingerprints { region_id, index } => write!(
                f,
                "Wrong random state on map {} (first mismatch at draw {})",
                region_id, index
            ),
            Self::WorldFingerprints { index } => write!(
                f,
                "Wrong random state for the world (first mismatch at draw {})",
                index
            ),
            Self::CommandFingerprints { index } => write!(
                f,
                "Random state from commands doesn't match (first mismatch at command {})",
                index
            ),
            Self::StackHashes { index } => {
                write!(f, "Trace hashes don't match (first mismatch at sample {})", index)
            }
        }
    }
}

/// Index of the first difference, counting a length difference as one
fn first_difference<T: PartialEq>(a: &[T], b: &[T]) -> Option<usize> {
    match a.iter().zip(b).position(|(x, y)| x != y) {
        Some(index) => Some(index),
        None if a.len() != b.len() => Some(a.len().min(b.len())),
        None => None,
    }
}

impl Ledger {
    /// Compares two ledgers for the same window. The first failing check wins,
    /// in order: region ids, per-region fingerprints, world fingerprints,
    /// command fingerprints, then stack hashes when both sides are final and
    /// both recorded at least one.
    pub fn check_for_desync(&self, other: &Ledger) -> Result<(), DesyncReason> {
        let local_ids: Vec<RegionId> = self.regions().iter().map(|r| r.region_id).collect();
        let remote_ids: Vec<RegionId> = other.regions().iter().map(|r| r.region_id).collect();
        if local_ids != remote_ids {
            return Err(DesyncReason::RegionMismatch {
                local: local_ids,
                remote: remote_ids,
            });
        }

        for (mine, theirs) in self.regions().iter().zip(other.regions()) {
            if let Some(index) = first_difference(&mine.fingerprints, &theirs.fingerprints) {
                return Err(DesyncReason::RegionFingerprints {
                    region_id: mine.region_id,
                    index,
                });
            }
        }

        if let Some(index) = first_difference(self.world_fingerprints(), other.world_fingerprints())
        {
            return Err(DesyncReason::WorldFingerprints { index });
        }

        if let Some(index) =
            first_difference(self.command_fingerprints(), other.command_fingerprints())
        {
            return Err(DesyncReason::CommandFingerprints { index });
        }

        let compare_traces = !self.is_provisional()
            && !other.is_provisional()
            && !self.stack_hashes().is_empty()
            && !other.stack_hashes().is_empty();
        if compare_traces {
            if let Some(index) = first_difference(self.stack_hashes(), other.stack_hashes()) {
                return Err(DesyncReason::StackHashes { index });
            }
        }

        Ok(())
    }
}
