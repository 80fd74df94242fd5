use lockstep_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::{
    constants::MAX_USERNAME_LENGTH,
    types::{RegionId, Tick},
};

// Upper bound on regions in a received ledger
const MAX_REGIONS: usize = 1 << 16;

/// Fingerprint of a random-generator state: its upper 32 bits
pub fn fingerprint(rng_state: u64) -> u32 {
    (rng_state >> 32) as u32
}

/// Hash of one stack sample, stable across processes and platforms
pub fn stack_hash(stack: &str, annotation: &str) -> i32 {
    (crc32fast::hash(stack.as_bytes()) ^ crc32fast::hash(annotation.as_bytes())) as i32
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LedgerRole {
    /// Produced by the comparing party itself
    Local,
    /// Received from a peer
    Remote,
}

/// Ordered fingerprints attributed to one region
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionFingerprints {
    pub region_id: RegionId,
    pub fingerprints: Vec<u32>,
}

/// One checkpoint requested by the simulation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackSample {
    pub annotation: String,
    pub stack: String,
}

/// A participant's record of simulation fingerprints and diagnostic stack
/// samples for one tick window starting at `start_tick`.
///
/// Every sequence is append-only. `stack_hashes` always has one entry per
/// `stack_samples` entry on the producing side; ledgers decoded from the
/// wire carry hashes but no samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Ledger {
    start_tick: Tick,
    command_fingerprints: Vec<u32>,
    world_fingerprints: Vec<u32>,
    regions: Vec<RegionFingerprints>,
    stack_samples: Vec<StackSample>,
    stack_hashes: Vec<i32>,
    provisional: bool,
    is_local: bool,
    username: String,
}

impl Ledger {
    /// A fresh, empty ledger produced by this participant
    pub fn new_local(start_tick: Tick, username: impl Into<String>) -> Self {
        Self {
            start_tick,
            command_fingerprints: Vec::new(),
            world_fingerprints: Vec::new(),
            regions: Vec::new(),
            stack_samples: Vec::new(),
            stack_hashes: Vec::new(),
            provisional: false,
            is_local: true,
            username: username.into(),
        }
    }

    pub fn start_tick(&self) -> Tick {
        self.start_tick
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    pub fn role(&self) -> LedgerRole {
        if self.is_local {
            LedgerRole::Local
        } else {
            LedgerRole::Remote
        }
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn command_fingerprints(&self) -> &[u32] {
        &self.command_fingerprints
    }

    pub fn world_fingerprints(&self) -> &[u32] {
        &self.world_fingerprints
    }

    pub fn regions(&self) -> &[RegionFingerprints] {
        &self.regions
    }

    pub fn region(&self, region_id: RegionId) -> Option<&[u32]> {
        self.regions
            .iter()
            .find(|region| region.region_id == region_id)
            .map(|region| region.fingerprints.as_slice())
    }

    pub fn stack_samples(&self) -> &[StackSample] {
        &self.stack_samples
    }

    pub fn stack_hashes(&self) -> &[i32] {
        &self.stack_hashes
    }

    // Appends

    pub fn push_command_draw(&mut self, rng_state: u64) {
        self.command_fingerprints.push(fingerprint(rng_state));
    }

    pub fn push_world_draw(&mut self, rng_state: u64) {
        self.world_fingerprints.push(fingerprint(rng_state));
    }

    /// Appends to the region's sequence, creating it on first use
    pub fn push_region_draw(&mut self, region_id: RegionId, rng_state: u64) {
        let value = fingerprint(rng_state);
        match self
            .regions
            .iter_mut()
            .find(|region| region.region_id == region_id)
        {
            Some(region) => region.fingerprints.push(value),
            None => self.regions.push(RegionFingerprints {
                region_id,
                fingerprints: vec![value],
            }),
        }
    }

    pub fn push_checkpoint(&mut self, annotation: impl Into<String>, stack: String) {
        let annotation = annotation.into();
        self.stack_hashes.push(stack_hash(&stack, &annotation));
        self.stack_samples.push(StackSample { annotation, stack });
    }

    /// Marks the ledger as collected during fast-forward. Never undone.
    pub fn mark_provisional(&mut self) {
        self.provisional = true;
    }

    pub fn to_bytes(&self) -> Box<[u8]> {
        let mut writer = ByteWriter::new();
        self.ser(&mut writer);
        writer.to_bytes()
    }

    /// Decodes a ledger received from a peer, accepting usernames up to
    /// `max_username_length` bytes
    pub fn de_with(reader: &mut ByteReader, max_username_length: usize) -> Result<Self, SerdeErr> {
        let start_tick = reader.read_i32()?;
        let command_fingerprints = reader.read_u32_array()?;
        let world_fingerprints = reader.read_u32_array()?;

        let region_count = reader.read_i32()?;
        if region_count < 0 {
            return Err(SerdeErr::NegativeLength {
                length: region_count,
            });
        }
        let region_count = region_count as usize;
        if region_count > MAX_REGIONS {
            return Err(SerdeErr::LengthExceeded {
                length: region_count,
                max: MAX_REGIONS,
            });
        }
        let mut regions = Vec::with_capacity(region_count.min(reader.remaining() / 8));
        for _ in 0..region_count {
            let region_id = reader.read_i32()?;
            let fingerprints = reader.read_u32_array()?;
            regions.push(RegionFingerprints {
                region_id,
                fingerprints,
            });
        }

        let stack_hashes = reader.read_i32_array()?;
        let provisional = reader.read_bool()?;
        let username = reader.read_string_max(max_username_length)?;

        Ok(Self {
            start_tick,
            command_fingerprints,
            world_fingerprints,
            regions,
            stack_samples: Vec::new(),
            stack_hashes,
            provisional,
            is_local: false,
            username,
        })
    }
}

impl Serde for Ledger {
    fn ser(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.start_tick);
        writer.write_u32_array(&self.command_fingerprints);
        writer.write_u32_array(&self.world_fingerprints);
        writer.write_i32(i32::try_from(self.regions.len()).unwrap_or(i32::MAX));
        for region in &self.regions {
            writer.write_i32(region.region_id);
            writer.write_u32_array(&region.fingerprints);
        }
        writer.write_i32_array(&self.stack_hashes);
        writer.write_bool(self.provisional);
        writer.write_string(&self.username);
    }

    /// Decodes a ledger bounded by the default username length
    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Self::de_with(reader, MAX_USERNAME_LENGTH)
    }
}
