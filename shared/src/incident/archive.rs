cfg_if! {
    if #[cfg(feature = "zstd_support")]
    {
        const COMPRESSION_LEVEL: i32 = 3;

        fn compress(raw: Vec<u8>) -> Result<Vec<u8>, IncidentError> {
            zstd::stream::encode_all(raw.as_slice(), COMPRESSION_LEVEL).map_err(|err| {
                IncidentError::Compression {
                    reason: err.to_string(),
                }
            })
        }

        fn decompress(bytes: &[u8]) -> Result<Vec<u8>, IncidentError> {
            zstd::stream::decode_all(bytes).map_err(|err| IncidentError::Compression {
                reason: err.to_string(),
            })
        }
    }
    else
    {
        fn compress(raw: Vec<u8>) -> Result<Vec<u8>, IncidentError> {
            Ok(raw)
        }

        fn decompress(bytes: &[u8]) -> Result<Vec<u8>, IncidentError> {
            Ok(bytes.to_vec())
        }
    }
}

use lockstep_serde::{ByteReader, ByteWriter, SerdeErr};

use super::error::IncidentError;
use crate::constants::MAX_FRAGMENTED_MESSAGE_SIZE;

const MAX_ENTRIES: usize = 64;
const MAX_ENTRY_NAME: usize = 256;
/// Large enough for a snapshot of any world that fits in one message
pub const MAX_ARCHIVE_ENTRY_SIZE: usize = MAX_FRAGMENTED_MESSAGE_SIZE;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A flat set of named files describing one incident
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncidentArchive {
    entries: Vec<ArchiveEntry>,
}

impl IncidentArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry called `name`
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let name = name.into();
        let bytes = bytes.into();
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.bytes = bytes,
            None => self.entries.push(ArchiveEntry { name, bytes }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.bytes.as_slice())
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encodes every entry, compressing the result when `zstd_support` is on.
    ///
    /// Fails rather than produce bytes [`IncidentArchive::from_bytes`] would
    /// refuse.
    pub fn to_bytes(&self) -> Result<Vec<u8>, IncidentError> {
        if self.entries.len() > MAX_ENTRIES {
            return Err(SerdeErr::LengthExceeded {
                length: self.entries.len(),
                max: MAX_ENTRIES,
            }
            .into());
        }
        let mut writer = ByteWriter::new();
        writer.write_i32(self.entries.len() as i32);
        for entry in &self.entries {
            if entry.name.len() > MAX_ENTRY_NAME {
                return Err(SerdeErr::LengthExceeded {
                    length: entry.name.len(),
                    max: MAX_ENTRY_NAME,
                }
                .into());
            }
            if entry.bytes.len() > MAX_ARCHIVE_ENTRY_SIZE {
                return Err(IncidentError::EntryTooLarge {
                    name: entry.name.clone(),
                    size: entry.bytes.len(),
                    max: MAX_ARCHIVE_ENTRY_SIZE,
                });
            }
            writer.write_string(&entry.name);
            writer.write_prefixed_bytes(&entry.bytes);
        }
        compress(writer.into_vec())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IncidentError> {
        let raw = decompress(bytes)?;
        let mut reader = ByteReader::new(raw);

        let count = reader.read_i32()?;
        if count < 0 {
            return Err(SerdeErr::NegativeLength { length: count }.into());
        }
        let count = count as usize;
        if count > MAX_ENTRIES {
            return Err(SerdeErr::LengthExceeded {
                length: count,
                max: MAX_ENTRIES,
            }
            .into());
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let name = reader.read_string_max(MAX_ENTRY_NAME)?;
            let bytes = reader.read_prefixed_bytes(MAX_ARCHIVE_ENTRY_SIZE)?;
            entries.push(ArchiveEntry { name, bytes });
        }
        Ok(Self { entries })
    }
}
