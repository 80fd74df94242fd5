//! # Lockstep Serde
//! Byte-oriented binary codec shared by the lockstep crates. Every packet
//! payload and every ledger on the wire is written with a [`ByteWriter`] and
//! read back with a [`ByteReader`].

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod error;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::ByteWriter;
pub use error::SerdeErr;
pub use serde::Serde;

/// Maximum string length (in bytes) accepted when the caller does not
/// supply a tighter bound
pub const DEFAULT_MAX_STRING_LENGTH: usize = 32_767;

/// Maximum element count accepted for arrays when the caller does not
/// supply a tighter bound
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 1 << 24;
