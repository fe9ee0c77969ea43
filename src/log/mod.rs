//! Log Module
//!
//! The append-only data log and everything needed to read it back.
//!
//! ## Responsibilities
//! - Fixed-width, big-endian record encoding
//! - Positioned append at the write cursor
//! - Positioned random reads driven by the index
//! - Full replay to rebuild the index on open
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Record 1                                                     │
//! │ ┌────────────┬────────────┬──────────┬───────────┬─────────┐ │
//! │ │ KeyLen (8) │ ValLen (8) │ Kind (4) │ Key (var) │Val (var)│ │
//! │ └────────────┴────────────┴──────────┴───────────┴─────────┘ │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Record 2                                                     │
//! │   ...                                                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Kind is `0` for a put and `1` for a tombstone. Tombstones carry no value.
//! Lengths are stored in 64-bit fields but never exceed `u32::MAX`.

mod file;
mod record;
mod replay;

pub use file::LogFile;
pub use record::{Record, RecordHeader, RecordKind, HEADER_SIZE, MAX_FIELD_LEN};
pub use replay::{IndexBuilder, ReplayStats};
