//! Log Replay
//!
//! Rebuilds the index by reading every record from offset 0 to the end.

use crate::error::Result;
use crate::index::Index;

use super::{LogFile, RecordKind};

/// Builds an index from a log
pub struct IndexBuilder;

/// Result of a replay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of records read
    pub records_replayed: u64,

    /// Put records among them
    pub puts: u64,

    /// Tombstones among them
    pub tombstones: u64,

    /// Bytes consumed; equals the log length after a clean replay
    pub bytes_replayed: u64,
}

impl IndexBuilder {
    /// Replay `log` into a fresh index
    ///
    /// Later records win: a put overwrites any earlier offset for its key and
    /// a tombstone removes the key. Only a clean end of log stops the scan;
    /// any other failure aborts the whole replay.
    pub fn replay(log: &LogFile) -> Result<(Index, ReplayStats)> {
        let mut index = Index::new();
        let mut stats = ReplayStats::default();
        let mut offset = 0u64;

        while let Some(record) = log.read_at(offset)? {
            match record.kind() {
                RecordKind::Put => {
                    index.insert(record.key().to_vec(), offset);
                    stats.puts += 1;
                }
                RecordKind::Tombstone => {
                    index.remove(record.key());
                    stats.tombstones += 1;
                }
            }

            stats.records_replayed += 1;
            offset += record.encoded_len();
        }

        stats.bytes_replayed = offset;
        Ok((index, stats))
    }
}
