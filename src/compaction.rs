//! Compaction (vacuum)
//!
//! Rewrites only the live records into a merge file and swaps it in as the
//! primary log.
//!
//! ## Swap protocol
//! 1. Create `DATA.MER` empty (truncating any leftover)
//! 2. Copy each indexed record across, building a fresh index
//! 3. Sync the merge file
//! 4. Rename it over `DATA` in one call; the rename replaces the old log
//!
//! The merge handle refers to the renamed file, so it becomes the active log
//! without reopening. There is no point at which `DATA` is missing.

use std::fs;
use std::path::Path;

use crate::error::{CinderError, Result};
use crate::index::Index;
use crate::log::LogFile;

/// What a vacuum accomplished
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompactionStats {
    /// Records written to the new log (one per live key)
    pub live_records: u64,

    /// Log length before compaction
    pub bytes_before: u64,

    /// Log length after compaction
    pub bytes_after: u64,
}

impl CompactionStats {
    pub fn bytes_reclaimed(&self) -> u64 {
        self.bytes_before.saturating_sub(self.bytes_after)
    }
}

/// Output of a successful compaction, ready to replace the engine's state
pub(crate) struct Compacted {
    pub log: LogFile,
    pub index: Index,
    pub stats: CompactionStats,
}

/// Compact `log` through `index` using `merge_path` as scratch space
///
/// On failure the merge file is removed and `log` is left untouched.
pub(crate) fn compact(log: &LogFile, index: &Index, merge_path: &Path) -> Result<Compacted> {
    match write_merged(log, index, merge_path) {
        Ok(compacted) => Ok(compacted),
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(merge_path) {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        "Failed to remove merge file {}: {}",
                        merge_path.display(),
                        cleanup
                    );
                }
            }
            Err(e)
        }
    }
}

fn write_merged(log: &LogFile, index: &Index, merge_path: &Path) -> Result<Compacted> {
    let mut merged = LogFile::create(merge_path)?;
    let mut new_index = Index::new();

    for (key, offset) in index.iter() {
        let record = log.read_at(offset)?.ok_or_else(|| {
            CinderError::Corruption(format!(
                "index entry at offset {} is past end of log {}",
                offset,
                log.offset()
            ))
        })?;

        if record.key() != key {
            return Err(CinderError::Corruption(format!(
                "index entry at offset {} points at a different key",
                offset
            )));
        }

        let new_offset = merged.append(&record)?;
        new_index.insert(key.to_vec(), new_offset);
    }

    merged.sync()?;
    merged.rename_to(log.path())?;

    let stats = CompactionStats {
        live_records: new_index.len() as u64,
        bytes_before: log.offset(),
        bytes_after: merged.offset(),
    };

    Ok(Compacted {
        log: merged,
        index: new_index,
        stats,
    })
}
