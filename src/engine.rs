//! Engine Module
//!
//! The storage engine: one append-only log plus the in-memory index over it.
//!
//! ## Responsibilities
//! - Open the data directory and replay the log into the index
//! - Serve get/put/delete/size against the index and the log
//! - Compact the log on demand and on close

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::command::{Command, Reply};
use crate::compaction;
use crate::config::Config;
use crate::error::{CinderError, Result};
use crate::index::Index;
use crate::log::{IndexBuilder, LogFile, Record};

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete/vacuum): exclusive `state` lock
///   - Appends never interleave; the index always matches the log
///
/// - **Reads** (get/size): shared `state` lock
///   - Run concurrently with each other, never alongside a writer
///   - Log reads are positioned, so readers share no file cursor
///
/// - **Vacuum**: additionally claims `vacuuming` before touching the lock,
///   so a second caller fails fast instead of queueing behind the first
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Active log and its index; only ever touched under this lock
    state: RwLock<EngineState>,

    /// Set while a vacuum runs
    vacuuming: AtomicBool,
}

struct EngineState {
    log: LogFile,
    index: Index,
}

impl Engine {
    // =========================================================================
    // Directory Layout
    // =========================================================================

    /// Primary log file
    pub const DATA_FILENAME: &'static str = "DATA";

    /// Compaction output, renamed over `DATA` on success
    pub const MERGE_FILENAME: &'static str = "DATA.MER";

    /// Reserved for an inter-process lock; not created or enforced
    pub const LOCK_FILENAME: &'static str = "LOCK";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if allowed and missing
    /// 2. Remove a merge file left by an interrupted vacuum
    /// 3. Open/create the primary log
    /// 4. Replay the log into the index
    ///
    /// Any replay failure fails the open; the engine never starts with a
    /// partially rebuilt index.
    pub fn open(config: Config) -> Result<Self> {
        // Step 1: Data directory
        if !config.data_dir.is_dir() {
            if !config.create_if_missing {
                return Err(CinderError::Config(format!(
                    "data directory {} does not exist",
                    config.data_dir.display()
                )));
            }
            fs::create_dir_all(&config.data_dir)?;
        }

        // Step 2: Leftover merge output is never trusted
        let merge_path = config.data_dir.join(Self::MERGE_FILENAME);
        if merge_path.exists() {
            tracing::warn!("Removing stale merge file {}", merge_path.display());
            fs::remove_file(&merge_path)?;
        }

        // Step 3: Primary log
        let data_path = config.data_dir.join(Self::DATA_FILENAME);
        let log = LogFile::open(&data_path)?;

        // Step 4: Replay
        tracing::info!("Replaying log {}", data_path.display());
        let (index, stats) = IndexBuilder::replay(&log)?;
        tracing::info!(
            "Replay finished: {} records ({} puts, {} tombstones, {} bytes), {} live keys",
            stats.records_replayed,
            stats.puts,
            stats.tombstones,
            stats.bytes_replayed,
            index.len()
        );

        Ok(Self {
            config,
            state: RwLock::new(EngineState { log, index }),
            vacuuming: AtomicBool::new(false),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder().data_dir(path.as_ref()).build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Get { key } => self.get(&key).map(Reply::Value),
            Command::Put { key, value } => {
                self.put(&key, &value)?;
                Ok(Reply::Done)
            }
            Command::Delete { key } => {
                self.delete(&key)?;
                Ok(Reply::Done)
            }
            Command::Size => Ok(Reply::Size(self.size())),
            Command::Vacuum => {
                self.vacuum()?;
                Ok(Reply::Done)
            }
        }
    }

    /// Get a value by key
    ///
    /// Returns `Ok(None)` when the key has no live value. An error means the
    /// record behind a valid index entry could not be read.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        check_key(key)?;

        let state = self.state.read();
        let offset = match state.index.get(key) {
            Some(offset) => offset,
            None => return Ok(None),
        };

        let record = state.log.read_at(offset)?.ok_or_else(|| {
            CinderError::Corruption(format!(
                "index entry at offset {} is past end of log {}",
                offset,
                state.log.offset()
            ))
        })?;

        Ok(Some(record.into_value()))
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Acquire write lock
    /// 2. Append a put record at the cursor
    /// 3. Point the index at the record's start
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        check_key(key)?;
        let record = Record::put(key.to_vec(), value.to_vec())?;

        let mut state = self.state.write();
        let offset = state.log.append(&record)?;
        state.index.insert(key.to_vec(), offset);

        tracing::debug!("put key_len={} at offset {}", key.len(), offset);
        Ok(())
    }

    /// Delete a key
    ///
    /// A key with no live value is left alone: no tombstone is written.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        check_key(key)?;
        let record = Record::tombstone(key.to_vec())?;

        let mut state = self.state.write();
        if !state.index.contains_key(key) {
            return Ok(());
        }

        let offset = state.log.append(&record)?;
        state.index.remove(key);

        tracing::debug!("delete key_len={} tombstone at offset {}", key.len(), offset);
        Ok(())
    }

    /// Number of live keys
    pub fn size(&self) -> usize {
        self.state.read().index.len()
    }

    /// Compact the log down to one record per live key
    ///
    /// Fails with `VacuumInProgress`, before any I/O, if another vacuum is
    /// already running.
    pub fn vacuum(&self) -> Result<()> {
        let _vacuum = VacuumGuard::acquire(&self.vacuuming)?;

        let mut state = self.state.write();
        let merge_path = self.config.data_dir.join(Self::MERGE_FILENAME);

        let compacted = compaction::compact(&state.log, &state.index, &merge_path)?;

        tracing::info!(
            "Vacuum finished: {} live records, {} -> {} bytes ({} reclaimed)",
            compacted.stats.live_records,
            compacted.stats.bytes_before,
            compacted.stats.bytes_after,
            compacted.stats.bytes_reclaimed()
        );

        // Replacing the log drops (closes) the old handle
        state.log = compacted.log;
        state.index = compacted.index;

        Ok(())
    }

    /// Close the engine
    ///
    /// Best-effort: a failed vacuum is logged and ignored, and the log handle
    /// is released regardless.
    pub fn close(self) {
        if self.config.vacuum_on_close {
            if let Err(e) = self.vacuum() {
                tracing::warn!("Vacuum on close failed: {}", e);
            }
        }

        let state = self.state.into_inner();
        if let Err(e) = state.log.sync() {
            tracing::warn!("Failed to sync log on close: {}", e);
        }

        tracing::info!("Engine closed: {}", self.config.data_dir.display());
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Logical length of the active log in bytes
    pub fn log_size(&self) -> u64 {
        self.state.read().log.offset()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn check_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(CinderError::EmptyKey);
    }
    Ok(())
}

/// Holds the vacuum flag for the lifetime of one vacuum
struct VacuumGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> VacuumGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CinderError::VacuumInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for VacuumGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
