//! Log File
//!
//! One open file plus the append cursor.
//!
//! Appends and reads are both positioned (offset-addressed), so the append
//! cursor and concurrent readers never share an OS file position.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CinderError, Result};

use super::record::{Record, RecordHeader, HEADER_SIZE};

/// An append-only log file
pub struct LogFile {
    /// Underlying file handle (read + write)
    file: File,
    /// Current location on disk
    path: PathBuf,
    /// Write cursor; also the logical end of the log
    offset: u64,
}

impl LogFile {
    /// Open an existing log or create an empty one
    ///
    /// The cursor starts at the current file length, so reopening resumes
    /// appending after existing records.
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let offset = file.metadata()?.len();

        Ok(Self {
            file,
            path: path.to_path_buf(),
            offset,
        })
    }

    /// Create a fresh, empty log, discarding anything already at `path`
    pub fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            offset: 0,
        })
    }

    /// Append a record at the cursor
    ///
    /// Returns the offset where the record begins.
    pub fn append(&mut self, record: &Record) -> Result<u64> {
        let start = self.offset;
        let encoded = record.encode();

        write_all_at(&self.file, &encoded, start)?;
        self.offset += encoded.len() as u64;

        Ok(start)
    }

    /// Read the record starting at `offset`
    ///
    /// Returns:
    /// - `Ok(Some(record))` — a complete record
    /// - `Ok(None)` — `offset` is at or past the end of the log
    /// - `Err(Corruption)` — the record is malformed or runs past the end
    pub fn read_at(&self, offset: u64) -> Result<Option<Record>> {
        if offset >= self.offset {
            return Ok(None);
        }

        let mut header_buf = [0u8; HEADER_SIZE];
        read_exact_at(&self.file, &mut header_buf, offset)
            .map_err(|e| truncated(e, offset))?;
        let header = RecordHeader::decode(&header_buf)?;

        // Reject before allocating payload buffers for a bogus length
        let end = offset.saturating_add(header.record_len());
        if end > self.offset {
            return Err(CinderError::Corruption(format!(
                "record at offset {} ends at {}, past end of log {}",
                offset, end, self.offset
            )));
        }

        let key_start = offset + HEADER_SIZE as u64;
        let mut key = vec![0u8; header.key_len as usize];
        read_exact_at(&self.file, &mut key, key_start).map_err(|e| truncated(e, offset))?;

        let mut value = vec![0u8; header.value_len as usize];
        read_exact_at(&self.file, &mut value, key_start + header.key_len)
            .map_err(|e| truncated(e, offset))?;

        Ok(Some(Record::from_parts(header, key, value)))
    }

    /// Flush written data to disk
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    /// Move the file to `path` with a single atomic rename, replacing
    /// whatever is there. The open handle keeps pointing at the same file.
    pub(crate) fn rename_to(&mut self, path: &Path) -> Result<()> {
        fs::rename(&self.path, path)?;
        self.path = path.to_path_buf();
        Ok(())
    }

    /// Current write cursor (logical length of the log)
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn truncated(err: io::Error, offset: u64) -> CinderError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        CinderError::Corruption(format!("truncated record at offset {}", offset))
    } else {
        CinderError::Io(err)
    }
}

// =============================================================================
// Positioned I/O
// =============================================================================

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.read_exact_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_read(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                ))
            }
            Ok(n) => {
                let rest = buf;
                buf = &mut rest[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ))
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
