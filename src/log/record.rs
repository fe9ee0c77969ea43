//! Log record definitions
//!
//! One record per put or delete. The header is decoded on its own first
//! because the payload size is only known once the header is parsed.

use bytes::{Buf, BufMut};

use crate::error::{CinderError, Result};

/// Header size: KeyLen (8) + ValLen (8) + Kind (4) = 20 bytes
pub const HEADER_SIZE: usize = 20;

/// Largest key or value length a record may carry
pub const MAX_FIELD_LEN: u64 = u32::MAX as u64;

/// What a record does to its key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum RecordKind {
    Put = 0,
    Tombstone = 1,
}

impl RecordKind {
    fn from_u32(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(RecordKind::Put),
            1 => Ok(RecordKind::Tombstone),
            _ => Err(CinderError::Corruption(format!(
                "invalid record kind: {}",
                raw
            ))),
        }
    }
}

/// The fixed-size prefix of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_len: u64,
    pub value_len: u64,
    pub kind: RecordKind,
}

impl RecordHeader {
    /// Parse exactly `HEADER_SIZE` bytes from the front of `buf`
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(CinderError::Corruption(format!(
                "short record header: expected {} bytes, got {}",
                HEADER_SIZE,
                buf.len()
            )));
        }

        let key_len = buf.get_u64();
        let value_len = buf.get_u64();
        let kind = RecordKind::from_u32(buf.get_u32())?;

        if key_len > MAX_FIELD_LEN || value_len > MAX_FIELD_LEN {
            return Err(CinderError::Corruption(format!(
                "record lengths out of range: key={} value={}",
                key_len, value_len
            )));
        }

        if kind == RecordKind::Tombstone && value_len != 0 {
            return Err(CinderError::Corruption(format!(
                "tombstone carries a {} byte value",
                value_len
            )));
        }

        Ok(Self {
            key_len,
            value_len,
            kind,
        })
    }

    /// Bytes following the header
    pub fn payload_len(&self) -> u64 {
        self.key_len + self.value_len
    }

    /// Total on-disk size of the record this header starts
    pub fn record_len(&self) -> u64 {
        HEADER_SIZE as u64 + self.payload_len()
    }
}

/// A single immutable log record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: RecordKind,
    key: Vec<u8>,
    value: Vec<u8>,
}

impl Record {
    /// Create a put record
    pub fn put(key: Vec<u8>, value: Vec<u8>) -> Result<Self> {
        check_len("key", &key)?;
        check_len("value", &value)?;
        Ok(Self {
            kind: RecordKind::Put,
            key,
            value,
        })
    }

    /// Create a tombstone for `key`
    pub fn tombstone(key: Vec<u8>) -> Result<Self> {
        check_len("key", &key)?;
        Ok(Self {
            kind: RecordKind::Tombstone,
            key,
            value: Vec::new(),
        })
    }

    /// Reassemble a record from a decoded header and its payload.
    /// Callers read exactly `header.key_len` and `header.value_len` bytes.
    pub(crate) fn from_parts(header: RecordHeader, key: Vec<u8>, value: Vec<u8>) -> Self {
        debug_assert_eq!(key.len() as u64, header.key_len);
        debug_assert_eq!(value.len() as u64, header.value_len);
        Self {
            kind: header.kind,
            key,
            value,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    pub fn header(&self) -> RecordHeader {
        RecordHeader {
            key_len: self.key.len() as u64,
            value_len: self.value.len() as u64,
            kind: self.kind,
        }
    }

    /// Size of this record when encoded on disk
    pub fn encoded_len(&self) -> u64 {
        self.header().record_len()
    }

    /// Serialize header and payload into one buffer
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len() as usize);
        buf.put_u64(self.key.len() as u64);
        buf.put_u64(self.value.len() as u64);
        buf.put_u32(self.kind as u32);
        buf.put_slice(&self.key);
        buf.put_slice(&self.value);
        buf
    }

    /// Decode a full record from the front of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = RecordHeader::decode(bytes)?;

        let total = header.record_len();
        if (bytes.len() as u64) < total {
            return Err(CinderError::Corruption(format!(
                "truncated record: expected {} bytes, got {}",
                total,
                bytes.len()
            )));
        }

        let key_end = HEADER_SIZE + header.key_len as usize;
        let key = bytes[HEADER_SIZE..key_end].to_vec();
        let value = bytes[key_end..total as usize].to_vec();

        Ok(Self::from_parts(header, key, value))
    }
}

fn check_len(field: &'static str, bytes: &[u8]) -> Result<()> {
    if bytes.len() as u64 > MAX_FIELD_LEN {
        return Err(CinderError::RecordTooLarge {
            field,
            len: bytes.len(),
        });
    }
    Ok(())
}
