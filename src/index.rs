//! In-memory index
//!
//! Maps each live key to the offset of its latest put record in the active
//! log. A key that is absent has no live value. The index is derived state:
//! it is rebuilt by replay and never written to disk.

use std::collections::HashMap;

/// Key → offset of the key's current record
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Index {
    entries: HashMap<Vec<u8>, u64>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the live record for `key`
    pub fn get(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, key: Vec<u8>, offset: u64) {
        self.entries.insert(key, offset);
    }

    /// Removing an absent key is a no-op
    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<u64> {
        self.entries.remove(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&[u8], u64)> {
        self.entries.iter().map(|(k, &off)| (k.as_slice(), off))
    }
}
