//! Tests for vacuum (log compaction)
//!
//! These tests verify:
//! - Live values survive unchanged, dead keys stay absent
//! - The compacted log holds exactly one put per live key
//! - The merge file never outlives a vacuum
//! - Compacted logs replay correctly after reopen

use std::fs;

use cinderkv::config::Config;
use cinderkv::engine::Engine;
use cinderkv::log::{IndexBuilder, LogFile, Record, RecordKind};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = Engine::open_path(temp_dir.path()).unwrap();
    (temp_dir, engine)
}

/// Read every record in a log file, in order
fn read_all_records(engine: &Engine) -> Vec<Record> {
    let log = LogFile::open(&engine.data_dir().join(Engine::DATA_FILENAME)).unwrap();
    let mut records = Vec::new();
    let mut offset = 0;
    while let Some(record) = log.read_at(offset).unwrap() {
        offset += record.encoded_len();
        records.push(record);
    }
    records
}

// =============================================================================
// Correctness Tests
// =============================================================================

#[test]
fn test_vacuum_preserves_live_and_drops_dead() {
    let (_temp, engine) = setup_temp_engine();

    engine.put(b"a", b"1").unwrap();
    engine.put(b"b", b"2").unwrap();
    engine.delete(b"a").unwrap();

    engine.vacuum().unwrap();

    assert_eq!(engine.get(b"a").unwrap(), None);
    assert_eq!(engine.get(b"b").unwrap(), Some(b"2".to_vec()));
    assert_eq!(engine.size(), 1);
}

#[test]
fn test_vacuum_log_holds_only_live_records() {
    let (_temp, engine) = setup_temp_engine();

    for round in 0..3 {
        for i in 0..10 {
            let value = format!("value{}-{}", i, round);
            engine.put(format!("key{}", i).as_bytes(), value.as_bytes()).unwrap();
        }
    }
    for i in 0..4 {
        engine.delete(format!("key{}", i).as_bytes()).unwrap();
    }

    engine.vacuum().unwrap();

    let records = read_all_records(&engine);
    assert_eq!(records.len(), 6);
    assert!(records.iter().all(|r| r.kind() == RecordKind::Put));

    let expected_len: u64 = records.iter().map(|r| r.encoded_len()).sum();
    assert_eq!(engine.log_size(), expected_len);

    for record in &records {
        let key = String::from_utf8(record.key().to_vec()).unwrap();
        let i: usize = key.trim_start_matches("key").parse().unwrap();
        assert!(i >= 4);
        assert_eq!(record.value(), format!("value{}-2", i).as_bytes());
    }
}

#[test]
fn test_vacuum_values_identical_before_and_after() {
    let (_temp, engine) = setup_temp_engine();

    for i in 0..100 {
        let value = vec![(i % 256) as u8; i * 3];
        engine.put(format!("key{:03}", i).as_bytes(), &value).unwrap();
    }
    for i in (0..100).step_by(7) {
        engine.delete(format!("key{:03}", i).as_bytes()).unwrap();
    }

    let before: Vec<Option<Vec<u8>>> = (0..100)
        .map(|i| engine.get(format!("key{:03}", i).as_bytes()).unwrap())
        .collect();
    let size_before = engine.size();

    engine.vacuum().unwrap();

    let after: Vec<Option<Vec<u8>>> = (0..100)
        .map(|i| engine.get(format!("key{:03}", i).as_bytes()).unwrap())
        .collect();

    assert_eq!(before, after);
    assert_eq!(engine.size(), size_before);
}

#[test]
fn test_vacuum_empty_store() {
    let (temp, engine) = setup_temp_engine();

    engine.vacuum().unwrap();

    assert_eq!(engine.size(), 0);
    assert_eq!(engine.log_size(), 0);
    assert!(temp.path().join(Engine::DATA_FILENAME).exists());
}

#[test]
fn test_vacuum_everything_deleted() {
    let (temp, engine) = setup_temp_engine();
    engine.put(b"k", b"v").unwrap();
    engine.delete(b"k").unwrap();

    engine.vacuum().unwrap();

    assert_eq!(engine.log_size(), 0);
    assert_eq!(
        fs::metadata(temp.path().join(Engine::DATA_FILENAME)).unwrap().len(),
        0
    );
}

#[test]
fn test_vacuum_is_idempotent() {
    let (_temp, engine) = setup_temp_engine();
    engine.put(b"k1", b"v1").unwrap();
    engine.put(b"k1", b"v1b").unwrap();
    engine.put(b"k2", b"v2").unwrap();

    engine.vacuum().unwrap();
    let first = engine.log_size();
    engine.vacuum().unwrap();

    assert_eq!(engine.log_size(), first);
    assert_eq!(engine.get(b"k1").unwrap(), Some(b"v1b".to_vec()));
}

// =============================================================================
// File Swap Tests
// =============================================================================

#[test]
fn test_vacuum_leaves_no_merge_file() {
    let (temp, engine) = setup_temp_engine();
    engine.put(b"k", b"v1").unwrap();
    engine.put(b"k", b"v2").unwrap();

    engine.vacuum().unwrap();

    assert!(temp.path().join(Engine::DATA_FILENAME).exists());
    assert!(!temp.path().join(Engine::MERGE_FILENAME).exists());
}

#[test]
fn test_writes_after_vacuum_land_in_new_log() {
    let (_temp, engine) = setup_temp_engine();
    engine.put(b"old", b"1").unwrap();
    engine.put(b"old", b"2").unwrap();
    engine.vacuum().unwrap();

    engine.put(b"new", b"3").unwrap();
    engine.delete(b"old").unwrap();

    assert_eq!(engine.get(b"new").unwrap(), Some(b"3".to_vec()));
    assert_eq!(engine.get(b"old").unwrap(), None);

    let records = read_all_records(&engine);
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].kind(), RecordKind::Tombstone);
}

#[test]
fn test_vacuum_then_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .vacuum_on_close(false)
        .build();

    {
        let engine = Engine::open(config.clone()).unwrap();
        engine.put(b"a", b"1").unwrap();
        engine.put(b"b", b"2").unwrap();
        engine.put(b"a", b"3").unwrap();
        engine.delete(b"b").unwrap();
        engine.vacuum().unwrap();
        engine.put(b"c", b"4").unwrap();
        engine.close();
    }

    let engine = Engine::open(config).unwrap();
    assert_eq!(engine.size(), 2);
    assert_eq!(engine.get(b"a").unwrap(), Some(b"3".to_vec()));
    assert_eq!(engine.get(b"b").unwrap(), None);
    assert_eq!(engine.get(b"c").unwrap(), Some(b"4".to_vec()));

    let log = LogFile::open(&temp_dir.path().join(Engine::DATA_FILENAME)).unwrap();
    let (_, stats) = IndexBuilder::replay(&log).unwrap();
    assert_eq!(stats.tombstones, 0);
    assert_eq!(stats.records_replayed, 2);
}
