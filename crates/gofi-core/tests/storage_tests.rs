use gofi_core::batch::shard::write_shard;
use gofi_core::progress::SilentReporter;
use gofi_core::record::DedupKey;
use gofi_core::storage::{load_shards, FileStore, MemoryStore, SqliteStore};
use gofi_core::FileRecord;
use proptest::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn make_record(path: &str, name: &str, hash: &str, machine: &str) -> FileRecord {
    FileRecord {
        id: None,
        name: name.to_string(),
        path: path.to_string(),
        size: 42,
        is_dir: false,
        machine: machine.to_string(),
        ip: "10.0.0.7".to_string(),
        on_external_source: false,
        external_name: String::new(),
        file_type: "unknown".to_string(),
        file_mime: "application/octet-stream".to_string(),
        file_hash: hash.to_string(),
        modified: "2024-05-01 12:00:00 +0000".to_string(),
    }
}

fn write_shards(dir: &Path, batches: &[Vec<FileRecord>]) -> Vec<PathBuf> {
    batches
        .iter()
        .enumerate()
        .map(|(i, batch)| {
            let path = dir.join(format!("shard{}.tmp.JSON", i));
            write_shard(&path, batch).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_load_is_idempotent_on_disk() {
    let tmp = tempdir().unwrap();
    let shards = write_shards(
        tmp.path(),
        &[
            vec![
                make_record("/a", "one", "h1", "m1"),
                make_record("/a", "two", "h2", "m1"),
            ],
            vec![
                make_record("/a", "one", "h1", "m1"),
                make_record("/b", "three", "h1", "m1"),
                make_record("/a", "one", "h1", "m2"),
            ],
        ],
    );
    let db_path = tmp.path().join("store.db");

    let mut store = SqliteStore::open(&db_path).unwrap();
    let first = load_shards(&mut store, &shards, &SilentReporter);
    assert_eq!(first.shards_loaded, 2);
    assert_eq!(first.records_read, 5);
    assert_eq!(first.rows_inserted, 4);
    store.close().unwrap();

    let mut store = SqliteStore::open(&db_path).unwrap();
    let second = load_shards(&mut store, &shards, &SilentReporter);
    assert_eq!(second.rows_inserted, 0);
    assert_eq!(store.row_count().unwrap(), 4);
}

#[test]
fn test_corrupt_shard_is_skipped_entirely() {
    let tmp = tempdir().unwrap();
    let mut shards = write_shards(tmp.path(), &[vec![make_record("/a", "ok", "h1", "m")]]);
    let corrupt = tmp.path().join("corrupt.tmp.JSON");
    fs::write(&corrupt, br#"[{"name":"x","path":"/a","size":1"#).unwrap();
    shards.insert(0, corrupt);
    shards.push(tmp.path().join("missing.tmp.JSON"));

    let mut store = SqliteStore::open_in_memory().unwrap();
    let report = load_shards(&mut store, &shards, &SilentReporter);
    assert_eq!(report.shards_skipped, 2);
    assert_eq!(report.shards_loaded, 1);
    assert_eq!(store.row_count().unwrap(), 1);
}

#[test]
fn test_transaction_failure_applies_nothing() {
    let tmp = tempdir().unwrap();
    let shards = write_shards(
        tmp.path(),
        &[vec![make_record("/a", "one", "h1", "m"), make_record("/a", "two", "h2", "m")]],
    );

    let mut store = SqliteStore::open_in_memory().unwrap();
    // name is NOT NULL; a trigger rejecting the second row forces a rollback
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_two BEFORE INSERT ON files \
             WHEN NEW.name = 'two' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();
    let report = load_shards(&mut store, &shards, &SilentReporter);
    assert_eq!(report.shards_failed, 1);
    assert_eq!(report.rows_inserted, 0);
    assert_eq!(store.row_count().unwrap(), 0);
}

#[test]
fn test_memory_store_matches_sqlite() {
    let records = vec![
        make_record("/a", "one", "h1", "m"),
        make_record("/a", "dup", "h1", "m"),
        make_record("/a", "two", "h2", "m"),
    ];
    let mut memory = MemoryStore::new();
    memory.ensure_schema().unwrap();
    let mut sqlite = SqliteStore::open_in_memory().unwrap();

    assert_eq!(
        memory.insert_if_absent(&records).unwrap(),
        sqlite.insert_if_absent(&records).unwrap()
    );
    assert_eq!(memory.row_count().unwrap(), sqlite.row_count().unwrap());
    assert!(memory.rows().all(|r| r.id.is_some()));
}

#[test]
fn test_memory_store_requires_schema() {
    let mut memory = MemoryStore::new();
    assert!(memory.insert_if_absent(&[make_record("/a", "x", "h", "m")]).is_err());
}

fn arb_record() -> impl Strategy<Value = FileRecord> {
    (0u8..4, 0u8..3, 0u8..2, any::<bool>(), 0u8..4).prop_map(|(path, machine, ip, ext, hash)| {
        FileRecord {
            id: None,
            name: format!("n{}", hash),
            path: format!("/p{}", path),
            size: hash as u64,
            is_dir: false,
            machine: format!("m{}", machine),
            ip: format!("10.0.0.{}", ip),
            on_external_source: ext,
            external_name: if ext { "usb".to_string() } else { String::new() },
            file_type: "unknown".to_string(),
            file_mime: "text/plain; charset=utf-8".to_string(),
            file_hash: format!("h{}", hash),
            modified: String::new(),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_row_count_equals_distinct_keys(
        records in prop::collection::vec(arb_record(), 0..40),
        split in 1usize..8,
        replay in any::<bool>(),
    ) {
        let tmp = tempdir().unwrap();
        let batches: Vec<Vec<FileRecord>> = records.chunks(split).map(|c| c.to_vec()).collect();
        let mut shards = write_shards(tmp.path(), &batches);
        if replay {
            let again = shards.clone();
            shards.extend(again);
        }

        let distinct: HashSet<DedupKey> = records.iter().map(|r| r.dedup_key()).collect();

        let mut sqlite = SqliteStore::open_in_memory().unwrap();
        load_shards(&mut sqlite, &shards, &SilentReporter);
        prop_assert_eq!(sqlite.row_count().unwrap(), distinct.len() as u64);

        let mut memory = MemoryStore::new();
        memory.ensure_schema().unwrap();
        shards.reverse();
        load_shards(&mut memory, &shards, &SilentReporter);
        prop_assert_eq!(memory.row_count().unwrap(), distinct.len() as u64);
    }
}
