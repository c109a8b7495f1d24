use super::FileStore;
use crate::error::Error;
use crate::record::{DedupKey, FileRecord};
use std::collections::BTreeMap;

/// In-memory stand-in for [`super::SqliteStore`] with the same dedup rules.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: BTreeMap<DedupKey, FileRecord>,
    next_id: i64,
    schema_ready: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> impl Iterator<Item = &FileRecord> {
        self.rows.values()
    }
}

impl FileStore for MemoryStore {
    fn ensure_schema(&mut self) -> Result<(), Error> {
        self.schema_ready = true;
        Ok(())
    }

    fn insert_if_absent(&mut self, records: &[FileRecord]) -> Result<usize, Error> {
        if !self.schema_ready {
            return Err(Error::Other("schema not initialized".to_string()));
        }
        let mut inserted = 0;
        for record in records {
            let key = record.dedup_key();
            if self.rows.contains_key(&key) {
                continue;
            }
            self.next_id += 1;
            let mut row = record.clone();
            row.id = Some(self.next_id);
            self.rows.insert(key, row);
            inserted += 1;
        }
        Ok(inserted)
    }

    fn row_count(&self) -> Result<u64, Error> {
        Ok(self.rows.len() as u64)
    }

    fn close(self) -> Result<(), Error> {
        Ok(())
    }
}
