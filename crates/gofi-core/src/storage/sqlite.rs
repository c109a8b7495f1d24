use super::FileStore;
use crate::error::Error;
use crate::record::FileRecord;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

const INSERT_IF_ABSENT: &str = "INSERT OR IGNORE INTO files \
     (name, path, size, isdir, machine, ip, onexternalsource, externalname, \
      filetype, filemime, filehash, modified) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

/// File-backed SQLite store. The whole database lives in one file so it can
/// be shipped as a single blob once closed.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        let mut store = SqliteStore { conn };
        store.configure_pragmas()?;
        store.ensure_schema()?;
        debug!("Opened store at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()?;
        let mut store = SqliteStore { conn };
        store.configure_pragmas()?;
        store.ensure_schema()?;
        Ok(store)
    }

    /// Rollback journal rather than WAL: a WAL database is not self-contained
    /// in its main file until checkpointed.
    fn configure_pragmas(&self) -> Result<(), Error> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = DELETE;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl FileStore for SqliteStore {
    fn ensure_schema(&mut self) -> Result<(), Error> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    fn insert_if_absent(&mut self, records: &[FileRecord]) -> Result<usize, Error> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare_cached(INSERT_IF_ABSENT)?;
            for record in records {
                inserted += stmt.execute(params![
                    record.name,
                    record.path,
                    i64::try_from(record.size).unwrap_or(i64::MAX),
                    record.is_dir,
                    record.machine,
                    record.ip,
                    record.on_external_source,
                    record.external_name,
                    record.file_type,
                    record.file_mime,
                    record.file_hash,
                    record.modified,
                ])?;
            }
        }
        tx.commit()?;
        debug!("Inserted {} of {} records", inserted, records.len());
        Ok(inserted)
    }

    fn row_count(&self) -> Result<u64, Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn close(self) -> Result<(), Error> {
        self.conn.close().map_err(|(_, err)| Error::Database(err))
    }
}
