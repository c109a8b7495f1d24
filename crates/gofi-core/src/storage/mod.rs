pub mod loader;
pub mod memory;
pub mod sqlite;

pub use loader::{load_shards, LoadReport};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Error;
use crate::record::FileRecord;

/// Narrow storage seam used by the loader. Opening is engine-specific and
/// lives on the concrete types.
pub trait FileStore {
    /// Create the `files` table and its uniqueness constraint if missing.
    fn ensure_schema(&mut self) -> Result<(), Error>;

    /// Insert every record inside one transaction, silently skipping records
    /// whose dedup key is already present. Returns the number of new rows.
    /// On error nothing from `records` is applied.
    fn insert_if_absent(&mut self, records: &[FileRecord]) -> Result<usize, Error>;

    fn row_count(&self) -> Result<u64, Error>;

    fn close(self) -> Result<(), Error>
    where
        Self: Sized;
}
