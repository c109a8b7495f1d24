pub mod shard;

use crate::error::Error;
use crate::record::FileRecord;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Destination for records produced by the walker.
pub trait RecordSink {
    fn accept(&mut self, record: FileRecord) -> Result<(), Error>;
}

/// Result of a completed batching pass.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Shards written, in write order.
    pub shards: Vec<PathBuf>,
    pub records: usize,
    pub failed_shards: usize,
    pub dropped_records: usize,
}

/// Holds at most `limit` records in memory; every full batch goes to a new
/// shard file under the session temp directory.
pub struct Batcher {
    dir: PathBuf,
    limit: usize,
    records: Vec<FileRecord>,
    shard_index: usize,
    summary: BatchSummary,
}

impl Batcher {
    pub fn new(dir: &Path, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            dir: dir.to_path_buf(),
            limit,
            records: Vec::with_capacity(limit.min(4096)),
            shard_index: 0,
            summary: BatchSummary::default(),
        }
    }

    pub fn push(&mut self, record: FileRecord) {
        self.records.push(record);
        if self.records.len() >= self.limit {
            self.flush();
        }
    }

    pub fn pending(&self) -> usize {
        self.records.len()
    }

    pub fn shards_written(&self) -> usize {
        self.summary.shards.len()
    }

    /// Flush the tail batch and hand back every shard path.
    pub fn finish(mut self) -> BatchSummary {
        self.flush();
        debug!(
            "Batching finished: {} records in {} shards",
            self.summary.records,
            self.summary.shards.len()
        );
        self.summary
    }

    /// A failed shard write is logged and its records are dropped; the
    /// walk keeps going.
    fn flush(&mut self) {
        if self.records.is_empty() {
            return;
        }
        let suffix = shard::random_suffix(shard::SHARD_SUFFIX_LEN);
        let path = self.dir.join(shard::shard_file_name(&suffix, self.shard_index));
        self.shard_index += 1;

        let count = self.records.len();
        match shard::write_shard(&path, &self.records) {
            Ok(()) => {
                debug!("{} files written to {}", count, path.display());
                self.summary.records += count;
                self.summary.shards.push(path);
            }
            Err(err) => {
                error!("Failed to write shard {}: {}", path.display(), err);
                self.summary.failed_shards += 1;
                self.summary.dropped_records += count;
            }
        }
        self.records.clear();
    }
}

impl RecordSink for Batcher {
    fn accept(&mut self, record: FileRecord) -> Result<(), Error> {
        self.push(record);
        Ok(())
    }
}

/// Dry-run sink: prints each record as pretty JSON.
pub struct PrintSink<W: Write> {
    out: W,
    printed: usize,
}

impl<W: Write> PrintSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, printed: 0 }
    }

    pub fn printed(&self) -> usize {
        self.printed
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RecordSink for PrintSink<W> {
    fn accept(&mut self, record: FileRecord) -> Result<(), Error> {
        serde_json::to_writer_pretty(&mut self.out, &record)?;
        writeln!(self.out)?;
        self.printed += 1;
        Ok(())
    }
}
