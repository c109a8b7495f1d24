use super::FileStore;
use crate::batch::shard::read_shard;
use crate::progress::ProgressReporter;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub shards_loaded: usize,
    /// Unreadable or unparsable shards; none of their records were applied.
    pub shards_skipped: usize,
    /// Shards whose transaction failed.
    pub shards_failed: usize,
    pub records_read: usize,
    pub rows_inserted: usize,
}

/// Apply every shard to `store`, one transaction per shard. Nothing is retried.
pub fn load_shards<S: FileStore + ?Sized>(
    store: &mut S,
    shards: &[PathBuf],
    reporter: &dyn ProgressReporter,
) -> LoadReport {
    info!("Saving {} shards to the store", shards.len());
    reporter.on_load_start(shards.len());
    let mut report = LoadReport::default();

    for (i, shard) in shards.iter().enumerate() {
        let records = match read_shard(shard) {
            Ok(records) => records,
            Err(err) => {
                warn!("Skipping shard {}: {}", shard.display(), err);
                report.shards_skipped += 1;
                continue;
            }
        };
        report.records_read += records.len();

        match store.insert_if_absent(&records) {
            Ok(inserted) => {
                debug!(
                    "Processed {} => {} new rows of {}",
                    shard.display(),
                    inserted,
                    records.len()
                );
                report.shards_loaded += 1;
                report.rows_inserted += inserted;
            }
            Err(err) => {
                error!("Failed to commit shard {}: {}", shard.display(), err);
                report.shards_failed += 1;
            }
        }
        reporter.on_load_progress(i + 1, shards.len());
    }

    info!(
        "Committed {} records from {} shards ({} new rows)",
        report.records_read, report.shards_loaded, report.rows_inserted
    );
    report
}
