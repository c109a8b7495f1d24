use crate::batch::{Batcher, PrintSink};
use crate::config::AppConfig;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::scanner::{self, WalkStats};
use crate::session::Session;
use crate::storage::{self, FileStore, LoadReport, SqliteStore};
use crate::transmit::{self, ChunkPolicy, TransferReport};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct InventoryEngine {
    config: AppConfig,
}

#[derive(Debug)]
pub struct RunResult {
    pub session_id: String,
    pub dry_run: bool,
    pub walk: WalkStats,
    pub shards_written: usize,
    pub load: LoadReport,
    pub rows_stored: u64,
    pub transfer: Option<TransferReport>,
    pub walk_duration: Duration,
    pub load_duration: Duration,
    pub transmit_duration: Duration,
}

impl InventoryEngine {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn chunk_policy(&self) -> ChunkPolicy {
        if self.config.pad_final_chunk {
            ChunkPolicy::FullBuffer
        } else {
            ChunkPolicy::Exact
        }
    }

    /// Run the whole pipeline with a fresh session.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunResult, Error> {
        let session = Session::new(&self.config);
        info!(
            "Session {} on {} ({})",
            session.id, session.hostname, session.ip
        );
        if self.config.dry_run {
            let stdout = io::stdout();
            return self.run_dry(&session, stdout.lock(), reporter);
        }
        self.run_session(&session, reporter)
    }

    /// Walk and print every record; nothing is stored or sent.
    pub fn run_dry<W: Write>(
        &self,
        session: &Session,
        out: W,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunResult, Error> {
        let start = Instant::now();
        let mut sink = PrintSink::new(out);
        let walk = scanner::walk(session, &mut sink, reporter)?;
        debug!("Dry run printed {} records", sink.printed());
        session.cleanup()?;

        Ok(RunResult {
            session_id: session.id.clone(),
            dry_run: true,
            walk,
            shards_written: 0,
            load: LoadReport::default(),
            rows_stored: 0,
            transfer: None,
            walk_duration: start.elapsed(),
            load_duration: Duration::ZERO,
            transmit_duration: Duration::ZERO,
        })
    }

    /// Walk → batch → load → transmit → clean up, strictly in sequence.
    ///
    /// A transfer failure returns the error and leaves the session's
    /// database and shards on disk.
    pub fn run_session(
        &self,
        session: &Session,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunResult, Error> {
        session.prepare()?;
        info!("Connecting to {}", session.db_path.display());
        let mut store = match SqliteStore::open(&session.db_path) {
            Ok(store) => store,
            Err(err) => {
                discard(session);
                return Err(err);
            }
        };

        // Phase 1: Walk and batch
        let walk_start = Instant::now();
        let mut batcher = Batcher::new(&session.tmp_dir, session.batch_limit);
        let walk = match scanner::walk(session, &mut batcher, reporter) {
            Ok(walk) => walk,
            Err(err) => {
                if let Err(close_err) = store.close() {
                    warn!("Closing store after failed walk: {}", close_err);
                }
                discard(session);
                return Err(err);
            }
        };
        let batches = batcher.finish();
        let walk_duration = walk_start.elapsed();
        if batches.failed_shards > 0 {
            warn!(
                "{} shards could not be written, {} records lost",
                batches.failed_shards, batches.dropped_records
            );
        }

        // Phase 2: Load shards into the store
        let load_start = Instant::now();
        let load = storage::load_shards(&mut store, &batches.shards, reporter);
        let rows_stored = store.row_count()?;
        store.close()?;
        let load_duration = load_start.elapsed();
        reporter.on_load_complete(rows_stored, load_duration.as_secs_f64());

        // Phase 3: Transmit
        let transmit_start = Instant::now();
        let stream = transmit::connect(&self.config.target_url)?;
        let transfer = transmit::send_file(
            stream,
            &session.db_path,
            &session.transfer_name(),
            self.chunk_policy(),
            reporter,
        )?;
        let transmit_duration = transmit_start.elapsed();

        session.cleanup()?;

        Ok(RunResult {
            session_id: session.id.clone(),
            dry_run: false,
            walk,
            shards_written: batches.shards.len(),
            load,
            rows_stored,
            transfer: Some(transfer),
            walk_duration,
            load_duration,
            transmit_duration,
        })
    }
}

/// Best-effort removal of a session that never reached the transfer.
fn discard(session: &Session) {
    if let Err(err) = session.cleanup() {
        warn!("Cleanup of session {} failed: {}", session.id, err);
    }
}
