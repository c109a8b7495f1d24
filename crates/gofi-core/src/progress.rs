/// Trait for reporting pipeline progress.
///
/// The CLI implements it with indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_walk_start(&self) {}
    fn on_walk_progress(&self, _entries_seen: usize, _current_path: &str) {}
    fn on_walk_complete(&self, _files: usize, _errors: usize, _duration_secs: f64) {}
    fn on_load_start(&self, _shards: usize) {}
    fn on_load_progress(&self, _shards_loaded: usize, _total_shards: usize) {}
    fn on_load_complete(&self, _rows: u64, _duration_secs: f64) {}
    fn on_transmit_start(&self, _total_bytes: u64) {}
    fn on_transmit_progress(&self, _bytes_sent: u64, _total_bytes: u64) {}
    fn on_transmit_complete(&self, _bytes_sent: u64, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
