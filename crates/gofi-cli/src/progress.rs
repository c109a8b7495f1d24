use gofi_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Walk: spinner (total entries unknown upfront)
/// - Load: bar over shards
/// - Transmit: byte bar
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn spinner(message: &'static str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars(TICK_CHARS),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    fn bar(len: u64, template: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::with_template(template)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("━╸─")
                .tick_chars(TICK_CHARS),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_walk_start(&self) {
        self.set_bar(Self::spinner("Collecting file information..."));
    }

    fn on_walk_progress(&self, entries_seen: usize, _current_path: &str) {
        self.with_bar(|pb| pb.set_message(format!("Walking... {} entries seen", entries_seen)));
    }

    fn on_walk_complete(&self, files: usize, errors: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Walk complete: {} files, {} errors in {:.2}s",
            files, errors, duration_secs
        );
    }

    fn on_load_start(&self, shards: usize) {
        self.set_bar(Self::bar(
            shards as u64,
            "  {spinner:.cyan} Loading [{bar:30.cyan/dim}] {pos}/{len} shards",
        ));
    }

    fn on_load_progress(&self, shards_loaded: usize, _total_shards: usize) {
        self.with_bar(|pb| pb.set_position(shards_loaded as u64));
    }

    fn on_load_complete(&self, rows: u64, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Store complete: {} rows in {:.2}s",
            rows, duration_secs
        );
    }

    fn on_transmit_start(&self, total_bytes: u64) {
        self.set_bar(Self::bar(
            total_bytes,
            "  {spinner:.cyan} Sending [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta} remaining)",
        ));
    }

    fn on_transmit_progress(&self, bytes_sent: u64, _total_bytes: u64) {
        self.with_bar(|pb| pb.set_position(bytes_sent));
    }

    fn on_transmit_complete(&self, bytes_sent: u64, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Transfer complete: {} bytes in {:.2}s",
            bytes_sent, duration_secs
        );
    }
}
