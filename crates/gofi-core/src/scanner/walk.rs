use super::fingerprint::{fingerprint, ContentStatus, Fingerprint};
use crate::batch::RecordSink;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::record::FileRecord;
use crate::session::Session;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

const PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkStats {
    pub entries: usize,
    pub files: usize,
    pub directories: usize,
    /// Files at or above the size ceiling; content was not read.
    pub too_large: usize,
    /// Files whose content could not be read; recorded with sentinel labels.
    pub unreadable: usize,
    /// Symlinks, sockets, fifos and devices.
    pub skipped: usize,
    pub errors: usize,
}

/// Recursive, single-threaded walk of the session root.
///
/// Every regular file is fingerprinted and handed to `sink`; directories are
/// handed over only when the session records them. Errors on individual
/// entries are counted and skipped. Only an unreadable root aborts the walk.
pub fn walk(
    session: &Session,
    sink: &mut dyn RecordSink,
    reporter: &dyn ProgressReporter,
) -> Result<WalkStats, Error> {
    let root = session.root_dir.as_path();
    check_root(root)?;

    info!("Collecting file information under {}", root.display());
    reporter.on_walk_start();
    let start = Instant::now();
    let mut stats = WalkStats::default();

    for entry_result in WalkDir::new(root).follow_links(false).min_depth(1) {
        stats.entries += 1;
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                stats.errors += 1;
                warn!("Skipping entry: {}", err);
                continue;
            }
        };

        if stats.entries % PROGRESS_EVERY == 0 {
            reporter.on_walk_progress(stats.entries, &entry.path().to_string_lossy());
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if session.record_directories {
                if let Some(record) = directory_record(session, &entry, &mut stats) {
                    stats.directories += 1;
                    sink.accept(record)?;
                }
            }
        } else if file_type.is_file() {
            if let Some(record) = file_record(session, &entry, &mut stats) {
                stats.files += 1;
                sink.accept(record)?;
            }
        } else {
            stats.skipped += 1;
            debug!("Skipping non-regular entry {}", entry.path().display());
        }
    }

    let duration = start.elapsed().as_secs_f64();
    reporter.on_walk_complete(stats.files, stats.errors, duration);
    info!(
        "Walk finished: {} files, {} directories, {} errors in {:.2}s",
        stats.files, stats.directories, stats.errors, duration
    );
    Ok(stats)
}

fn check_root(root: &Path) -> Result<(), Error> {
    fs::read_dir(root)
        .map(|_| ())
        .map_err(|source| Error::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })
}

fn file_record(session: &Session, entry: &DirEntry, stats: &mut WalkStats) -> Option<FileRecord> {
    let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            stats.errors += 1;
            warn!("Error getting metadata for {}: {}", entry.path().display(), err);
            return None;
        }
    };

    let fp = fingerprint(entry.path(), &metadata);
    match fp.status {
        ContentStatus::TooLarge => stats.too_large += 1,
        ContentStatus::Unreadable => stats.unreadable += 1,
        ContentStatus::Read | ContentStatus::NotApplicable => {}
    }
    Some(build_record(session, entry, fp, false))
}

fn directory_record(
    session: &Session,
    entry: &DirEntry,
    stats: &mut WalkStats,
) -> Option<FileRecord> {
    let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        Err(err) => {
            stats.errors += 1;
            warn!("Error getting metadata for {}: {}", entry.path().display(), err);
            return None;
        }
    };

    let fp = Fingerprint {
        file_type: String::new(),
        file_mime: String::new(),
        file_hash: String::new(),
        size: metadata.len(),
        modified: metadata
            .modified()
            .map(super::fingerprint::format_modified)
            .unwrap_or_default(),
        status: ContentStatus::NotApplicable,
    };
    Some(build_record(session, entry, fp, true))
}

/// `path` is the entry's full path, so the dedup key names one entry.
fn build_record(session: &Session, entry: &DirEntry, fp: Fingerprint, is_dir: bool) -> FileRecord {
    FileRecord {
        id: None,
        name: entry.file_name().to_string_lossy().into_owned(),
        path: entry.path().to_string_lossy().into_owned(),
        size: fp.size,
        is_dir,
        machine: session.hostname.clone(),
        ip: session.ip.clone(),
        on_external_source: session.is_external(),
        external_name: session.external_name.clone(),
        file_type: fp.file_type,
        file_mime: fp.file_mime,
        file_hash: fp.file_hash,
        modified: fp.modified,
    }
}
