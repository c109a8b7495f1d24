use super::sniff::{detect_type, sniff_mime, HEADER_LEN};
use crate::hasher::KeyedDigest;
use crate::record::FILE_TOO_LARGE;
use chrono::{DateTime, Local};
use std::fs::{File, Metadata};
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Files at or above this size are recorded without reading content (6 GiB).
pub const SIZE_CEILING: u64 = 6 << 30;

/// Why the labels hold what they hold. Both sentinel cases carry the same
/// `file_too_large` labels on the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentStatus {
    Read,
    TooLarge,
    Unreadable,
    /// Directories carry no content labels.
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub file_type: String,
    pub file_mime: String,
    pub file_hash: String,
    pub size: u64,
    pub modified: String,
    pub status: ContentStatus,
}

impl Fingerprint {
    fn sentinel(size: u64, modified: String, status: ContentStatus) -> Self {
        Fingerprint {
            file_type: FILE_TOO_LARGE.to_string(),
            file_mime: FILE_TOO_LARGE.to_string(),
            file_hash: FILE_TOO_LARGE.to_string(),
            size,
            modified,
            status,
        }
    }
}

pub fn fingerprint(path: &Path, metadata: &Metadata) -> Fingerprint {
    fingerprint_with_ceiling(path, metadata, SIZE_CEILING)
}

/// Never fails: unreadable content degrades to the sentinel labels.
pub fn fingerprint_with_ceiling(path: &Path, metadata: &Metadata, ceiling: u64) -> Fingerprint {
    let size = metadata.len();
    let modified = metadata.modified().map(format_modified).unwrap_or_default();

    if size >= ceiling {
        debug!("{} is {} bytes, skipping content", path.display(), size);
        return Fingerprint::sentinel(size, modified, ContentStatus::TooLarge);
    }

    match read_content(path) {
        Ok((file_type, file_mime, file_hash)) => Fingerprint {
            file_type,
            file_mime,
            file_hash,
            size,
            modified,
            status: ContentStatus::Read,
        },
        Err(err) => {
            warn!("Failed to fingerprint {}: {}", path.display(), err);
            Fingerprint::sentinel(size, modified, ContentStatus::Unreadable)
        }
    }
}

/// One pass over the file: the head feeds detection and the digest, the
/// remainder is streamed into the digest.
fn read_content(path: &Path) -> io::Result<(String, String, String)> {
    let mut file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    (&mut file).take(HEADER_LEN as u64).read_to_end(&mut header)?;

    let mut digest = KeyedDigest::new();
    digest.update(&header);
    io::copy(&mut file, &mut digest)?;

    Ok((detect_type(&header), sniff_mime(&header), digest.finish_hex()))
}

pub fn format_modified(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M:%S%.f %z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::hash_bytes;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_small_text_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("a.txt");
        fs::write(&path, b"0123456789").unwrap();
        let meta = fs::metadata(&path).unwrap();

        let fp = fingerprint(&path, &meta);
        assert_eq!(fp.size, 10);
        assert_eq!(fp.file_type, "unknown");
        assert_eq!(fp.file_mime, "text/plain; charset=utf-8");
        assert_eq!(fp.file_hash, hash_bytes(b"0123456789"));
        assert_eq!(fp.status, ContentStatus::Read);
        assert!(!fp.modified.is_empty());
    }

    #[test]
    fn test_digest_covers_content_past_header() {
        let tmp = tempdir().unwrap();
        let mut content = vec![b'x'; HEADER_LEN * 3];
        let a = tmp.path().join("a");
        fs::write(&a, &content).unwrap();
        *content.last_mut().unwrap() = b'y';
        let b = tmp.path().join("b");
        fs::write(&b, &content).unwrap();

        let fa = fingerprint(&a, &fs::metadata(&a).unwrap());
        let fb = fingerprint(&b, &fs::metadata(&b).unwrap());
        assert_ne!(fa.file_hash, fb.file_hash);
        assert_eq!(fb.file_hash, hash_bytes(&content));
    }

    #[test]
    fn test_at_ceiling_uses_sentinel() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("big.bin");
        fs::write(&path, vec![0u8; 64]).unwrap();
        let meta = fs::metadata(&path).unwrap();

        let fp = fingerprint_with_ceiling(&path, &meta, 64);
        assert_eq!(fp.file_hash, FILE_TOO_LARGE);
        assert_eq!(fp.file_type, FILE_TOO_LARGE);
        assert_eq!(fp.file_mime, FILE_TOO_LARGE);
        assert_eq!(fp.size, 64);
        assert_eq!(fp.status, ContentStatus::TooLarge);

        let below = fingerprint_with_ceiling(&path, &meta, 65);
        assert_ne!(below.file_hash, FILE_TOO_LARGE);
    }

    #[test]
    fn test_vanished_file_uses_sentinel() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("gone.txt");
        fs::write(&path, b"soon gone").unwrap();
        let meta = fs::metadata(&path).unwrap();
        fs::remove_file(&path).unwrap();

        let fp = fingerprint(&path, &meta);
        assert_eq!(fp.file_hash, FILE_TOO_LARGE);
        assert_eq!(fp.size, 9);
        assert_eq!(fp.status, ContentStatus::Unreadable);
    }
}
