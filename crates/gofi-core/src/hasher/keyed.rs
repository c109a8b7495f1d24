use highway::{HighwayHash, HighwayHasher, Key};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Fixed deployment key shared by every agent, so digests of identical
/// content agree across machines and with earlier agents. Public; it gives
/// no secrecy.
pub const FINGERPRINT_KEY: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
    0xF0, 0xE0, 0xD0, 0xC0, 0xB0, 0xA0, 0x90, 0x80, 0x70, 0x60, 0x50, 0x40, 0x30, 0x20, 0x10, 0x00,
];

/// 256-bit keyed HighwayHash of file content, rendered as 64 hex chars.
///
/// Implements `io::Write` so file content can be streamed through it with
/// `io::copy` without buffering the whole file.
pub struct KeyedDigest {
    hasher: HighwayHasher,
    bytes: u64,
}

impl KeyedDigest {
    pub fn new() -> Self {
        Self::with_key(&FINGERPRINT_KEY)
    }

    pub fn with_key(key: &[u8; 32]) -> Self {
        Self {
            hasher: HighwayHasher::new(Key(key_lanes(key))),
            bytes: 0,
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.hasher.append(data);
        self.bytes += data.len() as u64;
    }

    pub fn bytes_hashed(&self) -> u64 {
        self.bytes
    }

    /// Lowercase hex of the four result words, each little-endian.
    pub fn finish_hex(self) -> String {
        self.hasher
            .finalize256()
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl Default for KeyedDigest {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for KeyedDigest {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Key bytes read as four little-endian words.
fn key_lanes(key: &[u8; 32]) -> [u64; 4] {
    let mut lanes = [0u64; 4];
    for (lane, chunk) in lanes.iter_mut().zip(key.chunks_exact(8)) {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        *lane = u64::from_le_bytes(word);
    }
    lanes
}

pub fn hash_bytes(data: &[u8]) -> String {
    let mut digest = KeyedDigest::new();
    digest.update(data);
    digest.finish_hex()
}

/// Stream the whole file through a [`KeyedDigest`].
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut digest = KeyedDigest::new();
    io::copy(&mut file, &mut digest)?;
    Ok(digest.finish_hex())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hash_bytes(b""),
            "4e1bc6c50d5dab3b28df3a22d99c66fa5f92b73398da0693fcd0706ca81df8ba"
        );
        assert_eq!(
            hash_bytes(b"Hello, World!"),
            "435dfd188907fd4fa0d6c8597bfbdd94b4c4f94fe6946e41f8494bc0d17c0500"
        );
        let data: Vec<u8> = (0..100u32).map(|i| (i % 251) as u8).collect();
        assert_eq!(
            hash_bytes(&data),
            "2e4f49c9e0bd654b218a02428256eefdcad37f5985bbb2da9fdfb4613534a52e"
        );
    }

    #[test]
    fn test_key_lanes_are_little_endian() {
        assert_eq!(
            key_lanes(&FINGERPRINT_KEY),
            [
                0x0706_0504_0302_0100,
                0x0F0E_0D0C_0B0A_0908,
                0x8090_A0B0_C0D0_E0F0,
                0x0010_2030_4050_6070,
            ]
        );
    }

    #[test]
    fn test_key_changes_digest() {
        let mut other = KeyedDigest::with_key(&[7u8; 32]);
        other.update(b"content");
        assert_ne!(other.finish_hex(), hash_bytes(b"content"));
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let mut digest = KeyedDigest::new();
        for chunk in data.chunks(777) {
            digest.update(chunk);
        }
        assert_eq!(digest.bytes_hashed(), data.len() as u64);
        assert_eq!(digest.finish_hex(), hash_bytes(&data));
    }

    #[test]
    fn test_hash_file_matches_bytes() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("f.bin");
        std::fs::write(&path, vec![0xAAu8; 4096]).unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(&vec![0xAAu8; 4096]));
    }
}
