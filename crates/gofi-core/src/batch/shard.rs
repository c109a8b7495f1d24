use crate::error::Error;
use crate::record::FileRecord;
use rand::Rng;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

pub const SHARD_SUFFIX_LEN: usize = 5;
pub const SHARD_EXTENSION: &str = ".tmp.JSON";

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

/// `<suffix><index>.tmp.JSON`
pub fn shard_file_name(suffix: &str, index: usize) -> String {
    format!("{}{}{}", suffix, index, SHARD_EXTENSION)
}

/// Write a shard as a JSON array. Refuses to overwrite an existing file.
pub fn write_shard(path: &Path, records: &[FileRecord]) -> Result<(), Error> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

pub fn read_shard(path: &Path) -> Result<Vec<FileRecord>, Error> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
