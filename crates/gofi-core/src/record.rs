use serde::{Deserialize, Serialize};

/// Stands in for type, MIME and digest when content was not read.
pub const FILE_TOO_LARGE: &str = "file_too_large";

/// One inventoried filesystem entry. Created by the walker and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    /// Full path of the entry.
    pub path: String,
    pub size: u64,
    #[serde(rename = "isdir")]
    pub is_dir: bool,
    pub machine: String,
    pub ip: String,
    pub on_external_source: bool,
    pub external_name: String,
    pub file_type: String,
    pub file_mime: String,
    pub file_hash: String,
    pub modified: String,
}

/// Columns covered by the store's uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey {
    pub path: String,
    pub machine: String,
    pub ip: String,
    pub on_external_source: bool,
    pub external_name: String,
    pub file_hash: String,
}

impl FileRecord {
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            path: self.path.clone(),
            machine: self.machine.clone(),
            ip: self.ip.clone(),
            on_external_source: self.on_external_source,
            external_name: self.external_name.clone(),
            file_hash: self.file_hash.clone(),
        }
    }

    pub fn is_too_large(&self) -> bool {
        self.file_hash == FILE_TOO_LARGE
    }
}
