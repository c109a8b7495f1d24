use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Shard encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read scan root {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Header field '{field}' is {value_len} bytes, wider than its {width} byte slot")]
    FieldTooLong {
        field: &'static str,
        value_len: usize,
        width: usize,
    },

    #[error("Transfer error: {0}")]
    Transfer(&'static str),

    #[error("{0}")]
    Other(String),
}
