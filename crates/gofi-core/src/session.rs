use crate::config::AppConfig;
use crate::error::Error;
use std::fs;
use std::io;
use std::net::{ToSocketAddrs, UdpSocket};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DATABASE_NAME: &str = "gofi.db";
pub const TRANSFER_PREFIX: &str = "gofi_";

/// Everything one run needs to know, fixed at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub root_dir: PathBuf,
    pub hostname: String,
    pub ip: String,
    pub external_name: String,
    pub batch_limit: usize,
    pub record_directories: bool,
    pub tmp_dir: PathBuf,
    pub db_path: PathBuf,
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        let ip = detect_local_ip(&config.target_url).unwrap_or_else(|| "unknown".to_string());
        Self::with_ip(config, ip)
    }

    /// Build a session with a known reporting address, skipping discovery.
    pub fn with_ip(config: &AppConfig, ip: String) -> Self {
        let id = Uuid::new_v4().to_string();
        let work_dir = Path::new(&config.work_dir);
        Session {
            root_dir: PathBuf::from(&config.root_dir),
            hostname: config.hostname.clone(),
            ip,
            external_name: config.external_name.clone(),
            batch_limit: config.batch_limit.max(1),
            record_directories: config.record_directories,
            tmp_dir: work_dir.join(&id),
            db_path: work_dir.join(format!("{}_{}", id, DATABASE_NAME)),
            id,
        }
    }

    pub fn is_external(&self) -> bool {
        !self.external_name.is_empty()
    }

    /// Name announced to the collector in the transfer header.
    pub fn transfer_name(&self) -> String {
        format!("{}{}.db", TRANSFER_PREFIX, self.id)
    }

    /// Create the shard directory.
    pub fn prepare(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.tmp_dir)?;
        debug!("Session {} using {}", self.id, self.tmp_dir.display());
        Ok(())
    }

    /// Remove the database file and the shard directory. Missing paths are
    /// fine. Both removals are attempted; the first failure is returned.
    pub fn cleanup(&self) -> Result<(), Error> {
        let db = ignore_missing(fs::remove_file(&self.db_path));
        let shards = ignore_missing(fs::remove_dir_all(&self.tmp_dir));
        db.and(shards)?;
        debug!("Session {} artifacts removed", self.id);
        Ok(())
    }
}

fn ignore_missing(result: io::Result<()>) -> io::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Local address the OS would route through to reach `target`.
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn detect_local_ip(target: &str) -> Option<String> {
    let remote = match target.to_socket_addrs() {
        Ok(mut addrs) => addrs.next()?,
        Err(err) => {
            warn!("Cannot resolve {}: {}", target, err);
            return None;
        }
    };
    let bind = if remote.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind).ok()?;
    socket.connect(remote).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip().to_string())
}
