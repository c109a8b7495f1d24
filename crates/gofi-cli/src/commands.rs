use clap::{Parser, Subcommand};
use gofi_core::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "gofi")]
#[command(about = "Inventory a directory tree and ship it to a gofi collector", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Address (host:port) where the collector is listening
    #[arg(long, global = true)]
    pub target_url: Option<String>,

    /// Print the records instead of storing and sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Name of the external source; marks every record as external
    #[arg(long, global = true)]
    pub external_name: Option<String>,

    /// Directory to scan recursively
    #[arg(long, global = true)]
    pub root_dir: Option<String>,

    /// Number of records per shard
    #[arg(long, global = true)]
    pub batch_limit: Option<usize>,

    /// Hostname to report instead of the system one
    #[arg(long, global = true)]
    pub hostname: Option<String>,

    /// Record directories as rows too
    #[arg(long, global = true)]
    pub record_directories: bool,

    /// Write the final chunk as a full buffer for older collectors
    #[arg(long, global = true)]
    pub pad_final_chunk: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan, store and send (the default)
    Run,
    /// Print configuration values
    PrintConfig,
}

impl Cli {
    /// Flags win over file and environment configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(target_url) = &self.target_url {
            config.target_url = target_url.clone();
        }
        if let Some(external_name) = &self.external_name {
            config.external_name = external_name.clone();
        }
        if let Some(root_dir) = &self.root_dir {
            config.root_dir = root_dir.clone();
        }
        if let Some(batch_limit) = self.batch_limit {
            config.batch_limit = batch_limit;
        }
        if let Some(hostname) = &self.hostname {
            config.hostname = hostname.clone();
        }
        config.dry_run |= self.dry_run;
        config.record_directories |= self.record_directories;
        config.pad_final_chunk |= self.pad_final_chunk;
    }
}
