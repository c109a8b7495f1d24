use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_PORT: u16 = 1985;
pub const DEFAULT_BATCH_LIMIT: usize = 5000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// host:port of the collector.
    pub target_url: String,
    /// Print records instead of storing and sending them.
    pub dry_run: bool,
    /// Label of the external source being scanned; empty when the tree is local.
    pub external_name: String,
    pub root_dir: String,
    /// Records held in memory before a shard is flushed.
    pub batch_limit: usize,
    pub hostname: String,
    /// Directory that receives the session database and shard directory.
    pub work_dir: String,
    pub record_directories: bool,
    /// Write the last chunk as a full buffer even past the declared length.
    pub pad_final_chunk: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_url: format!("127.0.0.1:{}", DEFAULT_SERVER_PORT),
            dry_run: false,
            external_name: String::new(),
            root_dir: ".".to_string(),
            batch_limit: DEFAULT_BATCH_LIMIT,
            hostname: system_hostname(),
            work_dir: ".".to_string(),
            record_directories: false,
            pad_final_chunk: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_limit == 0 {
            return Err(ConfigError::Message(
                "batch_limit must be at least 1".to_string(),
            ));
        }
        if self.target_url.trim().is_empty() && !self.dry_run {
            return Err(ConfigError::Message("target_url is empty".to_string()));
        }
        Ok(())
    }
}

/// Defaults, then `Gofi.toml` if present, then `GOFI_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("target_url", defaults.target_url)?
        .set_default("dry_run", defaults.dry_run)?
        .set_default("external_name", defaults.external_name)?
        .set_default("root_dir", defaults.root_dir)?
        .set_default("batch_limit", defaults.batch_limit as i64)?
        .set_default("hostname", defaults.hostname)?
        .set_default("work_dir", defaults.work_dir)?
        .set_default("record_directories", defaults.record_directories)?
        .set_default("pad_final_chunk", defaults.pad_final_chunk)?
        .add_source(ConfigFile::with_name("Gofi").required(false))
        .add_source(Environment::with_prefix("GOFI").try_parsing(true))
        .build()?;
    let config = builder.try_deserialize::<AppConfig>()?;
    config.validate()?;
    Ok(config)
}

pub fn system_hostname() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.target_url, "127.0.0.1:1985");
        assert_eq!(config.batch_limit, 5000);
        assert!(config.external_name.is_empty());
        assert!(!config.dry_run);
        assert!(!config.hostname.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_limit_rejected() {
        let config = AppConfig {
            batch_limit: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_target_allowed_for_dry_run() {
        let mut config = AppConfig {
            target_url: String::new(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
        config.dry_run = true;
        assert!(config.validate().is_ok());
    }
}
