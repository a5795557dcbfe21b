//! Configuration management for StarLedger

use crate::error::{LedgerError, Result};
use crate::ownership::{DEFAULT_DOMAIN_TAG, DEFAULT_FRESHNESS_WINDOW_SECS};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::Level;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_domain_tag")]
    pub domain_tag: String,
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,
    /// Re-validate the chain after each accepted submission and log any findings.
    #[serde(default = "default_enabled")]
    pub audit_on_append: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            domain_tag: default_domain_tag(),
            freshness_window_secs: default_freshness_window(),
            audit_on_append: default_enabled(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    pub fn max_level(&self) -> Result<Level> {
        self.level
            .parse::<Level>()
            .map_err(|_| LedgerError::Config(format!("unknown log level '{}'", self.level)))
    }

    /// Installs a global `fmt` subscriber at the configured level.
    pub fn init_subscriber(&self) -> Result<()> {
        tracing_subscriber::fmt()
            .with_max_level(self.max_level()?)
            .with_target(false)
            .try_init()
            .map_err(|e| LedgerError::Config(format!("failed to install subscriber: {}", e)))
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.ledger.domain_tag.is_empty() {
            return Err(LedgerError::Config("ledger.domain_tag must not be empty".into()));
        }
        if self.ledger.domain_tag.contains(':') {
            return Err(LedgerError::Config("ledger.domain_tag must not contain ':'".into()));
        }
        if self.ledger.freshness_window_secs == 0 {
            return Err(LedgerError::Config(
                "ledger.freshness_window_secs must be greater than zero".into(),
            ));
        }
        self.logging.max_level()?;
        Ok(())
    }
}

fn default_domain_tag() -> String {
    DEFAULT_DOMAIN_TAG.to_string()
}

fn default_freshness_window() -> u64 {
    DEFAULT_FRESHNESS_WINDOW_SECS
}

fn default_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Loads `config.toml` from the working directory.
pub fn load_config() -> Result<Config> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Loads and validates a config file. A missing file yields the defaults.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let config = match fs::read_to_string(path.as_ref()) {
        Ok(contents) => toml::from_str(&contents)?,
        Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
        Err(e) => return Err(e.into()),
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config_from(temp_dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.ledger.domain_tag, "starRegistry");
        assert_eq!(config.ledger.freshness_window_secs, 300);
        assert!(config.ledger.audit_on_append);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[ledger]\nfreshness_window_secs = 60\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.ledger.freshness_window_secs, 60);
        assert_eq!(config.ledger.domain_tag, "starRegistry");
        assert_eq!(config.logging.max_level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_full_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[ledger]
domain_tag = "observatory"
freshness_window_secs = 120
audit_on_append = false

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.ledger.domain_tag, "observatory");
        assert!(!config.ledger.audit_on_append);
        assert_eq!(config.logging.max_level().unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        for contents in [
            "[ledger]\ndomain_tag = \"\"\n",
            "[ledger]\ndomain_tag = \"a:b\"\n",
            "[ledger]\nfreshness_window_secs = 0\n",
            "[logging]\nlevel = \"loud\"\n",
            "[ledger\n",
        ] {
            fs::write(&path, contents).unwrap();
            let result = load_config_from(&path);
            assert!(matches!(result, Err(LedgerError::Config(_))), "{contents:?} was accepted");
        }
    }
}
