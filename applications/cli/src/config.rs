/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sonance_normalize::{NormalizeSettings, DEFAULT_BLOCK_SIZE};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sonance.toml";

/// Largest accepted processing block, in samples
pub const MAX_BLOCK_SIZE: usize = 1 << 24;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    /// Default normalization settings (overridden by command-line flags)
    #[serde(default)]
    pub normalize: NormalizeSettings,

    #[serde(default)]
    pub processing: ProcessingSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessingSettings {
    /// Samples streamed per block
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `tracing` filter used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `sonance.toml` is read if
    /// present. Environment variables prefixed with `SONANCE_` override file
    /// values, with `__` between nested keys
    /// (`SONANCE_NORMALIZE__PEAK_LEVEL_DB=-3`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::build(path, environment())
    }

    /// Parse configuration from a TOML string (no environment overrides)
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn build(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(env);

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.normalize
            .validate()
            .map_err(|e| CliError::Config(format!("[normalize] {}", e)))?;

        check_block_size(self.processing.block_size)
            .map_err(|e| CliError::Config(format!("[processing] {}", e)))?;

        if self.logging.filter.trim().is_empty() {
            return Err(CliError::Config(
                "[logging] filter must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a `--block-size` value
pub fn parse_block_size(value: &str) -> std::result::Result<usize, String> {
    let block_size = value
        .parse::<usize>()
        .map_err(|e| format!("invalid block size '{}': {}", value, e))?;
    check_block_size(block_size)?;
    Ok(block_size)
}

fn check_block_size(block_size: usize) -> std::result::Result<(), String> {
    if (1..=MAX_BLOCK_SIZE).contains(&block_size) {
        Ok(())
    } else {
        Err(format!(
            "block_size must be between 1 and {}, got {}",
            MAX_BLOCK_SIZE, block_size
        ))
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("SONANCE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_filter() -> String {
    "sonance=info".to_string()
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env_with(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn defaults_without_sources() {
        let config = CliConfig::from_toml_str("").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.processing.block_size, 65_536);
        assert_eq!(config.logging.filter, "sonance=info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = CliConfig::from_toml_str(
            r#"
            [normalize]
            peak_level_db = -3.0
            stereo_independent = true

            [processing]
            block_size = 4096
            "#,
        )
        .unwrap();

        assert_eq!(config.normalize.peak_level_db, -3.0);
        assert!(config.normalize.stereo_independent);
        assert!(config.normalize.apply_gain);
        assert!(config.normalize.remove_dc);
        assert_eq!(config.processing.block_size, 4096);
        assert_eq!(config.logging.filter, "sonance=info");
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[normalize]\npeak_level_db = -3.0\napply_gain = true").unwrap();

        let env = env_with(&[
            ("SONANCE_NORMALIZE__PEAK_LEVEL_DB", "-6"),
            ("SONANCE_NORMALIZE__REMOVE_DC", "false"),
            ("SONANCE_LOGGING__FILTER", "sonance=debug"),
        ]);
        let config = CliConfig::build(Some(file.path()), env).unwrap();

        assert_eq!(config.normalize.peak_level_db, -6.0);
        assert!(config.normalize.apply_gain);
        assert!(!config.normalize.remove_dc);
        assert_eq!(config.logging.filter, "sonance=debug");
    }

    #[test]
    fn explicit_file_must_exist() {
        let result = CliConfig::build(
            Some(Path::new("/nonexistent/sonance.toml")),
            env_with(&[]),
        );
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = CliConfig::default();
        config.normalize.peak_level_db = 3.0;
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.processing.block_size = 0;
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.logging.filter = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_block_is_rejected() {
        let config = CliConfig::from_toml_str(&format!(
            "[processing]\nblock_size = {}",
            MAX_BLOCK_SIZE + 1
        ))
        .unwrap();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        let mut config = CliConfig::default();
        config.processing.block_size = MAX_BLOCK_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn block_size_flag_is_bounded() {
        assert_eq!(parse_block_size("4096"), Ok(4096));
        assert_eq!(parse_block_size(&MAX_BLOCK_SIZE.to_string()), Ok(MAX_BLOCK_SIZE));
        assert!(parse_block_size("0").is_err());
        assert!(parse_block_size(&(MAX_BLOCK_SIZE + 1).to_string()).is_err());
        assert!(parse_block_size("2305843009213693951").is_err());
        assert!(parse_block_size("lots").is_err());
    }
}
