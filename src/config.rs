use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunable session parameters.
///
/// The defaults reproduce the DPO7000 values this crate was written
/// against, but both the settle delay and the transfer window ceiling are
/// firmware-dependent, so they are configuration rather than constants.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScopeConfig {
    /// VISA response timeout in milliseconds
    pub timeout_ms: u64,
    /// Blocking delay after `AUTOSET EXECUTE`, in milliseconds
    pub autoset_settle_ms: u64,
    /// First sample of the transfer window (`DATA:START`)
    pub transfer_start: u32,
    /// Last sample of the transfer window (`DATA:STOP`). The default is
    /// larger than any real record length, so the scope returns everything.
    pub transfer_stop: u32,
    /// Identity substring that marks the vendor (case-insensitive)
    pub vendor_marker: String,
    /// Identity substring that marks the model family (case-insensitive)
    pub model_marker: String,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 20_000,
            autoset_settle_ms: 2_000,
            transfer_start: 1,
            transfer_stop: 1_000_000,
            vendor_marker: "TEKTRONIX".to_string(),
            model_marker: "DPO7".to_string(),
        }
    }
}

impl ScopeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.autoset_settle_ms)
    }
}

/// Load configuration from file with layered fallbacks
pub fn load_config(config_path: Option<&Path>) -> Result<ScopeConfig, ConfigError> {
    let mut builder = Config::builder().add_source(Config::try_from(&ScopeConfig::default())?);

    if let Some(path) = config_path {
        if path.exists() {
            builder = builder.add_source(File::from(path));
        } else {
            return Err(ConfigError::Message(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
    } else if Path::new("tekscope.toml").exists() {
        builder = builder.add_source(File::with_name("tekscope.toml"));
    }

    // Add environment variable overrides with prefix "TEKSCOPE_"
    builder = builder.add_source(
        Environment::with_prefix("TEKSCOPE")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize::<ScopeConfig>()
}

/// Load configuration with better error handling and defaults
pub fn load_config_or_default(config_path: Option<&Path>) -> ScopeConfig {
    match load_config(config_path) {
        Ok(config) => {
            log::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            log::warn!("Failed to load config ({}), using defaults", e);
            ScopeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_instrument_constants() {
        let config = ScopeConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.settle_delay(), Duration::from_secs(2));
        assert_eq!(config.transfer_start, 1);
        assert_eq!(config.transfer_stop, 1_000_000);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "autoset_settle_ms = 5000").unwrap();
        writeln!(file, "model_marker = \"DPO70000\"").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.autoset_settle_ms, 5000);
        assert_eq!(config.model_marker, "DPO70000");
        // untouched fields keep their defaults
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("/nonexistent/scope.toml")));
        assert!(result.is_err());
    }
}
