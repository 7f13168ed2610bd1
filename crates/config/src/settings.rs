//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, MergeConfig, PublishConfig, SynthesisConfig};

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Speech synthesis provider configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Merge and export configuration
    #[serde(default)]
    pub merge: MergeConfig,

    /// Durable publish configuration
    #[serde(default)]
    pub publish: PublishConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merge.gap_min_ms > self.merge.gap_max_ms {
            return Err(ConfigError::InvalidValue {
                field: "merge.gap_min_ms".to_string(),
                message: format!(
                    "gap range is inverted ({} > {})",
                    self.merge.gap_min_ms, self.merge.gap_max_ms
                ),
            });
        }

        if self.synthesis.max_concurrent == 0 {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.max_concurrent".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.publish.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "publish.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.merge.sample_rate == 0 {
            return Err(ConfigError::InvalidValue {
                field: "merge.sample_rate".to_string(),
                message: "must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (NARRATOR__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("NARRATOR")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.synthesis.model, "tts-1");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation_gap_range() {
        let mut settings = Settings::default();
        settings.merge.gap_min_ms = 2000; // Above gap_max_ms
        assert!(settings.validate().is_err());

        settings.merge.gap_min_ms = 500;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation_retry_bound() {
        let mut settings = Settings::default();
        settings.publish.max_attempts = 0;
        assert!(settings.validate().is_err());
    }
}
