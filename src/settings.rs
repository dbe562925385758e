//! Layered application settings.
//!
//! Sources, lowest priority first: built-in defaults, the TOML file given by
//! `--config`, then environment variables such as
//! `BATCHCONV__CONVERSION__TARGET_FORMAT=glb`.

use std::path::Path;

use anyhow::Context;
use batchconv_core::RequestSettings;
use plugin_blender::BlenderConfig;
use serde::{Deserialize, Serialize};

/// Prefix of environment variable overrides.
const ENV_PREFIX: &str = "BATCHCONV";

/// Root settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Conversion request defaults.
    pub conversion: RequestSettings,
    /// Blender backend.
    pub blender: BlenderConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

impl Settings {
    /// Load settings from `path` (optional) and the environment.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to build config from '{}'", path))?;

        config
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize config from '{}'", path))
    }

    /// Whether a configuration file exists at `path`.
    pub fn file_exists(path: &str) -> bool {
        Path::new(path).is_file()
    }
}
