//! Configuration module
//!
//! An optional TOML file, named by `PIPEMETER_CONFIG`, supplies option
//! defaults and the output buffering mode:
//!
//! ```toml
//! [defaults]
//! unit = "lines"
//! ncols = 100
//!
//! [output]
//! buffering = "block"
//! ```

use crate::error::CliError;
use pipemeter_core::BufferMode;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "PIPEMETER_CONFIG";

/// CLI configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct CliConfig {
    /// Option defaults, overridden by the command line
    #[serde(default)]
    pub defaults: BTreeMap<String, toml::Value>,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Output-related configuration
#[derive(Debug, Deserialize, Default)]
pub struct OutputConfig {
    /// How relay output is buffered: `"unbuffered"` or `"block"`
    #[serde(default, deserialize_with = "deserialize_buffer_mode")]
    pub buffering: BufferMode,
}

fn deserialize_buffer_mode<'de, D>(deserializer: D) -> Result<BufferMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse::<BufferMode>().map_err(serde::de::Error::custom)
}

impl CliConfig {
    /// Load the file named by [`CONFIG_ENV`], or the built-in defaults
    pub fn from_env() -> Result<Self, CliError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Self::parse(&text)
    }

    /// Parse configuration text
    pub fn parse(text: &str) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn buffer_mode(&self) -> BufferMode {
        self.output.buffering
    }

    /// Defaults as raw (name, value) pairs, spelled the way they would be on
    /// the command line
    pub fn default_pairs(&self) -> Result<Vec<(String, String)>, CliError> {
        self.defaults
            .iter()
            .map(|(name, value)| {
                raw_value(value)
                    .map(|raw| (name.clone(), raw))
                    .ok_or_else(|| {
                        CliError::Config(format!(
                            "default for '{name}' must be a string, number or boolean"
                        ))
                    })
            })
            .collect()
    }
}

fn raw_value(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(true) => Some("True".to_string()),
        toml::Value::Boolean(false) => Some("False".to_string()),
        _ => None,
    }
}
