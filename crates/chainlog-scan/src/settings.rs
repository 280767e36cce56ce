//! File-based parser configuration and logging setup.
//!
//! ```yaml
//! event: "event Transfer(address indexed from, address indexed to, uint256 value)"
//! address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
//! chain_id: 1
//! log:
//!   level: info
//!   components:
//!     chainlog-scan: debug
//!   json: false
//! ```

use alloy_primitives::Address;
use chainlog_core::{ChainId, DescriptorError};
use chainlog_evm::ParserConfig;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported settings file extension: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("Logging already initialised: {0}")]
    Logging(String),
}

/// Parser settings as read from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserSettings {
    /// Human-readable event declaration
    pub event: String,
    /// Only match logs from this contract; any contract when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub log: LogSettings,
}

impl ParserSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Build the parser configuration these settings describe.
    pub fn parser_config(&self) -> Result<ParserConfig, SettingsError> {
        let mut config = ParserConfig::parse(&self.event)?;
        if let Some(address) = self.address {
            config = config.with_address(address);
        }
        if let Some(id) = self.chain_id {
            config = config.with_chain(ChainId::new(id));
        }
        Ok(config)
    }
}

/// Log level per component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: crate name → level
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: BTreeMap::new(),
            json: false,
        }
    }
}

impl LogSettings {
    /// `EnvFilter` directive string, e.g. `"info,chainlog_scan=debug"`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        for (component, level) in &self.components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }

    /// Install the global tracing subscriber.
    ///
    /// Invalid directives fall back to `info`. Fails if a subscriber is
    /// already installed.
    pub fn init(&self) -> Result<(), SettingsError> {
        let filter = EnvFilter::try_new(self.directives()).unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);
        let result = if self.json {
            registry.with(fmt::layer().json()).try_init()
        } else {
            registry.with(fmt::layer()).try_init()
        };
        result.map_err(|e| SettingsError::Logging(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
event: "event Transfer(address indexed from, address indexed to, uint256 value)"
address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"
chain_id: 1
log:
  level: warn
  components:
    chainlog-scan: debug
"#;

    #[test]
    fn yaml_settings() {
        let settings = ParserSettings::from_yaml_str(YAML).unwrap();
        assert_eq!(settings.chain_id, Some(1));
        assert_eq!(settings.log.directives(), "warn,chainlog_scan=debug");
        assert!(!settings.log.json);

        let config = settings.parser_config().unwrap();
        assert_eq!(config.chain(), Some(ChainId::MAINNET));
        assert_eq!(
            config.address(),
            Some("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48".parse().unwrap())
        );
        assert_eq!(config.descriptor().name(), "Transfer");
    }

    #[test]
    fn json_settings_with_defaults() {
        let settings = ParserSettings::from_json_str(r#"{"event":"Paused()"}"#).unwrap();
        assert_eq!(settings.log, LogSettings::default());
        assert_eq!(settings.log.directives(), "info");
        let config = settings.parser_config().unwrap();
        assert!(config.address().is_none());
        assert!(config.chain().is_none());
    }

    #[test]
    fn bad_event_is_a_descriptor_error() {
        let settings = ParserSettings::from_json_str(r#"{"event":"Transfer("}"#).unwrap();
        assert!(matches!(
            settings.parser_config(),
            Err(SettingsError::Descriptor(_))
        ));
    }

    #[test]
    fn load_by_extension() {
        let dir = std::env::temp_dir().join(format!("chainlog-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let yaml = dir.join("parser.yaml");
        std::fs::write(&yaml, YAML).unwrap();
        assert_eq!(ParserSettings::load(&yaml).unwrap().chain_id, Some(1));

        let toml = dir.join("parser.toml");
        std::fs::write(&toml, "event = 'x'").unwrap();
        assert!(matches!(
            ParserSettings::load(&toml),
            Err(SettingsError::UnsupportedFormat(ext)) if ext == "toml"
        ));

        assert!(matches!(
            ParserSettings::load(dir.join("missing.json")),
            Err(SettingsError::Io { .. })
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
