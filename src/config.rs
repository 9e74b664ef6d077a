//! Daemon configuration loading from TOML
//!
//! # Configuration File Format
//!
//! ```toml
//! [gateway]
//! udp_port = 5000
//! crc = true
//! record = false
//! record_path = "./recorded/session.bin"
//! log_level = "INFO"
//!
//! [control]
//! port = 5100
//! ```
//!
//! Every field has a default, so a missing section or an absent file (the
//! daemon falls back to `Config::default()`) yields a working gateway on the
//! standard ports.

use crate::error::{Error, Result};
use crate::gateway::GatewayConfig;
use crate::protocol::Severity;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// `[gateway]` section
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySection {
    /// UDP ingest port
    #[serde(default = "default_udp_port")]
    pub udp_port: u16,

    /// Validate the CRC-32 trailer on incoming frames
    #[serde(default = "default_true")]
    pub crc: bool,

    /// Record the raw frame stream
    #[serde(default)]
    pub record: bool,

    /// Where recordings are written
    #[serde(default = "default_record_path")]
    pub record_path: PathBuf,

    /// Journal level: DEBUG, INFO, WARN, ALARM, ERROR, FATAL
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_udp_port() -> u16 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_record_path() -> PathBuf {
    PathBuf::from("./recorded/session.bin")
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for GatewaySection {
    fn default() -> Self {
        GatewaySection {
            udp_port: default_udp_port(),
            crc: true,
            record: false,
            record_path: default_record_path(),
            log_level: default_log_level(),
        }
    }
}

/// `[control]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ControlSection {
    /// TCP port of the command channel
    #[serde(default = "default_control_port")]
    pub port: u16,
}

fn default_control_port() -> u16 {
    5100
}

impl Default for ControlSection {
    fn default() -> Self {
        ControlSection {
            port: default_control_port(),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewaySection,
    #[serde(default)]
    pub control: ControlSection,
}

impl Config {
    /// Load and validate a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: Config = basic_toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if Severity::from_name(&self.gateway.log_level).is_none() {
            return Err(Error::Config(format!(
                "Invalid log_level '{}' (expected DEBUG, INFO, WARN, ALARM, ERROR, or FATAL)",
                self.gateway.log_level
            )));
        }
        if self.gateway.record && self.gateway.record_path.as_os_str().is_empty() {
            return Err(Error::Config(
                "record = true requires a record_path".to_string(),
            ));
        }
        Ok(())
    }

    /// Journal level (validated at load time).
    pub fn log_level(&self) -> Severity {
        Severity::from_name(&self.gateway.log_level).unwrap_or(Severity::Info)
    }

    /// Build the runtime gateway configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            udp_port: self.gateway.udp_port,
            crc_enabled: self.gateway.crc,
            record_enabled: self.gateway.record,
            record_path: self.gateway.record_path.clone(),
            replay_path: None,
            log_level: self.log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.gateway.udp_port, 5000);
        assert!(config.gateway.crc);
        assert!(!config.gateway.record);
        assert_eq!(config.control.port, 5100);
        assert_eq!(config.log_level(), Severity::Info);
    }

    #[test]
    fn test_parse_full_file() {
        let toml = r#"
            [gateway]
            udp_port = 6000
            crc = false
            record = true
            record_path = "/tmp/session.bin"
            log_level = "DEBUG"

            [control]
            port = 6100
        "#;
        let config: Config = basic_toml::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.gateway.udp_port, 6000);
        assert!(!config.gateway.crc);
        assert!(config.gateway.record);
        assert_eq!(config.control.port, 6100);
        assert_eq!(config.log_level(), Severity::Debug);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let toml = r#"
            [gateway]
            udp_port = 7000
        "#;
        let config: Config = basic_toml::from_str(toml).unwrap();
        assert_eq!(config.gateway.udp_port, 7000);
        assert!(config.gateway.crc);
        assert_eq!(config.control.port, 5100);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let toml = r#"
            [gateway]
            log_level = "CHATTY"
        "#;
        let config: Config = basic_toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_gateway_config_mapping() {
        let toml = r#"
            [gateway]
            udp_port = 8000
            crc = false
            record = true
            record_path = "/tmp/r.bin"
            log_level = "WARN"
        "#;
        let config: Config = basic_toml::from_str(toml).unwrap();
        let gc = config.gateway_config();
        assert_eq!(gc.udp_port, 8000);
        assert!(!gc.crc_enabled);
        assert!(gc.record_enabled);
        assert_eq!(gc.record_path, PathBuf::from("/tmp/r.bin"));
        assert_eq!(gc.log_level, Severity::Warn);
        assert!(gc.replay_path.is_none());
    }
}
