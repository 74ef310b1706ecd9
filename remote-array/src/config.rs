//! Configuration for remote-array
//!
//! Loads the device endpoint, strip size and socket options from a TOML
//! file. Every field has a default, so an empty file is a valid config.
//!
//! ```toml
//! [endpoint]
//! host = "192.168.1.50"
//! port = 9999
//!
//! [strip]
//! count = 60
//! fill = 0
//!
//! [transport]
//! connect_timeout_ms = 3000
//! write_timeout_ms = 1000
//! nodelay = true
//!
//! [logging]
//! level = "info"
//! ```

use crate::error::{Error, Result};
use crate::frame::MAX_RECORDS;
use crate::record::LedColor;
use crate::transport::{Endpoint, TransportOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub strip: StripConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote device address
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Hostname or IP of the LED controller (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port of the LED controller (default: 9999)
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Strip geometry
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StripConfig {
    /// Number of LEDs (default: 60, max 65535)
    #[serde(default = "default_count")]
    pub count: usize,

    /// Initial color for every LED, 0xWWRRGGBB (default: 0, off)
    #[serde(default)]
    pub fill: LedColor,
}

/// Socket hardening; absent values keep OS defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout_ms: Option<u64>,

    #[serde(default)]
    pub nodelay: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9999
}

fn default_count() -> usize {
    60
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            fill: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl EndpointConfig {
    /// Endpoint for the transport
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

impl TransportConfig {
    /// Socket options for [`crate::transport::TcpTransport`]
    pub fn options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            write_timeout: self.write_timeout_ms.map(Duration::from_millis),
            nodelay: self.nodelay,
        }
    }
}

impl MirrorConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use remote_array::config::MirrorConfig;
    ///
    /// let config = MirrorConfig::from_file("remote-array.toml")?;
    /// # Ok::<(), remote_array::Error>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: MirrorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Reject values the wire protocol or socket layer cannot use
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.host.is_empty() {
            return Err(Error::Config("endpoint.host must not be empty".to_string()));
        }
        if self.endpoint.port == 0 {
            return Err(Error::Config("endpoint.port must not be 0".to_string()));
        }
        if self.strip.count > MAX_RECORDS {
            return Err(Error::Config(format!(
                "strip.count {} exceeds {}",
                self.strip.count, MAX_RECORDS
            )));
        }
        Ok(())
    }
}
