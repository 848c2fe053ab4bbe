//! Configuration management.
//!
//! Values are layered: built-in defaults, then the JSON config file, then
//! `SNAPMON_*` environment variables. The daemon applies CLI flags last.

use crate::error::{Result, SnapmonError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default API prefix of a SnapRoute device.
pub const DEFAULT_URL: &str = "http://localhost:8080/public/v1/";

/// Listen address for the Prometheus endpoint when none is configured.
pub const DEFAULT_METRICS_LISTEN: &str = "0.0.0.0:9273";

/// Where collected samples are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// InfluxDB line protocol on stdout
    #[default]
    Line,
    /// Gauges and counters on the Prometheus endpoint
    Prometheus,
}

impl FromStr for OutputFormat {
    type Err = SnapmonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "prometheus" => Ok(Self::Prometheus),
            other => Err(SnapmonError::InvalidConfig {
                reason: format!("Unknown output format '{}' (expected line or prometheus)", other),
            }),
        }
    }
}

/// Poller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL prefix of the SnapRoute REST API
    pub url: String,
    pub interval_secs: u64,
    /// Per-request HTTP timeout
    pub timeout_secs: u64,
    pub log_level: String,
    pub output: OutputFormat,
    /// Prometheus endpoint address, e.g. `0.0.0.0:9273`
    pub metrics_listen: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            interval_secs: 10,
            timeout_secs: 5,
            log_level: "info".to_string(),
            output: OutputFormat::Line,
            metrics_listen: None,
        }
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn config_path() -> PathBuf {
        std::env::var("SNAPMON_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/etc/snapmon/config.json"))
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| SnapmonError::InvalidConfig {
            reason: format!("Failed to read config {:?}: {}", path, e),
        })?;
        serde_json::from_str(&content).map_err(|e| SnapmonError::InvalidConfig {
            reason: format!("Failed to parse config {:?}: {}", path, e),
        })
    }

    /// Apply `SNAPMON_*` environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment-style key.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("SNAPMON_URL") {
            self.url = url;
        }
        if let Some(v) = lookup("SNAPMON_INTERVAL_SECS") {
            self.interval_secs = parse_secs("SNAPMON_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("SNAPMON_TIMEOUT_SECS") {
            self.timeout_secs = parse_secs("SNAPMON_TIMEOUT_SECS", &v)?;
        }
        if let Some(level) = lookup("SNAPMON_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(v) = lookup("SNAPMON_OUTPUT") {
            self.output = v.parse()?;
        }
        if let Some(addr) = lookup("SNAPMON_METRICS_LISTEN") {
            self.metrics_listen = Some(addr);
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Address for the Prometheus endpoint, if one should be served.
    ///
    /// The Prometheus output always needs an endpoint, so it falls back to
    /// [`DEFAULT_METRICS_LISTEN`].
    pub fn metrics_addr(&self) -> Result<Option<SocketAddr>> {
        let raw = match (&self.metrics_listen, self.output) {
            (Some(addr), _) => addr.as_str(),
            (None, OutputFormat::Prometheus) => DEFAULT_METRICS_LISTEN,
            (None, OutputFormat::Line) => return Ok(None),
        };
        raw.parse::<SocketAddr>().map(Some).map_err(|e| SnapmonError::InvalidConfig {
            reason: format!("Invalid metrics listen address '{}': {}", raw, e),
        })
    }

    /// Sample configuration file: the defaults as pretty JSON.
    pub fn sample() -> String {
        serde_json::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| SnapmonError::InvalidConfig {
        reason: format!("{} must be a whole number of seconds, got '{}'", key, value),
    })
}
