//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/mpd-notify/config.json`.
//! Every section is optional so the file can be extended later without
//! breaking existing setups, and a missing file means "all defaults".
//!
//! # Example
//!
//! ```json
//! {
//!   "mpd": { "host": "localhost", "port": 6600, "password": null, "timeout_ms": 1000 },
//!   "poll": { "interval_ms": 500 },
//!   "retry": { "delay_ms": 5000, "backoff_factor": 1.0, "max_delay_ms": 60000 },
//!   "notifications": { "app_name": "mpd-notify", "stop_icon": "media-playback-stop" },
//!   "daemon": { "log_file": "/tmp/mpd-notify.log" }
//! }
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional. A minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how to reach MPD.
    #[serde(default)]
    pub mpd: MpdConfig,

    #[serde(default)]
    pub poll: PollConfig,

    /// Reconnect policy after the connection is lost or refused.
    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// MPD connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MpdConfig {
    pub host: String,
    pub port: u16,
    /// Sent with the `password` command right after connecting.
    pub password: Option<String>,
    /// Connect, read and write timeout (ms).  A shutdown request that
    /// arrives while a socket call is blocked is seen only once the call
    /// returns, so this also bounds how long Ctrl-C can take.
    pub timeout_ms: u64,
}

impl Default for MpdConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 6600,
            password: None,
            timeout_ms: 1000,
        }
    }
}

impl MpdConfig {
    /// Socket timeout.  Never zero; the socket APIs reject a zero timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.max(1))
    }
}

/// Poll loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Time between two status queries (ms).
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Reconnect timing.
///
/// With the default `backoff_factor` of `1.0` every attempt waits
/// `delay_ms`.  Larger factors grow the delay geometrically up to
/// `max_delay_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_ms: 5000,
            backoff_factor: 1.0,
            max_delay_ms: 60_000,
        }
    }
}

/// Desktop notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Application name reported to the notification server.
    pub app_name: String,
    /// Icon for the "Stopped" notification; `null` or `""` for none.
    pub stop_icon: Option<String>,
    /// Expiry (ms); `null` leaves it to the server.
    pub timeout_ms: Option<u32>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_name: "mpd-notify".into(),
            stop_icon: Some("media-playback-stop".into()),
            timeout_ms: None,
        }
    }
}

/// Settings that only apply in `daemonize` mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// File that receives stdout/stderr once detached.  `/dev/null` when
    /// unset.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load `config.json` from [`config_dir`], falling back to compiled-in
    /// defaults when it is missing or invalid.
    pub fn load_or_default() -> Self {
        let path = config_dir().join("config.json");
        match Self::load(&path) {
            Ok(cfg) => {
                info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                info!("no usable config file ({}), using defaults", e);
                Self::default()
            }
        }
    }
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/mpd-notify`).
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("mpd-notify")
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
