use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LivegrabError, Result};

/// Output folder used when neither the broadcaster nor the policy names one
pub const FALLBACK_FOLDER: &str = "data";
pub const DEFAULT_TEMP_FOLDER: &str = "temp";

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_CONFIG_FILE: &str = "default_config.json";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_STREAM_HOSTS: [&str; 3] = [
    "https://video-ws-aws.lv-play.com",
    "https://video-ws-hls-aws.lv-play.com",
    "https://video-ws.lv-play.com",
];

/// Quality postfixes appended to the broadcaster id; empty means source quality
pub const DEFAULT_QUALITIES: [&str; 2] = ["Y", ""];

pub const DEFAULT_EXTENSIONS: [&str; 2] = ["flv", "m3u8"];

/// Broadcaster identity as written in the config, numeric or textual
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BroadcasterId {
    Numeric(u64),
    Text(String),
}

impl fmt::Display for BroadcasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcasterId::Numeric(id) => write!(f, "{}", id),
            BroadcasterId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Broadcaster {
    pub id: BroadcasterId,
    pub name: String,
    #[serde(default)]
    pub enable_notify: bool,
    /// Optional icon shown in the desktop notification
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

impl Broadcaster {
    pub fn new(id: BroadcasterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enable_notify: false,
            icon: None,
            folder: None,
            prefix: None,
        }
    }
}

/// Process-wide defaults and tuning knobs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultPolicy {
    #[serde(default)]
    pub default_folder: Option<String>,
    #[serde(default)]
    pub check_only: bool,
    #[serde(default)]
    pub temp_folder: Option<String>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub probe_timeout_secs: Option<u64>,
    #[serde(default)]
    pub stream_hosts: Option<Vec<String>>,
    #[serde(default)]
    pub qualities: Option<Vec<String>>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Explicit path to the ffmpeg binary
    #[serde(default)]
    pub ffmpeg: Option<String>,
}

impl DefaultPolicy {
    /// Folder that receives output when a broadcaster has no override
    pub fn output_folder(&self) -> &str {
        self.default_folder.as_deref().unwrap_or(FALLBACK_FOLDER)
    }

    pub fn temp_folder(&self) -> &str {
        self.temp_folder.as_deref().unwrap_or(DEFAULT_TEMP_FOLDER)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS))
    }

    /// Reject tuning values that would stall or crash the poll loop
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == Some(0) {
            return Err(LivegrabError::config("poll_interval_secs must be > 0"));
        }
        if self.probe_timeout_secs == Some(0) {
            return Err(LivegrabError::config("probe_timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn stream_hosts(&self) -> Vec<String> {
        self.stream_hosts
            .clone()
            .unwrap_or_else(|| DEFAULT_STREAM_HOSTS.iter().map(|h| h.to_string()).collect())
    }

    pub fn qualities(&self) -> Vec<String> {
        self.qualities
            .clone()
            .unwrap_or_else(|| DEFAULT_QUALITIES.iter().map(|q| q.to_string()).collect())
    }

    pub fn extensions(&self) -> Vec<String> {
        self.extensions
            .clone()
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, rename = "default_configs", alias = "defaults")]
    pub defaults: DefaultPolicy,
    #[serde(default, rename = "members", alias = "broadcasters")]
    pub broadcasters: Vec<Broadcaster>,
}

impl Settings {
    /// Load settings from `path`, or from the first config file that exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::locate()?,
        };

        log::info!("Loading config from {}", config_path.display());

        let data = fs::read_to_string(&config_path).map_err(|e| {
            LivegrabError::config(format!(
                "failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(data)?;
        settings.defaults.validate()?;
        Ok(settings)
    }

    /// Config file resolution: config.json, default_config.json, then the user config dir
    fn locate() -> Result<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE), PathBuf::from(DEFAULT_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("livegrab").join(CONFIG_FILE));
        }

        candidates
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                LivegrabError::config(format!(
                    "no config file found (tried {})",
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    /// Create the default output and temp directories
    pub fn create_folders(&self) -> Result<()> {
        for folder in [self.defaults.output_folder(), self.defaults.temp_folder()] {
            fs::create_dir_all(folder).map_err(|e| {
                LivegrabError::config(format!("failed to create folder {}: {}", folder, e))
            })?;
        }
        Ok(())
    }
}
