use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{errors::Error, Result};

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Typed configuration.
///
/// The YAML file supplies everything except the transport credential, which
/// comes from the environment. Nothing mutates a `Config` once loaded; share it
/// behind an `Arc`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub subscription_api: SubscriptionApiConfig,
    pub features: FeaturesConfig,
    pub monitor: MonitorConfig,
    pub filters: FiltersConfig,

    /// Bot token for the Telegram transport (`TELEGRAM_BOT_TOKEN`).
    #[serde(skip)]
    pub telegram_bot_token: String,

    /// Where this config was read from (empty for in-memory configs).
    #[serde(skip)]
    pub source_path: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionApiConfig {
    /// `host[:port]` of the subscription service; requests go to `http://{host}/...`.
    pub host: String,
    pub api_key: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    pub fetch_history_enabled: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Channels to watch. Empty means every channel.
    pub channels: Vec<i64>,
    /// Channels whose messages only need a keyword match.
    pub whitelist_channels: Vec<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Primary match, case-insensitive.
    pub keywords: Vec<String>,
    /// Secondary match for non-whitelisted channels, case-sensitive.
    pub content_filter: Vec<String>,
    /// Links containing any of these (case-insensitive) are dropped.
    pub link_blacklist: Vec<String>,
}

impl Config {
    /// Load the config file and the transport credential from the environment.
    ///
    /// Reads the environment only; a `.env` file must be applied by the caller
    /// before any threads start.
    ///
    /// Path resolution: `MSGWAIT_CONFIG`, then `$MSGWAIT_DATA_DIR/config.yaml`,
    /// then `./config.yaml`.
    pub fn load() -> Result<Self> {
        let path = resolve_config_path(
            env_str("MSGWAIT_CONFIG").and_then(non_empty),
            env_str("MSGWAIT_DATA_DIR").and_then(non_empty),
        );
        let mut cfg = Self::from_file(&path)?;

        cfg.telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if cfg.telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut cfg = Self::from_yaml_str(&raw).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        cfg.source_path = path.to_path_buf();
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        // An empty document deserializes to `()`, not a mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configs that could never submit anything, warn about odd ones.
    fn validate(&self) -> Result<()> {
        if self.subscription_api.host.contains("://") {
            return Err(Error::Config(format!(
                "subscription_api.host must be host[:port] without a scheme, got {:?}",
                self.subscription_api.host
            )));
        }
        if self.filters.keywords.is_empty() {
            tracing::warn!("filters.keywords is empty; no message will ever match");
        }
        if self.filters.keywords.iter().any(|k| k.is_empty()) {
            tracing::warn!("filters.keywords contains an empty entry; it matches every message");
        }
        if self.filters.link_blacklist.iter().any(|b| b.is_empty()) {
            tracing::warn!("filters.link_blacklist contains an empty entry; it drops every link");
        }
        Ok(())
    }

    pub fn is_monitored(&self, channel_id: i64) -> bool {
        self.monitor.channels.is_empty() || self.monitor.channels.contains(&channel_id)
    }

    pub fn is_whitelisted(&self, channel_id: i64) -> bool {
        self.monitor.whitelist_channels.contains(&channel_id)
    }

    pub fn backfill_enabled(&self) -> bool {
        self.features.fetch_history_enabled && !self.monitor.channels.is_empty()
    }
}

fn resolve_config_path(explicit: Option<String>, data_dir: Option<String>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }
    match data_dir {
        Some(dir) => PathBuf::from(dir).join(CONFIG_FILE_NAME),
        None => PathBuf::from(CONFIG_FILE_NAME),
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
