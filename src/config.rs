use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_SOURCE_URL: &str = "https://www.gencon.com/downloads/events.xlsx";
/// Lambda only allows writes under `/tmp`.
pub const DEFAULT_DATA_PATH: &str = "/tmp/events.xlsx";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_LINK_HOST: &str = "gencon.com";
pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

/// Runtime settings, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub source_url: String,
    pub data_path: PathBuf,
    pub refresh_interval: Duration,
    pub download_timeout: Duration,
    pub link_host: String,
    pub slack_bot_token: String,
    pub slack_api_base: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("source_url", &self.source_url)
            .field("data_path", &self.data_path)
            .field("refresh_interval", &self.refresh_interval)
            .field("download_timeout", &self.download_timeout)
            .field("link_host", &self.link_host)
            .field("slack_bot_token", &"<redacted>")
            .field("slack_api_base", &self.slack_api_base)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Config {
            source_url: get("EVENTS_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string()),
            data_path: get("EVENTS_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            refresh_interval: seconds(
                "EVENTS_REFRESH_INTERVAL_SECS",
                get("EVENTS_REFRESH_INTERVAL_SECS"),
                DEFAULT_REFRESH_INTERVAL_SECS,
            )?,
            download_timeout: seconds(
                "EVENTS_DOWNLOAD_TIMEOUT_SECS",
                get("EVENTS_DOWNLOAD_TIMEOUT_SECS"),
                DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            )?,
            link_host: get("EVENTS_LINK_HOST").unwrap_or_else(|| DEFAULT_LINK_HOST.to_string()),
            slack_bot_token: get("SLACK_BOT_TOKEN").ok_or(ConfigError::Missing("SLACK_BOT_TOKEN"))?,
            slack_api_base: get("SLACK_API_BASE").unwrap_or_else(|| DEFAULT_SLACK_API_BASE.to_string()),
        })
    }
}

/// A positive number of seconds.
fn seconds(var: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(default));
    };
    match value.parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid { var, value, reason: "must be greater than zero".to_string() }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::Invalid { var, value, reason: e.to_string() }),
    }
}
