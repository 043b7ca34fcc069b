use tracing::debug;

use crate::{Error, Result};

/// Runtime configuration loaded from environment variables at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the TOML file holding `[[alert]]` definitions.
    pub alerts_config_path: String,
    /// JSON-lines bar feed. `None` reads from stdin.
    pub bar_feed_path: Option<String>,
    /// Capacity of the bar queue and fired-alert channels.
    pub channel_capacity: usize,
}

impl Config {
    const DEFAULT_ALERTS_PATH: &'static str = "config/alerts.toml";
    const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let channel_capacity = match lookup("ALERT_CHANNEL_CAPACITY") {
            Some(raw) => {
                let value: usize = raw.trim().parse().map_err(|_| {
                    Error::Config(format!(
                        "ALERT_CHANNEL_CAPACITY must be a positive integer, got: '{raw}'"
                    ))
                })?;
                if value == 0 {
                    return Err(Error::Config(
                        "ALERT_CHANNEL_CAPACITY must be greater than zero".to_string(),
                    ));
                }
                value
            }
            None => Self::DEFAULT_CHANNEL_CAPACITY,
        };

        Ok(Config {
            alerts_config_path: lookup("ALERTS_CONFIG_PATH")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_ALERTS_PATH.to_string()),
            bar_feed_path: lookup("BAR_FEED_PATH").filter(|v| !v.trim().is_empty()),
            channel_capacity,
        })
    }
}
