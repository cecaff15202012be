//! Environment configuration. `.env` is loaded first by `main`.

use anyhow::{Context, Result};
use match_watcher::{WatcherConfig, ERROR_BACKOFF_SECS, NOTIFY_COOLDOWN_SECS, POLL_INTERVAL_SECS};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TARGET_PLAYER: &str = "UNCRKING";
pub const DEFAULT_PORT: u16 = 10000;

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token:  String,
    pub faceit_api_key: String,
    /// `None` when unset or 0; the watcher then refuses to start.
    pub channel_id:     Option<u64>,
    pub port:           u16,
    pub target_player:  String,
    pub faceit_api_url: String,
    pub log_dir:        PathBuf,
    pub watcher:        WatcherConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("missing {key}"))
        };
        let secs = |key: &str, default: u64| {
            Duration::from_secs(get(key).and_then(|v| v.parse::<u64>().ok()).unwrap_or(default))
        };

        let channel_id = match get("CHANNEL_ID") {
            Some(raw) if !raw.trim().is_empty() => {
                let id: u64 = raw.trim().parse().context("Invalid CHANNEL_ID")?;
                (id != 0).then_some(id)
            }
            _ => None,
        };

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().context("Invalid PORT")?,
            None => DEFAULT_PORT,
        };

        let target_player = get("TARGET_PLAYER")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TARGET_PLAYER.to_string());

        let watcher = WatcherConfig {
            poll_interval: secs("POLL_INTERVAL_SECS", POLL_INTERVAL_SECS),
            cooldown:      secs("NOTIFY_COOLDOWN_SECS", NOTIFY_COOLDOWN_SECS),
            error_backoff: secs("ERROR_BACKOFF_SECS", ERROR_BACKOFF_SECS),
            ..WatcherConfig::new(target_player.clone())
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            faceit_api_key: required("FACEIT_API_KEY")?,
            channel_id,
            port,
            target_player,
            faceit_api_url: get("FACEIT_API_URL")
                .unwrap_or_else(|| faceit_api::DEFAULT_BASE_URL.to_string()),
            log_dir: get("LOG_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("logs")),
            watcher,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<BotConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_fill_in() {
        let cfg = load(&[("DISCORD_TOKEN", "t"), ("FACEIT_API_KEY", "k")]).unwrap();
        assert_eq!(cfg.channel_id, None);
        assert_eq!(cfg.port, 10000);
        assert_eq!(cfg.target_player, "UNCRKING");
        assert_eq!(cfg.watcher.nickname, "UNCRKING");
        assert_eq!(cfg.watcher.poll_interval, Duration::from_secs(120));
        assert_eq!(cfg.watcher.cooldown, Duration::from_secs(300));
        assert_eq!(cfg.watcher.error_backoff, Duration::from_secs(60));
        assert_eq!(cfg.faceit_api_url, "https://open.faceit.com/data/v4");
    }

    #[test]
    fn zero_channel_is_unset() {
        let cfg = load(&[("DISCORD_TOKEN", "t"), ("FACEIT_API_KEY", "k"), ("CHANNEL_ID", "0")]).unwrap();
        assert_eq!(cfg.channel_id, None);

        let cfg = load(&[
            ("DISCORD_TOKEN", "t"),
            ("FACEIT_API_KEY", "k"),
            ("CHANNEL_ID", "123456789012345678"),
        ])
        .unwrap();
        assert_eq!(cfg.channel_id, Some(123456789012345678));
    }

    #[test]
    fn overrides_apply() {
        let cfg = load(&[
            ("DISCORD_TOKEN", "t"),
            ("FACEIT_API_KEY", "k"),
            ("TARGET_PLAYER", "s1mple"),
            ("POLL_INTERVAL_SECS", "30"),
            ("PORT", "8080"),
        ])
        .unwrap();
        assert_eq!(cfg.watcher.nickname, "s1mple");
        assert_eq!(cfg.watcher.poll_interval, Duration::from_secs(30));
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn missing_token_is_an_error() {
        let err = load(&[("FACEIT_API_KEY", "k")]).unwrap_err();
        assert!(err.to_string().contains("DISCORD_TOKEN"));
    }

    #[test]
    fn garbage_channel_is_an_error() {
        assert!(load(&[("DISCORD_TOKEN", "t"), ("FACEIT_API_KEY", "k"), ("CHANNEL_ID", "abc")]).is_err());
    }
}
