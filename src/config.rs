use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

/// Which backend wire shape to talk to. The simulator has gone through
/// several incompatible revisions; each one gets its own adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendFlavor {
    Consolidated,
    Legacy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub flavor: BackendFlavor,
    pub base_url: String,
    pub http_timeout_seconds: u64,
}

impl BackendConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            flavor: BackendFlavor::Consolidated,
            base_url: "http://localhost:8080/api".to_string(),
            http_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Fast loop: all dashboard resources.
    pub interval_ms: u64,
    /// Slow loop: the optimal charging window.
    pub window_interval_ms: u64,
    /// Delay before the re-poll that follows a successful command.
    pub command_refresh_delay_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1_000,
            window_interval_ms: 5_000,
            command_refresh_delay_ms: 1_000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("LADDSTATION__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_consolidated_api() {
        let cfg = BackendConfig::default();
        assert_eq!(cfg.flavor, BackendFlavor::Consolidated);
        assert_eq!(cfg.base_url, "http://localhost:8080/api");
        assert_eq!(cfg.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn poll_defaults_match_panel_refresh_rates() {
        let cfg = PollConfig::default();
        assert_eq!(cfg.interval_ms, 1_000);
        assert_eq!(cfg.window_interval_ms, 5_000);
        assert_eq!(cfg.command_refresh_delay_ms, 1_000);
    }

    #[test]
    fn flavor_parses_from_lowercase() {
        let flavor: BackendFlavor = serde_json::from_str("\"legacy\"").unwrap();
        assert_eq!(flavor, BackendFlavor::Legacy);
    }
}
