// src/config.rs
use std::path::Path;
use serde::{Serialize, Deserialize};
use tokio::fs;
use tracing::{info, debug};

use crate::error::{RevLookupError, RevLookupResult};
use crate::proxy::ProxyDescriptor;

/// Run configuration. Every field has a default reproducing the tool's
/// stock behavior, so the config file and all of its sections are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Upstream proxy addresses (`user:pass@host:port`). Empty means
    /// direct egress.
    #[serde(default)]
    pub proxies: Vec<String>,

    #[serde(default)]
    pub timing: TimingConfig,
}

/// Timeouts, retry bounds, and the randomized delay windows (seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,

    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// Additional attempts after the first, per client call.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: [f64; 2],

    /// Pause after every lookup, whatever its outcome.
    #[serde(default = "default_lookup_pause")]
    pub lookup_pause_secs: [f64; 2],

    /// Pause between finishing one target and dequeuing the next.
    #[serde(default = "default_target_pause")]
    pub target_pause_secs: [f64; 2],
}

fn default_base_url() -> String {
    "https://ip.thc.org".to_string()
}

fn default_user_agent() -> String {
    format!("revlookup/{}", env!("CARGO_PKG_VERSION"))
}

fn default_lookup_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    45
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff() -> [f64; 2] {
    [2.0, 5.0]
}

fn default_lookup_pause() -> [f64; 2] {
    [2.0, 4.0]
}

fn default_target_pause() -> [f64; 2] {
    [2.0, 5.0]
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            proxies: Vec::new(),
            timing: TimingConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_secs: default_lookup_timeout(),
            download_timeout_secs: default_download_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_secs: default_retry_backoff(),
            lookup_pause_secs: default_lookup_pause(),
            target_pause_secs: default_target_pause(),
        }
    }
}

impl RunConfig {
    /// Load configuration from an optional TOML file, falling back to the
    /// built-in defaults when no path is given.
    pub async fn load(path: Option<&Path>) -> RevLookupResult<Self> {
        let path = match path {
            Some(path) => path,
            None => {
                debug!("No config file given, using defaults");
                return Ok(Self::default());
            }
        };

        let content = fs::read_to_string(path).await
            .map_err(|e| RevLookupError::FileError {
                path: path.to_path_buf(),
                message: format!("Failed to read config file: {}", e),
            })?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| RevLookupError::ConfigError(
                format!("Failed to parse {}: {}", path.display(), e)
            ))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Prepend proxies given on the command line ahead of the configured
    /// list.
    pub fn add_proxies(&mut self, proxies: &[String]) {
        if proxies.is_empty() {
            return;
        }
        let mut merged = proxies.to_vec();
        merged.extend(self.proxies.drain(..));
        self.proxies = merged;
    }

    /// Build the proxy pool contents. An empty proxy list yields a single
    /// direct-egress descriptor so the pool is never empty by default.
    pub fn proxy_descriptors(&self) -> Vec<ProxyDescriptor> {
        if self.proxies.is_empty() {
            vec![ProxyDescriptor::direct()]
        } else {
            self.proxies.iter().map(|address| ProxyDescriptor::upstream(address)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_behavior() {
        let config = RunConfig::default();

        assert_eq!(config.base_url, "https://ip.thc.org");
        assert_eq!(config.timing.lookup_timeout_secs, 30);
        assert_eq!(config.timing.download_timeout_secs, 45);
        assert_eq!(config.timing.max_retries, 2);
        assert_eq!(config.timing.retry_backoff_secs, [2.0, 5.0]);
        assert_eq!(config.timing.lookup_pause_secs, [2.0, 4.0]);
        assert_eq!(config.timing.target_pause_secs, [2.0, 5.0]);
        assert!(config.proxies.is_empty());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config: RunConfig = toml::from_str(
            "proxies = [\"user:pass@gw.example.net:823\"]\n\
             [timing]\n\
             max_retries = 5\n"
        ).unwrap();

        assert_eq!(config.proxies.len(), 1);
        assert_eq!(config.timing.max_retries, 5);
        assert_eq!(config.timing.lookup_timeout_secs, 30);
        assert_eq!(config.base_url, "https://ip.thc.org");
    }

    #[test]
    fn cli_proxies_go_ahead_of_configured_ones() {
        let mut config = RunConfig {
            proxies: vec!["configured@host:1".to_string()],
            ..RunConfig::default()
        };
        config.add_proxies(&["cli@host:2".to_string()]);

        assert_eq!(config.proxies, vec!["cli@host:2", "configured@host:1"]);
    }

    #[test]
    fn empty_proxy_list_falls_back_to_direct() {
        let config = RunConfig::default();
        let descriptors = config.proxy_descriptors();

        assert_eq!(descriptors.len(), 1);
        assert!(descriptors[0].is_direct());
    }
}
