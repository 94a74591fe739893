// src/download.rs
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::error::{RevLookupError, RevLookupResult};
use crate::output::OutputFile;
use crate::proxy::ProxyDescriptor;
use crate::utils::backoff::jittered;
use crate::utils::http::HttpClient;

/// Paginated full-result retrieval, using the count from the lookup step
/// as the page limit.
pub struct DownloadClient {
    config: Arc<RunConfig>,
}

impl DownloadClient {
    pub fn new(config: Arc<RunConfig>) -> Self {
        Self { config }
    }

    /// Fetch and store reverse-IP results. `Ok(false)` means the service
    /// could not be made to answer; an `Err` is an output-file failure.
    pub async fn ip_results(
        &self,
        ip: &str,
        limit: u64,
        route: &ProxyDescriptor,
        output: &OutputFile,
    ) -> RevLookupResult<bool> {
        let url = format!(
            "{}/api/v1/download?ip_address={}&limit={}&hide_header=true",
            self.config.base_url, ip, limit
        );
        self.download(&url, route, output).await
    }

    /// Fetch and store subdomain-enumeration results for a domain.
    pub async fn domain_results(
        &self,
        domain: &str,
        limit: u64,
        route: &ProxyDescriptor,
        output: &OutputFile,
    ) -> RevLookupResult<bool> {
        let url = format!(
            "{}/api/v1/subdomains/download?domain={}&limit={}&hide_header=true",
            self.config.base_url, domain, limit
        );
        self.download(&url, route, output).await
    }

    async fn download(
        &self,
        url: &str,
        route: &ProxyDescriptor,
        output: &OutputFile,
    ) -> RevLookupResult<bool> {
        let timing = &self.config.timing;
        let attempts = timing.max_retries + 1;

        for attempt in 1..=attempts {
            match self.fetch(url, route).await {
                Ok(Some(body)) => {
                    let domains = extract_domains(&body);
                    debug!("Extracted {} domains from {}", domains.len(), url);
                    if !domains.is_empty() {
                        // Already-flushed lines stay in the file even if a
                        // later attempt for another target fails.
                        output.append_lines(&domains).await?;
                    }
                    return Ok(true);
                }
                Ok(None) => {
                    warn!("Download attempt {}/{} for {} rejected by service", attempt, attempts, url);
                }
                Err(e) => {
                    warn!("Download attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                }
            }

            if attempt < attempts {
                sleep(jittered(timing.retry_backoff_secs)).await;
            }
        }

        Ok(false)
    }

    /// `Ok(Some(body))` on HTTP 200, `Ok(None)` on any other status.
    async fn fetch(&self, url: &str, route: &ProxyDescriptor) -> RevLookupResult<Option<String>> {
        let timeout = Duration::from_secs(self.config.timing.download_timeout_secs);
        let client = HttpClient::new(&self.config.user_agent, timeout, route)
            .map_err(|e| RevLookupError::NetworkError(e.to_string()))?;

        let response = client.get(url).await
            .map_err(|e| RevLookupError::NetworkError(e.to_string()))?;
        if response.status() != reqwest::StatusCode::OK {
            return Ok(None);
        }

        let body = response.text().await
            .map_err(|e| RevLookupError::NetworkError(e.to_string()))?;
        Ok(Some(body))
    }
}

/// Pull candidate domains out of a download body. Records are one per
/// line, optionally comma-separated with the domain in the first field.
pub fn extract_domains(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut domains = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let candidate = match line.split(',').next() {
            Some(field) => field.trim(),
            None => continue,
        };
        if candidate.is_empty() {
            continue;
        }
        if !candidate.contains('.')
            || candidate.starts_with("http")
            || candidate.chars().any(char::is_whitespace)
        {
            continue;
        }

        let candidate = candidate.trim_matches('"').trim_matches('\'');
        if seen.insert(candidate.to_string()) {
            domains.push(candidate.to_string());
        }
    }

    domains
}
