// src/lookup.rs
use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::error::{RevLookupError, RevLookupResult};
use crate::proxy::ProxyDescriptor;
use crate::utils::backoff::jittered;
use crate::utils::http::HttpClient;

/// The service reports its result count as free-text metadata; this is the
/// de facto parsing contract.
static ENTRY_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r";Entries: \d+/(\d+)").expect("entry count pattern compiles")
});

/// Definitive empty-result marker. Wins over any count embedded elsewhere
/// in the body.
const NO_RESULT_MARKER: &str = "We could not find any subdomains for the given domain";

/// What one response body tells us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountReply {
    /// The service definitively found nothing.
    Empty,
    /// Total number of entries available for download.
    Total(u64),
    /// Neither marker nor count present; worth another attempt.
    Unparseable,
}

pub fn parse_count_reply(body: &str) -> CountReply {
    if body.contains(NO_RESULT_MARKER) {
        return CountReply::Empty;
    }
    if let Some(captures) = ENTRY_COUNT_RE.captures(body) {
        if let Ok(total) = captures[1].parse::<u64>() {
            return CountReply::Total(total);
        }
    }
    CountReply::Unparseable
}

/// Count-only queries against the lookup service.
pub struct LookupClient {
    config: Arc<RunConfig>,
}

impl LookupClient {
    pub fn new(config: Arc<RunConfig>) -> Self {
        Self { config }
    }

    /// Reverse-IP lookup: how many domains the service knows for this
    /// address. `None` means "nothing there" or "gave up".
    pub async fn ip_count(&self, ip: &str, route: &ProxyDescriptor) -> Option<u64> {
        let url = format!("{}/{}", self.config.base_url, ip);
        self.count(&url, route).await
    }

    /// Subdomain enumeration count for a domain.
    pub async fn domain_count(&self, domain: &str, route: &ProxyDescriptor) -> Option<u64> {
        let url = format!("{}/sb/{}", self.config.base_url, domain);
        self.count(&url, route).await
    }

    async fn count(&self, url: &str, route: &ProxyDescriptor) -> Option<u64> {
        let timing = &self.config.timing;
        let attempts = timing.max_retries + 1;

        for attempt in 1..=attempts {
            match self.fetch(url, route).await {
                Ok(body) => match parse_count_reply(&body) {
                    CountReply::Empty => {
                        debug!("No results reported for {}", url);
                        return None;
                    }
                    CountReply::Total(total) => return Some(total),
                    CountReply::Unparseable => {
                        debug!("Unparseable count reply from {} (attempt {}/{})", url, attempt, attempts);
                    }
                },
                Err(e) => {
                    warn!("Lookup attempt {}/{} for {} failed: {}", attempt, attempts, url, e);
                }
            }

            if attempt < attempts {
                sleep(jittered(timing.retry_backoff_secs)).await;
            }
        }

        None
    }

    async fn fetch(&self, url: &str, route: &ProxyDescriptor) -> RevLookupResult<String> {
        let timeout = Duration::from_secs(self.config.timing.lookup_timeout_secs);
        let client = HttpClient::new(&self.config.user_agent, timeout, route)
            .map_err(|e| RevLookupError::NetworkError(e.to_string()))?;

        // The service embeds its status in the body even on error pages;
        // let the parse decide instead of keying on the status code.
        let response = client.get(url).await
            .map_err(|e| RevLookupError::NetworkError(e.to_string()))?;
        response.text().await
            .map_err(|e| RevLookupError::NetworkError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_count_regex_extracts_the_total() {
        assert_eq!(parse_count_reply(";Entries: 12/345"), CountReply::Total(345));
        assert_eq!(
            parse_count_reply("header junk\n;Entries: 0/7\ntrailer"),
            CountReply::Total(7)
        );
    }

    #[test]
    fn first_count_wins_when_several_are_embedded() {
        let body = ";Entries: 1/10\n;Entries: 2/20";
        assert_eq!(parse_count_reply(body), CountReply::Total(10));
    }

    #[test]
    fn no_result_marker_beats_an_embedded_count() {
        let body = format!("{}\n;Entries: 12/345", NO_RESULT_MARKER);
        assert_eq!(parse_count_reply(&body), CountReply::Empty);
    }

    #[test]
    fn anything_else_is_unparseable() {
        assert_eq!(parse_count_reply(""), CountReply::Unparseable);
        assert_eq!(parse_count_reply("<html>502</html>"), CountReply::Unparseable);
        assert_eq!(parse_count_reply("Entries: 12/345"), CountReply::Unparseable);
    }
}
