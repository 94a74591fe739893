// src/utils/http.rs
use std::time::Duration;
use anyhow::{Result, Context};
use reqwest::{Client, Proxy, Response};
use tracing::debug;

use crate::proxy::ProxyDescriptor;

/// HTTP client for one egress route. The lookup service presents a
/// self-signed certificate, so verification is disabled for it.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client bound to a timeout and an egress route.
    pub fn new(user_agent: &str, timeout: Duration, route: &ProxyDescriptor) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true);

        if let Some(proxy_url) = route.proxy_url() {
            let proxy = Proxy::all(&proxy_url)
                .context("Invalid upstream proxy address")?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);

        self.client
            .get(url)
            .send()
            .await
            .context(format!("Failed to GET {}", url))
    }
}
