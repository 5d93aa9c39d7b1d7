//! Base HTTP client for the daemon's JSON endpoints.
//!
//! Provides `get()` and `post()` for raw JSON endpoints with optional Basic
//! auth and a hard request timeout. Every call makes exactly one HTTP
//! request; failures are returned to the caller, never retried here.

use crate::error::RpcError;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Configuration for an RPC client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Base URL (e.g., `http://localhost:11898`).
    pub url: String,
    /// Optional username for Basic auth.
    pub username: Option<String>,
    /// Optional password for Basic auth.
    pub password: Option<String>,
    /// Hard per-request timeout.
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11898".to_string(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Async HTTP client for the daemon's JSON endpoints.
pub struct RpcClient {
    client: reqwest::Client,
    config: RpcConfig,
    request_count: AtomicU64,
}

impl RpcClient {
    /// Create a new client with the given URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Self::with_config(RpcConfig {
            url: url.to_string(),
            ..Default::default()
        })
    }

    /// Create a new client with full configuration.
    pub fn with_config(mut config: RpcConfig) -> Result<Self, RpcError> {
        config.url = config.url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| RpcError::Other(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            request_count: AtomicU64::new(0),
        })
    }

    /// Get the configured base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Number of HTTP requests issued so far.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    fn auth_header(&self) -> Option<HeaderValue> {
        match (&self.config.username, &self.config.password) {
            (Some(user), Some(pass)) => {
                let creds = format!("{}:{}", user, pass);
                let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
                HeaderValue::from_str(&format!("Basic {}", encoded)).ok()
            }
            _ => None,
        }
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(auth) = self.auth_header() {
            headers.insert(AUTHORIZATION, auth);
        }
        headers
    }

    /// GET a JSON endpoint.
    pub async fn get(&self, endpoint: &str) -> Result<Value, RpcError> {
        let url = format!("{}{}", self.config.url, endpoint);
        self.request_count.fetch_add(1, Ordering::Relaxed);
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .headers(self.build_headers())
            .send()
            .await
            .map_err(|e| RpcError::from_reqwest(endpoint, &url, e))?;

        Self::read_json(resp, endpoint, &url).await
    }

    /// POST JSON to an endpoint.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, RpcError> {
        let url = format!("{}{}", self.config.url, endpoint);
        self.request_count.fetch_add(1, Ordering::Relaxed);
        log::debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .headers(self.build_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| RpcError::from_reqwest(endpoint, &url, e))?;

        Self::read_json(resp, endpoint, &url).await
    }

    async fn read_json(
        resp: reqwest::Response,
        endpoint: &str,
        url: &str,
    ) -> Result<Value, RpcError> {
        let status = resp.status().as_u16();

        if status == 401 {
            return Err(RpcError::AuthFailed { url: url.to_string() });
        }

        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::HttpStatus {
                endpoint: endpoint.to_string(),
                status,
                body: body.chars().take(500).collect(),
            });
        }

        resp.json()
            .await
            .map_err(|e| RpcError::from_reqwest(endpoint, url, e))
    }

    /// Simple connectivity check (GET /info).
    pub async fn is_connected(&self) -> bool {
        self.get("/info").await.is_ok()
    }
}
