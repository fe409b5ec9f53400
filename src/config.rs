//! Client configuration.
//!
//! `ClientConfig` holds the API base URL, the progress channel URL and the
//! request timeout. The binary fills it from CLI flags / environment; library
//! users start from `ClientConfig::default()` or `ClientConfig::new(server)`.

use std::time::Duration;

use reqwest::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_SERVER: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Raw WebSocket transport of the backend's `/ws` SockJS endpoint.
const PROGRESS_PATH: &str = "/ws/websocket";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Every API path is appended to this URL's path; its query is kept
    pub base_url: Url,
    pub progress_url: Url,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER).expect("DEFAULT_SERVER is a valid http URL")
    }
}

impl ClientConfig {
    /// Config for `server`, deriving the progress URL from it.
    pub fn new(server: &str) -> Result<Self> {
        let base_url = parse_base_url(server)?;
        let progress_url = derive_progress_url(&base_url)?;
        Ok(Self {
            base_url,
            progress_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn with_progress_url(mut self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url.trim())
            .map_err(|e| ClientError::Config(format!("invalid progress URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "ws" | "wss") || parsed.host_str().is_none() {
            return Err(ClientError::Config(format!(
                "progress URL must use ws:// or wss://: {}",
                url
            )));
        }
        self.progress_url = parsed;
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `path` (e.g. `/filesystem/home`) appended to the base path.
    pub fn url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }
}

fn parse_base_url(server: &str) -> Result<Url> {
    let mut url = Url::parse(server.trim())
        .map_err(|e| ClientError::Config(format!("invalid server URL {}: {}", server, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ClientError::Config(format!(
            "server URL must use http:// or https://: {}",
            server
        )));
    }
    url.set_fragment(None);
    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}

/// `http://host:port/api?x` → `ws://host:port/ws/websocket`
fn derive_progress_url(base_url: &Url) -> Result<Url> {
    let scheme = if base_url.scheme() == "https" { "wss" } else { "ws" };
    let mut url = base_url.clone();
    url.set_scheme(scheme)
        .map_err(|_| ClientError::Config(format!("cannot derive progress URL from {}", base_url)))?;
    url.set_path(PROGRESS_PATH);
    url.set_query(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:8080/api");
        assert_eq!(config.progress_url.as_str(), "ws://localhost:8080/ws/websocket");
        assert_eq!(
            config.url("/filesystem/home").as_str(),
            "http://localhost:8080/api/filesystem/home"
        );
    }

    #[test]
    fn test_https_maps_to_wss() {
        let config = ClientConfig::new("https://files.example.org/api/").unwrap();
        assert_eq!(config.base_url.as_str(), "https://files.example.org/api");
        assert_eq!(config.progress_url.as_str(), "wss://files.example.org/ws/websocket");
    }

    #[test]
    fn test_query_stays_after_api_path() {
        let config = ClientConfig::new("http://files.local:8080/api?tenant=a").unwrap();
        assert_eq!(
            config.url("/filesystem/home").as_str(),
            "http://files.local:8080/api/filesystem/home?tenant=a"
        );
        assert_eq!(config.progress_url.as_str(), "ws://files.local:8080/ws/websocket");
    }

    #[test]
    fn test_scheme_case_and_bare_host() {
        let config = ClientConfig::new("HTTP://localhost:8080").unwrap();
        assert_eq!(config.url("/filesystem/roots").as_str(), "http://localhost:8080/filesystem/roots");
        assert_eq!(config.progress_url.as_str(), "ws://localhost:8080/ws/websocket");
    }

    #[test]
    fn test_rejects_non_http_server() {
        assert!(ClientConfig::new("ftp://example.org").is_err());
        assert!(ClientConfig::new("http://").is_err());
        assert!(ClientConfig::new("localhost:8080/api").is_err());
    }

    #[test]
    fn test_progress_override_requires_ws_scheme() {
        let config = ClientConfig::default();
        assert!(config.clone().with_progress_url("http://x/ws").is_err());
        let config = config.with_progress_url("WS://127.0.0.1:9000/ws").unwrap();
        assert_eq!(config.progress_url.as_str(), "ws://127.0.0.1:9000/ws");
    }
}
