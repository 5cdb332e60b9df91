//! Network access behind a trait.
//!
//! The pipeline needs exactly two kinds of request: a full GET that returns
//! the body (landing page, slide images) and a metadata-only existence check
//! (slide-count probing). [`Transport`] captures both so the extractor,
//! prober and fetcher can be driven by an in-memory fake in tests, and so
//! library callers can add their own middleware (caching, rate limiting).
//!
//! [`HttpTransport`] is the real implementation. One instance is built per
//! run from [`DownloadConfig`]; its `reqwest::Client` carries the
//! browser-like `User-Agent` and is dropped when the run ends.

use crate::config::DownloadConfig;
use crate::error::{DeckError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Minimal HTTP surface used by the pipeline.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and return the full response body.
    ///
    /// Non-success statuses are errors.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;

    /// Check whether `url` exists without transferring its body.
    ///
    /// `Ok(false)` means the server answered with a non-success status.
    async fn exists(&self, url: &str) -> Result<bool, TransportError>;
}

/// `reqwest`-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    fetch_timeout: Duration,
    probe_timeout: Duration,
}

impl HttpTransport {
    /// Build a client with the config's user agent and timeouts.
    pub fn new(config: &DownloadConfig) -> Result<Self, DeckError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DeckError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
        })
    }

    fn map_error(url: &str, timeout: Duration, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            }
        } else {
            TransportError::Connection {
                url: url.to_string(),
                detail: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(url, self.fetch_timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(url, self.fetch_timeout, e))?;
        debug!("GET {} → {} bytes", url, bytes.len());
        Ok(bytes.to_vec())
    }

    async fn exists(&self, url: &str) -> Result<bool, TransportError> {
        let response = self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| Self::map_error(url, self.probe_timeout, e))?;

        debug!("HEAD {} → {}", url, response.status());
        Ok(response.status().is_success())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeTransport;
    use super::*;

    #[test]
    fn http_transport_builds_from_default_config() {
        let transport = HttpTransport::new(&DownloadConfig::default()).expect("client builds");
        assert_eq!(transport.fetch_timeout, Duration::from_secs(30));
        assert_eq!(transport.probe_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn fake_transport_serves_registered_bodies() {
        let t = FakeTransport::new().with_body("http://h/a", b"hello".to_vec());
        assert_eq!(t.fetch("http://h/a").await.unwrap(), b"hello");
        assert!(t.exists("http://h/a").await.unwrap());
        assert!(!t.exists("http://h/b").await.unwrap());
        assert_eq!(
            t.fetch("http://h/b").await.unwrap_err(),
            TransportError::Status {
                url: "http://h/b".into(),
                status: 404
            }
        );
        assert_eq!(t.fetch_count(), 2);
        assert_eq!(t.probe_count(), 2);
    }

    #[tokio::test]
    async fn fake_transport_flaky_recovers() {
        let t = FakeTransport::new()
            .with_body("http://h/a", b"ok".to_vec())
            .with_flaky("http://h/a", 1);
        assert!(t.fetch("http://h/a").await.is_err());
        assert!(t.fetch("http://h/a").await.is_ok());
    }
}
