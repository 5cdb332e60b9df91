//! Configuration types for a presentation download.
//!
//! All download behaviour is controlled through [`DownloadConfig`], built via
//! its [`DownloadConfigBuilder`]. One config describes one run: the network
//! client is constructed from it at the start of the run and dropped at the
//! end, so two runs never share connection state or headers.

use crate::error::DeckError;
use crate::pipeline::transport::Transport;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Host that serves presentation landing pages.
pub const DEFAULT_SITE_HOST: &str = "speakerdeck.com";

/// Prefix of every slide image URL; `/{identifier}/slide_{index}.jpg` follows.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://files.speakerdeck.com/presentations";

/// Browser-like client identity presented on every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Configuration for a presentation download.
///
/// Built via [`DownloadConfig::builder()`] or using
/// [`DownloadConfig::default()`].
///
/// # Example
/// ```rust
/// use deck2pdf::DownloadConfig;
///
/// let config = DownloadConfig::builder()
///     .output_dir("slides")
///     .max_probe_slides(500)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct DownloadConfig {
    /// Directory that receives `<title-slug>.pdf`. Created if absent. Default: `.`.
    pub output_dir: PathBuf,

    /// Host accepted by URL validation. Default: `speakerdeck.com`.
    pub site_host: String,

    /// Slide image URL prefix. Default: `https://files.speakerdeck.com/presentations`.
    ///
    /// Slide `n` of presentation `id` lives at `{asset_base_url}/{id}/slide_{n}.jpg`.
    pub asset_base_url: String,

    /// Upper bound for slide-count probing. Default: 300.
    ///
    /// Only used when the landing page gives no usable slide count.
    pub max_probe_slides: usize,

    /// Timeout for full GET requests (landing page, slide images). Default: 30 s.
    pub fetch_timeout_secs: u64,

    /// Timeout for HEAD existence probes. Default: 10 s.
    pub probe_timeout_secs: u64,

    /// `User-Agent` header sent on every request.
    pub user_agent: String,

    /// Maximum slide fetches in flight at once. Default: 1 (sequential).
    ///
    /// Pages are always appended in slide-index order regardless of the
    /// order in which fetches complete.
    pub concurrency: usize,

    /// Extra attempts per slide after the first one fails. Default: 0.
    pub max_retries: u32,

    /// Base backoff between slide retries; doubles on each retry. Default: 500 ms.
    pub retry_backoff_ms: u64,

    /// Pre-built transport. When `None` an [`crate::pipeline::transport::HttpTransport`]
    /// is constructed from this config for the duration of the run.
    pub transport: Option<Arc<dyn Transport>>,

    /// Receives per-slide progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            site_host: DEFAULT_SITE_HOST.to_string(),
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
            max_probe_slides: 300,
            fetch_timeout_secs: 30,
            probe_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 1,
            max_retries: 0,
            retry_backoff_ms: 500,
            transport: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("output_dir", &self.output_dir)
            .field("site_host", &self.site_host)
            .field("asset_base_url", &self.asset_base_url)
            .field("max_probe_slides", &self.max_probe_slides)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("concurrency", &self.concurrency)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("transport", &self.transport.as_ref().map(|_| "<dyn Transport>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn DownloadProgressCallback>"),
            )
            .finish()
    }
}

impl DownloadConfig {
    /// Start a builder pre-filled with the defaults.
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DownloadConfig`].
#[derive(Debug)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn site_host(mut self, host: impl Into<String>) -> Self {
        self.config.site_host = host.into();
        self
    }

    pub fn asset_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.asset_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn max_probe_slides(mut self, n: usize) -> Self {
        self.config.max_probe_slides = n;
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn build(self) -> Result<DownloadConfig, DeckError> {
        let c = &self.config;
        if c.max_probe_slides == 0 {
            return Err(DeckError::InvalidConfig(
                "max_probe_slides must be ≥ 1".into(),
            ));
        }
        if c.fetch_timeout_secs == 0 || c.probe_timeout_secs == 0 {
            return Err(DeckError::InvalidConfig(
                "timeouts must be at least one second".into(),
            ));
        }
        if c.site_host.trim().is_empty() {
            return Err(DeckError::InvalidConfig("site_host must not be empty".into()));
        }
        if !(c.asset_base_url.starts_with("http://") || c.asset_base_url.starts_with("https://"))
        {
            return Err(DeckError::InvalidConfig(format!(
                "asset_base_url must be an HTTP/HTTPS URL, got '{}'",
                c.asset_base_url
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = DownloadConfig::default();
        assert_eq!(c.max_probe_slides, 300);
        assert_eq!(c.fetch_timeout_secs, 30);
        assert_eq!(c.probe_timeout_secs, 10);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.max_retries, 0);
        assert_eq!(c.asset_base_url, DEFAULT_ASSET_BASE_URL);
    }

    #[test]
    fn builder_clamps_concurrency() {
        let c = DownloadConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn builder_rejects_zero_probe_bound() {
        let err = DownloadConfig::builder().max_probe_slides(0).build().unwrap_err();
        assert!(matches!(err, DeckError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_non_http_asset_base() {
        let err = DownloadConfig::builder()
            .asset_base_url("ftp://files.example.com/presentations")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp://"), "got: {err}");
    }

    #[test]
    fn asset_base_trailing_slash_is_trimmed() {
        let c = DownloadConfig::builder()
            .asset_base_url("http://127.0.0.1:8080/presentations/")
            .build()
            .unwrap();
        assert_eq!(c.asset_base_url, "http://127.0.0.1:8080/presentations");
    }

    #[test]
    fn debug_hides_trait_objects() {
        let s = format!("{:?}", DownloadConfig::default());
        assert!(s.contains("max_probe_slides"));
        assert!(s.contains("transport: None"));
    }
}
