//! Configuration for document retrieval.
//!
//! All retrieval behaviour is controlled through [`RetrievalConfig`], built
//! via its [`RetrievalConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a config across concurrent retrievals and to diff two
//! runs to understand why their outcomes differ.

use crate::error::DocsendError;
use crate::extract::ExtractionRules;

/// Configuration for a document retrieval.
///
/// Built via [`RetrievalConfig::builder()`] or using
/// [`RetrievalConfig::default()`].
///
/// # Example
/// ```rust
/// use docsend_dl::RetrievalConfig;
///
/// let config = RetrievalConfig::builder()
///     .concurrency(5)
///     .request_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Base URL of the gated viewer. Default: `https://docsend.com`.
    ///
    /// Document landing pages live at `<base_url>/view/<id>`. Overridable so
    /// tests (and self-hosted viewers) can point the pipeline elsewhere.
    pub base_url: String,

    /// `User-Agent` header sent with every request. Default: a desktop
    /// browser string.
    ///
    /// The gate serves its full viewer markup only to browser-looking
    /// clients; a bare library user agent gets a reduced page that the
    /// extraction rules cannot scan.
    pub user_agent: String,

    /// Maximum in-flight requests per fan-out stage. Default: 10.
    ///
    /// Resolution and fetching each issue one request per page. Capping the
    /// fan-out keeps large documents from opening hundreds of sockets at
    /// once against a rate-limited remote. The all-results-or-fail contract
    /// is unaffected by the cap.
    pub concurrency: usize,

    /// Per-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// File-name prefix for the output artifact: `<prefix>-<id>.pdf`.
    /// Default: `Docsend`.
    pub artifact_prefix: String,

    /// Patterns used to scan the gate's markup. Default:
    /// [`ExtractionRules::default()`].
    pub extraction: ExtractionRules,
}

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docsend.com".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            concurrency: 10,
            request_timeout_secs: 30,
            artifact_prefix: "Docsend".to_string(),
            extraction: ExtractionRules::default(),
        }
    }
}

impl RetrievalConfig {
    /// Create a new builder for `RetrievalConfig`.
    pub fn builder() -> RetrievalConfigBuilder {
        RetrievalConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RetrievalConfig`].
#[derive(Debug)]
pub struct RetrievalConfigBuilder {
    config: RetrievalConfig,
}

impl RetrievalConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
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

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs.max(1);
        self
    }

    pub fn artifact_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.artifact_prefix = prefix.into();
        self
    }

    pub fn extraction(mut self, rules: ExtractionRules) -> Self {
        self.config.extraction = rules;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RetrievalConfig, DocsendError> {
        let c = &self.config;
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(DocsendError::InvalidConfig(format!(
                "base_url must be an HTTP/HTTPS URL, got '{}'",
                c.base_url
            )));
        }
        if c.artifact_prefix.is_empty() {
            return Err(DocsendError::InvalidConfig(
                "artifact_prefix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build() {
        let config = RetrievalConfig::builder().build().unwrap();
        assert_eq!(config.base_url, "https://docsend.com");
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.artifact_prefix, "Docsend");
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let config = RetrievalConfig::builder()
            .base_url("http://127.0.0.1:8080/")
            .build()
            .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn concurrency_clamped_to_one() {
        let config = RetrievalConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn non_http_base_url_rejected() {
        let err = RetrievalConfig::builder()
            .base_url("ftp://example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, DocsendError::InvalidConfig(_)));
    }
}
