//! Per-retrieval session state.
//!
//! A [`DocumentSession`] identifies one retrieval attempt. It is created once
//! by the probe, mutated once by the authenticator (when the gate demands
//! credentials), and read-only afterwards. The credential context is the
//! cookie store inside the session's HTTP client: probe and authentication
//! responses deposit cookies there, and every later request reuses them.
//! Sessions are scoped to one retrieval; the cookies they carry are live
//! credentials and must not outlive it.

use reqwest::Client;
use std::fmt;

/// State of one retrieval attempt against the gated viewer.
pub struct DocumentSession {
    /// Opaque remote identifier. Immutable.
    pub document_id: String,
    /// Landing URL, derived deterministically from the id. Immutable.
    pub source_url: String,
    /// `true` iff the landing page carries an email field.
    pub requires_email: bool,
    /// `true` iff the landing page carries a passcode field.
    pub requires_passcode: bool,
    /// Retrievable page count, or `None` if undiscoverable.
    pub page_count: Option<usize>,
    /// One-time form token scraped from the landing page; consumed exactly
    /// once by the authenticator.
    pub auth_token: Option<String>,
    /// `false` if the landing page itself could not be fetched; downstream
    /// stages must short-circuit.
    pub valid: bool,
    /// HTTP client whose cookie store is the session's credential context.
    pub(crate) http: Client,
}

impl DocumentSession {
    /// A session for a document whose landing page answered non-success.
    pub(crate) fn invalid(document_id: &str, source_url: String, http: Client) -> Self {
        Self {
            document_id: document_id.to_string(),
            source_url,
            requires_email: false,
            requires_passcode: false,
            page_count: None,
            auth_token: None,
            valid: false,
            http,
        }
    }

    /// Whether the gate demands a challenge/response exchange at all.
    pub fn requires_auth(&self) -> bool {
        self.requires_email || self.requires_passcode
    }
}

impl fmt::Debug for DocumentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSession")
            .field("document_id", &self.document_id)
            .field("source_url", &self.source_url)
            .field("requires_email", &self.requires_email)
            .field("requires_passcode", &self.requires_passcode)
            .field("page_count", &self.page_count)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<token>"))
            .field("valid", &self.valid)
            .field("http", &"<cookie-backed client>")
            .finish()
    }
}

/// One resolved page asset: where the rendered image for `page` lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    /// 1-based page index, dense and contiguous over `[1, page_count]`.
    pub page: usize,
    /// Resolved fetch target for the page's rendered image.
    pub url: String,
}

/// One fetched page asset.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page index.
    pub page: usize,
    /// Raw image payload as served by the remote.
    pub bytes: Vec<u8>,
}

/// Derive the landing URL for a document id.
pub fn source_url(base_url: &str, document_id: &str) -> String {
    format!("{}/view/{}", base_url.trim_end_matches('/'), document_id)
}

/// Extract a document id from a full viewer URL, if the URL has the
/// `…/view/<id>` shape.
pub fn document_id_from_url(input: &str) -> Option<String> {
    let parsed = url::Url::parse(input).ok()?;
    let mut segments = parsed.path_segments()?;
    while let Some(segment) = segments.next() {
        if segment == "view" {
            return segments
                .next()
                .filter(|id| !id.is_empty())
                .map(str::to_string);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_url_derivation() {
        assert_eq!(
            source_url("https://docsend.com", "abc123"),
            "https://docsend.com/view/abc123"
        );
        assert_eq!(
            source_url("http://127.0.0.1:8080/", "abc123"),
            "http://127.0.0.1:8080/view/abc123"
        );
    }

    #[test]
    fn document_id_from_view_url() {
        assert_eq!(
            document_id_from_url("https://docsend.com/view/abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            document_id_from_url("https://docsend.com/view/abc123?x=1"),
            Some("abc123".to_string())
        );
        assert_eq!(document_id_from_url("https://docsend.com/about"), None);
        assert_eq!(document_id_from_url("not a url"), None);
        assert_eq!(document_id_from_url("https://docsend.com/view/"), None);
    }

    #[test]
    fn invalid_session_short_circuits() {
        let session = DocumentSession::invalid(
            "gone",
            "https://docsend.com/view/gone".into(),
            Client::new(),
        );
        assert!(!session.valid);
        assert!(!session.requires_auth());
        assert_eq!(session.page_count, None);
    }

    #[test]
    fn debug_redacts_token() {
        let mut session = DocumentSession::invalid(
            "abc",
            "https://docsend.com/view/abc".into(),
            Client::new(),
        );
        session.auth_token = Some("secret-token".into());
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret-token"), "got: {rendered}");
    }
}
