//! Access probe: fetch the document's landing state.
//!
//! One read request to the derived landing URL, then a text scan via
//! [`crate::extract::ExtractionRules`]. A non-success status yields an
//! invalid session (the document id is unknown to the remote); a transport
//! failure is a [`DocsendError::ProbeFailed`]; a successful-but-unparsable
//! body yields a session with `None` fields rather than an error.
//!
//! The client built here owns a fresh cookie store — the session's credential
//! context. The landing response's `Set-Cookie` state lands in it and is
//! reused by every later stage.

use crate::config::RetrievalConfig;
use crate::error::DocsendError;
use crate::session::{self, DocumentSession};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Build the per-retrieval HTTP client carrying the cookie store.
pub(crate) fn build_client(config: &RetrievalConfig) -> Result<Client, DocsendError> {
    Client::builder()
        .user_agent(&config.user_agent)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .map_err(|e| DocsendError::Internal(format!("failed to build HTTP client: {e}")))
}

/// Probe the landing page of `document_id` and produce a [`DocumentSession`].
///
/// # Errors
/// [`DocsendError::ProbeFailed`] if the request could not complete at all.
/// An unknown or removed document is not an error here: it comes back as a
/// session with `valid = false`.
pub async fn probe(
    document_id: &str,
    config: &RetrievalConfig,
) -> Result<DocumentSession, DocsendError> {
    let source_url = session::source_url(&config.base_url, document_id);
    let http = build_client(config)?;

    debug!("Probing {}", source_url);
    let response = http
        .get(&source_url)
        .send()
        .await
        .map_err(|e| DocsendError::ProbeFailed {
            doc_id: document_id.to_string(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        info!(
            "Landing page for '{}' answered HTTP {}",
            document_id, status
        );
        return Ok(DocumentSession::invalid(document_id, source_url, http));
    }

    let html = response
        .text()
        .await
        .map_err(|e| DocsendError::ProbeFailed {
            doc_id: document_id.to_string(),
            reason: format!("reading landing page body: {e}"),
        })?;

    let facts = config.extraction.scan(&html);
    debug!(
        "Landing facts for '{}': email={} passcode={} pages={:?} token={}",
        document_id,
        facts.requires_email,
        facts.requires_passcode,
        facts.page_count,
        facts.auth_token.is_some(),
    );

    Ok(DocumentSession {
        document_id: document_id.to_string(),
        source_url,
        requires_email: facts.requires_email,
        requires_passcode: facts.requires_passcode,
        page_count: facts.page_count,
        auth_token: facts.auth_token,
        valid: true,
        http,
    })
}
