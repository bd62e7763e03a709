//! Error types for the docsend-dl library.
//!
//! The taxonomy follows the retrieval pipeline one stage at a time. Every
//! stage is atomic: it either fully succeeds or reports exactly one failure,
//! so a partial artifact is never surfaced to the caller. Each variant carries
//! the context a batch caller needs — document id, page index, HTTP status —
//! to report the failure without aborting sibling retrievals.

use thiserror::Error;

/// Which credential the gate demands but the caller did not supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Email,
    Passcode,
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialKind::Email => write!(f, "an email address"),
            CredentialKind::Passcode => write!(f, "a passcode"),
        }
    }
}

/// All errors returned by the docsend-dl library.
#[derive(Debug, Error)]
pub enum DocsendError {
    // ── Probe errors ──────────────────────────────────────────────────────
    /// The landing page answered with a non-success status; the document id
    /// is unknown to the remote or the document was removed.
    #[error("document '{doc_id}' does not exist or its landing page is gone")]
    UnknownDocument { doc_id: String },

    /// The landing-page request failed before a response was received.
    #[error("probe request for '{doc_id}' failed: {reason}")]
    ProbeFailed { doc_id: String, reason: String },

    // ── Authentication errors ─────────────────────────────────────────────
    /// The gate requires a credential the caller did not supply.
    ///
    /// Detected locally, before any authentication network call.
    #[error("document '{doc_id}' requires {kind} to access")]
    CredentialsRequired {
        doc_id: String,
        kind: CredentialKind,
    },

    /// Credentials were submitted but the gate rejected them.
    #[error("the gate rejected the supplied credentials (HTTP {status})")]
    AuthenticationRejected { status: u16 },

    /// The authentication request failed before a response was received.
    #[error("authentication request failed: {reason}")]
    AuthRequestFailed { reason: String },

    /// The landing page carried no one-time form token, so the
    /// challenge/response exchange cannot be attempted.
    #[error("no authenticity token found on the landing page of '{doc_id}'")]
    AuthTokenMissing { doc_id: String },

    // ── Resolution / fetch errors ─────────────────────────────────────────
    /// The landing page did not reveal how many pages the document has.
    #[error("page count for '{doc_id}' could not be discovered")]
    PageCountUnknown { doc_id: String },

    /// One per-page metadata request failed; the whole resolution stage
    /// fails with the lowest failing page index.
    #[error("failed to resolve the asset location for page {page}: {reason}")]
    PageResolutionFailed { page: usize, reason: String },

    /// One page-image download failed; the whole fetch stage fails with the
    /// lowest failing page index once every sibling request has settled.
    #[error("failed to fetch the image for page {page}: {reason}")]
    PageFetchFailed { page: usize, reason: String },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// A fetched page's bytes could not be decoded into an image.
    #[error("failed to decode the image for page {page}: {reason}")]
    AssemblyFailed { page: usize, reason: String },

    /// The page sink failed while encoding the output artifact.
    #[error(transparent)]
    Sink(#[from] crate::sink::SinkError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_required_display() {
        let e = DocsendError::CredentialsRequired {
            doc_id: "abc123".into(),
            kind: CredentialKind::Passcode,
        };
        let msg = e.to_string();
        assert!(msg.contains("abc123"), "got: {msg}");
        assert!(msg.contains("passcode"), "got: {msg}");
    }

    #[test]
    fn page_fetch_failed_display() {
        let e = DocsendError::PageFetchFailed {
            page: 3,
            reason: "HTTP 500".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("HTTP 500"));
    }

    #[test]
    fn authentication_rejected_display() {
        let e = DocsendError::AuthenticationRejected { status: 200 };
        assert!(e.to_string().contains("200"));
    }

    #[test]
    fn credential_kind_serialises_lowercase() {
        assert_eq!(
            serde_json::to_string(&CredentialKind::Email).unwrap(),
            "\"email\""
        );
    }
}
