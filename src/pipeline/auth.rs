//! Gate authentication: one challenge/response POST against the landing URL.
//!
//! Missing credentials are detected locally, before any network call, so a
//! batch run never spends a round trip on a document it cannot open. When
//! neither requirement flag is set the stage is a no-op pass-through.
//!
//! Success means: a success or redirect status AND no rejection marker in the
//! body. The gate answers a failed login with HTTP 200 plus an inline error
//! message, so the status alone is not enough.

use crate::config::RetrievalConfig;
use crate::error::{CredentialKind, DocsendError};
use crate::session::DocumentSession;
use tracing::{info, warn};

/// Fail fast if the gate demands a credential the caller did not supply.
///
/// Passcode is checked first: a passcode-gated document always also shows the
/// email field, and asking for the rarer credential produces the more useful
/// report.
pub fn ensure_credentials(
    session: &DocumentSession,
    email: Option<&str>,
    passcode: Option<&str>,
) -> Result<(), DocsendError> {
    if session.requires_passcode && passcode.is_none() {
        return Err(DocsendError::CredentialsRequired {
            doc_id: session.document_id.clone(),
            kind: CredentialKind::Passcode,
        });
    }
    if session.requires_email && email.is_none() {
        return Err(DocsendError::CredentialsRequired {
            doc_id: session.document_id.clone(),
            kind: CredentialKind::Email,
        });
    }
    Ok(())
}

/// Run the gate's challenge/response exchange for `session`.
///
/// On success the response's `Set-Cookie` state has landed in the session's
/// cookie store, which every subsequent stage reuses. The one-time form token
/// is consumed by this call regardless of outcome.
pub async fn authenticate(
    session: &mut DocumentSession,
    email: Option<&str>,
    passcode: Option<&str>,
    config: &RetrievalConfig,
) -> Result<(), DocsendError> {
    ensure_credentials(session, email, passcode)?;
    if !session.requires_auth() {
        return Ok(());
    }

    let token = session
        .auth_token
        .take()
        .ok_or_else(|| DocsendError::AuthTokenMissing {
            doc_id: session.document_id.clone(),
        })?;

    let mut form: Vec<(&str, String)> = vec![
        ("utf8", "\u{2713}".to_string()),
        ("_method", "patch".to_string()),
        ("authenticity_token", token),
        ("visitor[email]", email.unwrap_or_default().to_string()),
        ("commit", "Continue".to_string()),
    ];
    if let Some(code) = passcode {
        form.push(("visitor[passcode]", code.to_string()));
    }

    info!("Authenticating against {}", session.source_url);
    let response = session
        .http
        .post(&session.source_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| DocsendError::AuthRequestFailed {
            reason: e.to_string(),
        })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DocsendError::AuthRequestFailed {
            reason: format!("reading authentication response: {e}"),
        })?;

    let accepted = (status.is_success() || status.is_redirection())
        && !config.extraction.is_rejection(&body);
    if !accepted {
        warn!(
            "Gate rejected credentials for '{}' (HTTP {})",
            session.document_id, status
        );
        return Err(DocsendError::AuthenticationRejected {
            status: status.as_u16(),
        });
    }

    Ok(())
}
