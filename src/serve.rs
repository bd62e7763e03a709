//! HTTP front end over the retrieval pipeline.
//!
//! Thin plumbing: every route maps onto one library call. The only state the
//! server holds is an expiring cache of probed sessions, so that a metadata
//! lookup immediately followed by a download skips the second landing-page
//! round trip. The cache is an optimisation, never a correctness dependency —
//! a miss probes fresh. Cached sessions hold live credential cookies; entries
//! expire after a short TTL and are removed on first use.
//!
//! Routes:
//! * `GET /documents/{id}/valid`    — quick existence check
//! * `GET /documents/{id}`          — probe and cache the session metadata
//! * `GET /documents/{id}/download?email=&passcode=` — full retrieval,
//!   streamed as a `Content-Disposition` attachment

use crate::config::RetrievalConfig;
use crate::error::{CredentialKind, DocsendError};
use crate::pipeline::probe;
use crate::retrieve::{self, ARTIFACT_CONTENT_TYPE};
use crate::session::DocumentSession;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Build the front-end router.
pub fn router(config: RetrievalConfig, session_ttl: Duration) -> Router {
    let state = Arc::new(ServerState {
        config,
        cache: SessionCache::new(session_ttl),
    });
    Router::new()
        .route("/documents/:id/valid", get(valid))
        .route("/documents/:id", get(metadata))
        .route("/documents/:id/download", get(download))
        .with_state(state)
}

struct ServerState {
    config: RetrievalConfig,
    cache: SessionCache,
}

// ── Session cache ────────────────────────────────────────────────────────

/// Expiring store of probed sessions, keyed by document id.
///
/// Entries carry live credential cookies, so they are short-lived and
/// single-use: `take` removes the entry it returns.
struct SessionCache {
    entries: RwLock<HashMap<String, CachedSession>>,
    ttl: Duration,
}

struct CachedSession {
    session: DocumentSession,
    stored_at: Instant,
}

impl SessionCache {
    fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    async fn put(&self, session: DocumentSession) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, cached| cached.stored_at.elapsed() < self.ttl);
        entries.insert(
            session.document_id.clone(),
            CachedSession {
                session,
                stored_at: Instant::now(),
            },
        );
    }

    async fn take(&self, document_id: &str) -> Option<DocumentSession> {
        let cached = self.entries.write().await.remove(document_id)?;
        if cached.stored_at.elapsed() < self.ttl {
            Some(cached.session)
        } else {
            None
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ValidResponse {
    result: bool,
}

/// Session metadata exposed to clients. Tokens and cookies stay server-side.
#[derive(Serialize)]
struct SessionSummary {
    id: String,
    valid: bool,
    email_required: bool,
    passcode_required: bool,
    page_count: Option<usize>,
}

#[derive(Deserialize)]
struct DownloadParams {
    email: Option<String>,
    passcode: Option<String>,
}

async fn valid(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<ValidResponse>, ApiError> {
    let result = retrieve::check_valid(&id, &state.config).await?;
    Ok(Json(ValidResponse { result }))
}

async fn metadata(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionSummary>, ApiError> {
    let session = probe::probe(&id, &state.config).await?;
    let summary = SessionSummary {
        id: session.document_id.clone(),
        valid: session.valid,
        email_required: session.requires_email,
        passcode_required: session.requires_passcode,
        page_count: session.page_count,
    };
    state.cache.put(session).await;
    Ok(Json(summary))
}

async fn download(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Query(params): Query<DownloadParams>,
) -> Result<Response, ApiError> {
    let mut session = match state.cache.take(&id).await {
        Some(session) => {
            debug!("Reusing cached session for '{}'", id);
            session
        }
        None => probe::probe(&id, &state.config).await?,
    };

    let artifact = retrieve::retrieve_session(
        &mut session,
        params.email.as_deref(),
        params.passcode.as_deref(),
        &state.config,
    )
    .await?;

    let headers = [
        (header::CONTENT_TYPE, ARTIFACT_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ),
    ];
    Ok((headers, artifact.bytes).into_response())
}

// ── Error mapping ────────────────────────────────────────────────────────

/// Wrapper turning a pipeline error into an HTTP response.
///
/// Credential problems are client-actionable (400 with a structured body);
/// upstream trouble is a 502; everything else is a 500.
struct ApiError(DocsendError);

impl From<DocsendError> for ApiError {
    fn from(error: DocsendError) -> Self {
        Self(error)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing: Option<CredentialKind>,
}

fn error_status(error: &DocsendError) -> StatusCode {
    match error {
        DocsendError::CredentialsRequired { .. }
        | DocsendError::AuthenticationRejected { .. } => StatusCode::BAD_REQUEST,
        DocsendError::UnknownDocument { .. } => StatusCode::NOT_FOUND,
        DocsendError::ProbeFailed { .. }
        | DocsendError::AuthRequestFailed { .. }
        | DocsendError::PageResolutionFailed { .. }
        | DocsendError::PageFetchFailed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = error_status(&self.0);
        let missing = match &self.0 {
            DocsendError::CredentialsRequired { kind, .. } => Some(*kind),
            _ => None,
        };
        let body = ErrorBody {
            message: self.0.to_string(),
            missing,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_errors_are_client_actionable() {
        let e = DocsendError::CredentialsRequired {
            doc_id: "abc".into(),
            kind: CredentialKind::Email,
        };
        assert_eq!(error_status(&e), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_status(&DocsendError::AuthenticationRejected { status: 200 }),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn upstream_errors_map_to_bad_gateway() {
        let e = DocsendError::PageFetchFailed {
            page: 3,
            reason: "HTTP 500".into(),
        };
        assert_eq!(error_status(&e), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn cache_take_removes_the_entry() {
        let cache = SessionCache::new(Duration::from_secs(60));
        let session = DocumentSession::invalid(
            "abc",
            "https://docsend.com/view/abc".into(),
            reqwest::Client::new(),
        );
        cache.put(session).await;
        assert!(cache.take("abc").await.is_some());
        assert!(cache.take("abc").await.is_none());
    }

    #[tokio::test]
    async fn cache_expires_entries() {
        let cache = SessionCache::new(Duration::from_millis(0));
        let session = DocumentSession::invalid(
            "abc",
            "https://docsend.com/view/abc".into(),
            reqwest::Client::new(),
        );
        cache.put(session).await;
        assert!(cache.take("abc").await.is_none());
    }
}
