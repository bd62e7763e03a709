//! End-to-end retrieval orchestration.
//!
//! The orchestrator composes the pipeline stages into the flow
//!
//! ```text
//! Probing ─▶ (Authenticating?) ─▶ Resolving ─▶ Fetching ─▶ Assembling ─▶ Done
//! ```
//!
//! with a terminal failure reachable from any stage. Cross-stage ordering is
//! strict — resolution fully completes before the first fetch, all fetches
//! settle before assembly — and every stage is atomic, so the caller sees
//! either a complete artifact or exactly one failure reason.

use crate::config::RetrievalConfig;
use crate::error::DocsendError;
use crate::pipeline::{assemble, auth, fetch, probe, resolve};
use crate::session::DocumentSession;
use crate::sink::{PageSink, PdfSink};
use std::time::Instant;
use tracing::info;

/// A finished retrieval: the artifact bytes plus the attachment file name
/// `<prefix>-<documentId>.pdf`.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// MIME type of the artifact produced by the default sink.
pub const ARTIFACT_CONTENT_TYPE: &str = "application/pdf";

/// Retrieve a gated document as a single PDF.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `document_id` — opaque viewer document id
/// * `email` / `passcode` — credentials, used only if the gate demands them
/// * `config` — retrieval configuration
///
/// # Errors
/// One [`DocsendError`] naming the failed stage; no partial artifact is ever
/// returned.
pub async fn retrieve(
    document_id: &str,
    email: Option<&str>,
    passcode: Option<&str>,
    config: &RetrievalConfig,
) -> Result<Artifact, DocsendError> {
    info!("Starting retrieval of '{}'", document_id);
    let mut session = probe::probe(document_id, config).await?;
    retrieve_session(&mut session, email, passcode, config).await
}

/// Retrieve using an already-probed session.
///
/// Lets front ends that cache probe results (metadata lookups) skip the
/// second landing-page round trip. The session is consumed conceptually: its
/// one-time token is spent and its cookie store ends up authenticated.
pub async fn retrieve_session(
    session: &mut DocumentSession,
    email: Option<&str>,
    passcode: Option<&str>,
    config: &RetrievalConfig,
) -> Result<Artifact, DocsendError> {
    let sink = PdfSink::new(session.document_id.clone());
    let file_name = format!(
        "{}-{}.pdf",
        config.artifact_prefix, session.document_id
    );
    let bytes = retrieve_with_sink(session, email, passcode, config, sink).await?;
    Ok(Artifact { bytes, file_name })
}

/// Retrieve using an externally supplied page sink.
///
/// The sink receives pages strictly in ascending index order and is
/// finalized exactly once, only on full success.
pub async fn retrieve_with_sink<S>(
    session: &mut DocumentSession,
    email: Option<&str>,
    passcode: Option<&str>,
    config: &RetrievalConfig,
    sink: S,
) -> Result<Vec<u8>, DocsendError>
where
    S: PageSink + Send + 'static,
{
    if !session.valid {
        return Err(DocsendError::UnknownDocument {
            doc_id: session.document_id.clone(),
        });
    }
    let total_start = Instant::now();

    // ── Authenticating (conditional) ─────────────────────────────────────
    auth::authenticate(session, email, passcode, config).await?;

    // ── Resolving ────────────────────────────────────────────────────────
    let locations = resolve::resolve_locations(session, config).await?;

    // ── Fetching ─────────────────────────────────────────────────────────
    let images = fetch::fetch_all(session, &locations, config).await?;

    // ── Assembling ───────────────────────────────────────────────────────
    let bytes = tokio::task::spawn_blocking(move || assemble::assemble(images, sink))
        .await
        .map_err(|e| DocsendError::Internal(format!("assembly task failed: {e}")))??;

    info!(
        "Retrieved '{}': {} pages, {} bytes, {:?}",
        session.document_id,
        locations.len(),
        bytes.len(),
        total_start.elapsed()
    );
    Ok(bytes)
}

/// Quick existence check: does the document's landing page answer at all?
///
/// Runs only the probe, none of the rest of the pipeline.
pub async fn check_valid(
    document_id: &str,
    config: &RetrievalConfig,
) -> Result<bool, DocsendError> {
    let session = probe::probe(document_id, config).await?;
    Ok(session.valid)
}
