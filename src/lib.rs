//! # docsend-dl
//!
//! Download multi-page documents hosted behind an access-gated viewer and
//! assemble their page images into a single PDF.
//!
//! The viewer never exposes the original file — only per-page rendered
//! images behind an email/passcode gate. This crate probes the gate,
//! authenticates when required, resolves and downloads every page image
//! concurrently, and reassembles them in original page order.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document id
//!  │
//!  ├─ 1. Probe     fetch the landing page, scan auth requirements + page count
//!  ├─ 2. Auth      challenge/response against the gate (only if demanded)
//!  ├─ 3. Resolve   one metadata request per page, concurrent, bounded
//!  ├─ 4. Fetch     one image download per page, concurrent, bounded
//!  └─ 5. Assemble  restore index order, drive the PDF page sink
//! ```
//!
//! Completion order of the network fan-out is unconstrained; emitted page
//! order is always ascending page index. Every stage is all-or-nothing: the
//! caller gets a complete artifact or exactly one failure reason, never a
//! partial document.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsend_dl::{retrieve, RetrievalConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RetrievalConfig::default();
//!     let artifact = retrieve("abc123", Some("a@b.com"), None, &config).await?;
//!     std::fs::write(&artifact.file_name, &artifact.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `docsend-dl` batch binary (clap + anyhow + indicatif) |
//! | `server` | off     | Enables the `docsend-dl-server` HTTP front end (axum) |
//!
//! Disable both when using only the library:
//! ```toml
//! docsend-dl = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod retrieve;
#[cfg(feature = "server")]
pub mod serve;
pub mod session;
pub mod sink;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use error::{CredentialKind, DocsendError};
pub use extract::{ExtractionRules, LandingFacts};
pub use pipeline::probe::probe;
pub use retrieve::{
    check_valid, retrieve, retrieve_session, retrieve_with_sink, Artifact,
    ARTIFACT_CONTENT_TYPE,
};
pub use session::{document_id_from_url, DocumentSession, PageImage, PageLocation};
pub use sink::{PageSink, PdfSink, SinkError};
