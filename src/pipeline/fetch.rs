//! Raw page-image download, fanned out over resolved locations.
//!
//! One read request per page, all independent, bounded by the same
//! concurrency cap as resolution. A failed page does not block in-flight
//! siblings; the stage reports one failure once everything has settled, and
//! discards the rest — no silent partial artifacts.

use crate::config::RetrievalConfig;
use crate::error::DocsendError;
use crate::pipeline::settle_all;
use crate::session::{DocumentSession, PageImage, PageLocation};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info};

/// Download the raw bytes of every resolved page asset.
pub async fn fetch_all(
    session: &DocumentSession,
    locations: &[PageLocation],
    config: &RetrievalConfig,
) -> Result<Vec<PageImage>, DocsendError> {
    info!(
        "Fetching {} page images for '{}'",
        locations.len(),
        session.document_id
    );

    let outcomes: Vec<Result<PageImage, (usize, DocsendError)>> =
        stream::iter(locations.iter().cloned().map(|location| {
            let http = session.http.clone();
            async move {
                let page = location.page;
                fetch_one(&http, &location).await.map_err(|e| (page, e))
            }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    settle_all(outcomes)
}

/// Download one page asset.
pub async fn fetch_one(
    http: &Client,
    location: &PageLocation,
) -> Result<PageImage, DocsendError> {
    let response =
        http.get(&location.url)
            .send()
            .await
            .map_err(|e| DocsendError::PageFetchFailed {
                page: location.page,
                reason: e.to_string(),
            })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DocsendError::PageFetchFailed {
            page: location.page,
            reason: format!("HTTP {status}"),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DocsendError::PageFetchFailed {
            page: location.page,
            reason: format!("reading image body: {e}"),
        })?;

    debug!("Fetched page {} ({} bytes)", location.page, bytes.len());
    Ok(PageImage {
        page: location.page,
        bytes: bytes.to_vec(),
    })
}
