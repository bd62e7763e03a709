//! Per-page asset-location resolution, fanned out over the page count.
//!
//! One metadata request per page index in `[1, page_count]`, all independent,
//! sharing only the session's cookie store (read-only by now). In-flight
//! width is capped at [`crate::config::RetrievalConfig::concurrency`]. The
//! stage is all-or-nothing: every request settles first, then a single
//! failure is reported if any page failed.

use crate::config::RetrievalConfig;
use crate::error::DocsendError;
use crate::pipeline::settle_all;
use crate::session::{DocumentSession, PageLocation};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

/// Structured body of the per-page metadata endpoint.
#[derive(Debug, Deserialize)]
struct PageMetadata {
    #[serde(rename = "imageUrl")]
    image_url: String,
}

/// Resolve the asset location of every page of an authenticated session.
///
/// The output covers each index in `[1, page_count]` exactly once, in
/// ascending order; completion order of the underlying requests is
/// irrelevant.
pub async fn resolve_locations(
    session: &DocumentSession,
    config: &RetrievalConfig,
) -> Result<Vec<PageLocation>, DocsendError> {
    let page_count = session
        .page_count
        .ok_or_else(|| DocsendError::PageCountUnknown {
            doc_id: session.document_id.clone(),
        })?;

    info!(
        "Resolving {} page locations for '{}'",
        page_count, session.document_id
    );

    let outcomes: Vec<Result<PageLocation, (usize, DocsendError)>> =
        stream::iter((1..=page_count).map(|page| {
            let http = session.http.clone();
            let url = format!("{}/page_data/{}", session.source_url, page);
            async move { resolve_one(&http, page, &url).await.map_err(|e| (page, e)) }
        }))
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    let mut locations = settle_all(outcomes)?;
    locations.sort_unstable_by_key(|location| location.page);
    Ok(locations)
}

async fn resolve_one(
    http: &Client,
    page: usize,
    url: &str,
) -> Result<PageLocation, DocsendError> {
    let response = http
        .get(url)
        .send()
        .await
        .map_err(|e| DocsendError::PageResolutionFailed {
            page,
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DocsendError::PageResolutionFailed {
            page,
            reason: format!("HTTP {status}"),
        });
    }

    let metadata: PageMetadata =
        response
            .json()
            .await
            .map_err(|e| DocsendError::PageResolutionFailed {
                page,
                reason: format!("bad metadata body: {e}"),
            })?;

    Ok(PageLocation {
        page,
        url: metadata.image_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;

    #[tokio::test]
    async fn unknown_page_count_fails_without_network() {
        let session = DocumentSession {
            document_id: "abc123".into(),
            source_url: "https://docsend.com/view/abc123".into(),
            requires_email: false,
            requires_passcode: false,
            page_count: None,
            auth_token: None,
            valid: true,
            http: Client::new(),
        };
        let config = RetrievalConfig::default();
        let err = resolve_locations(&session, &config).await.unwrap_err();
        assert!(matches!(err, DocsendError::PageCountUnknown { .. }));
    }

    #[test]
    fn page_metadata_deserialises_camel_case() {
        let metadata: PageMetadata =
            serde_json::from_str(r#"{"imageUrl": "https://cdn.example/p1.png"}"#).unwrap();
        assert_eq!(metadata.image_url, "https://cdn.example/p1.png");
    }
}
