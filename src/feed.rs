use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// One fetchable feed source.
///
/// Index correspondence with the caller's URL list is positional. No URL
/// validation happens here; a malformed URL surfaces as a fetch error in
/// its own result slot.
#[derive(Debug, Clone)]
pub struct SourceRequest {
    pub url: String,
}

/// Turns source URLs into fetch descriptors, one per URL, preserving order.
pub fn build_requests(urls: &[String]) -> Vec<SourceRequest> {
    urls.iter()
        .map(|url| SourceRequest { url: url.clone() })
        .collect()
}

/// Decoded JSON-feed response for one source, as produced by RSSHub for
/// video channels.
#[derive(Debug, Deserialize)]
pub struct FeedPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub home_page_url: String,
    /// An absent items array means zero entries for this source, not an error
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub content_html: String,
    #[serde(default)]
    pub date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authors: Vec<FeedAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct FeedAuthor {
    pub name: String,
}

/// Errors from fetching and decoding a single source.
///
/// Always recovered locally by the aggregator: logged, counted, never
/// propagated individually to the caller.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, malformed URL)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the per-source timeout
    #[error("request timed out")]
    Timeout,
    /// Response body was not a decodable JSON feed
    #[error("decode error: {0}")]
    Decode(String),
}

/// Fetches one source and decodes its JSON-feed body.
pub async fn fetch_feed(
    client: &reqwest::Client,
    request: &SourceRequest,
    timeout: Duration,
) -> Result<FeedPayload, FetchError> {
    let response = tokio::time::timeout(timeout, client.get(&request.url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    response
        .json::<FeedPayload>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}
