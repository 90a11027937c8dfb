use std::sync::OnceLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::feed::{self, FeedPayload, FetchError};
use crate::worker_pool::{self, BatchError};

/// Upper bound on in-flight feed fetches per aggregation pass. A tuned
/// constant, independent of how many sources are configured.
pub const MAX_CONCURRENT_FETCHES: usize = 30;

static IMG_SRC: OnceLock<Regex> = OnceLock::new();

/// Best-effort pattern search over semi-structured HTML, not a DOM parse.
/// Upgrading to a strict parser would change what counts as a match.
fn img_src_pattern() -> &'static Regex {
    IMG_SRC.get_or_init(|| Regex::new(r#"<img[^>]+src="([^"]+)""#).expect("img pattern is valid"))
}

/// One display-ready video entry, merged across all sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub thumbnail_url: String,
    pub title: String,
    pub url: String,
    /// Author names joined with ", "; empty when the item lists none
    pub author: String,
    /// The feed format carries no separate channel URL, so the video URL
    /// doubles as the author link
    pub author_url: String,
    pub published: DateTime<Utc>,
}

/// How an aggregation pass that produced at least one video finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every source fetched and decoded
    Complete,
    /// At least one source failed; the returned videos are still usable
    Degraded { failed_sources: usize },
}

/// Fatal aggregation errors. [`Outcome::Degraded`] is deliberately not an
/// error: it accompanies a usable result.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// All sources failed, or every source returned zero items
    #[error("no content: no videos could be aggregated")]
    NoContent,
    /// The fetch batch could not be scheduled at all
    #[error("failed to schedule feed fetches: {0}")]
    Scheduling(#[from] BatchError),
}

/// Fetches every configured feed concurrently and merges the results into
/// one list, newest first.
///
/// Per-source failures are logged and counted but never abort the pass;
/// the pass fails only when nothing at all could be aggregated. The caller
/// applies any display cap; no truncation happens here.
pub async fn fetch_channel_uploads(
    client: &reqwest::Client,
    feed_urls: &[String],
    image_proxy: &str,
    request_timeout: Duration,
) -> Result<(Vec<Video>, Outcome), AggregateError> {
    let requests = feed::build_requests(feed_urls);

    let results = worker_pool::run_batch(requests, MAX_CONCURRENT_FETCHES, |request| async move {
        feed::fetch_feed(client, &request, request_timeout).await
    })
    .await?;

    collect_videos(feed_urls, results, image_proxy)
}

/// Folds index-aligned per-source results into the merged, classified list.
fn collect_videos(
    feed_urls: &[String],
    results: Vec<Result<FeedPayload, FetchError>>,
    image_proxy: &str,
) -> Result<(Vec<Video>, Outcome), AggregateError> {
    let mut videos: Vec<Video> = Vec::new();
    let mut failed_sources = 0usize;

    for (url, result) in feed_urls.iter().zip(results) {
        match result {
            Ok(payload) => videos.extend(extract_videos(payload, image_proxy)),
            Err(error) => {
                failed_sources += 1;
                tracing::error!(url = %url, error = %error, "Failed to fetch video feed");
            }
        }
    }

    // Zero videos is fatal even when zero sources failed
    if videos.is_empty() {
        return Err(AggregateError::NoContent);
    }

    // Stable sort: equal timestamps keep source order, then item order
    videos.sort_by(|a, b| b.published.cmp(&a.published));

    let outcome = if failed_sources > 0 {
        Outcome::Degraded { failed_sources }
    } else {
        Outcome::Complete
    };

    Ok((videos, outcome))
}

/// Converts one source's raw items into display entries.
fn extract_videos(payload: FeedPayload, image_proxy: &str) -> Vec<Video> {
    let pattern = img_src_pattern();

    payload
        .items
        .into_iter()
        .map(|item| {
            // First embedded image wins. An item without any image keeps an
            // empty thumbnail instead of being dropped, so a source always
            // contributes all of its items or none.
            let thumbnail_url = pattern
                .captures(&item.content_html)
                .and_then(|caps| caps.get(1))
                .map(|m| format!("{image_proxy}{}", m.as_str()))
                .unwrap_or_default();

            let author = item
                .authors
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            let author_url = item.url.clone();

            Video {
                thumbnail_url,
                title: item.title,
                url: item.url,
                author,
                author_url,
                published: item.date_published.unwrap_or(DateTime::UNIX_EPOCH),
            }
        })
        .collect()
}
