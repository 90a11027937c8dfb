use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::aggregator::{self, AggregateError, Outcome, Video};
use crate::config::Config;

pub struct AppState {
    pub client: reqwest::Client,
    pub config: Config,
}

#[derive(Serialize)]
pub struct VideosResponse {
    pub videos: Vec<Video>,
    /// Non-zero when the list is usable but incomplete
    pub failed_sources: usize,
}

// Custom error type
pub enum AppError {
    /// Nothing could be aggregated; the consuming surface degrades to an
    /// empty/error state
    NoContent(AggregateError),
    /// The whole pass ran past its deadline
    DeadlineExceeded,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NoContent(err) => {
                (StatusCode::BAD_GATEWAY, format!("Error: {}", err)).into_response()
            }
            AppError::DeadlineExceeded => (
                StatusCode::GATEWAY_TIMEOUT,
                "Error: aggregation deadline exceeded".to_string(),
            )
                .into_response(),
        }
    }
}

// Route handlers
pub async fn videos(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let config = &state.config;
    let deadline = Duration::from_secs(config.aggregation_deadline_secs);
    let request_timeout = Duration::from_secs(config.request_timeout_secs);

    // Dropping the pass on deadline cancels its in-flight fetches
    let pass = tokio::time::timeout(
        deadline,
        aggregator::fetch_channel_uploads(
            &state.client,
            &config.feeds,
            &config.image_proxy,
            request_timeout,
        ),
    )
    .await
    .map_err(|_| AppError::DeadlineExceeded)?;

    let (mut videos, outcome) = pass.map_err(AppError::NoContent)?;

    // Display cap is applied here, after the core pipeline
    if videos.len() > config.limit {
        videos.truncate(config.limit);
    }

    let failed_sources = match outcome {
        Outcome::Complete => 0,
        Outcome::Degraded { failed_sources } => {
            tracing::warn!(failed_sources, "Serving degraded video list");
            failed_sources
        }
    };

    Ok(Json(VideosResponse {
        videos,
        failed_sources,
    }))
}

pub async fn health() -> impl IntoResponse {
    "OK"
}
