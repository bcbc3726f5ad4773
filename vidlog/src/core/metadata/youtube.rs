//! YouTube Data API Client
//!
//! Implements [`MetadataProvider`] against the v3 `videos` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::{extract_video_id, MetadataProvider, VideoMetadata};
use crate::core::{CoreError, CoreResult, ISO_DATE_FORMAT};

// =============================================================================
// YouTube Client
// =============================================================================

/// YouTube Data API v3 client
pub struct YouTubeClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeClient {
    /// Default API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://www.googleapis.com/youtube/v3";

    /// Request timeout
    pub const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(api_key: impl Into<String>) -> CoreResult<Self> {
        Self::with_base_url(api_key, Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> CoreResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CoreError::MetadataLookupFailed(
                "add YOUTUBE_API_KEY to your .env file or set it in settings".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| {
                CoreError::MetadataLookupFailed(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl MetadataProvider for YouTubeClient {
    async fn lookup(&self, url: &str) -> CoreResult<VideoMetadata> {
        let video_id = extract_video_id(url)
            .ok_or_else(|| CoreError::MetadataLookupFailed("invalid YouTube URL".to_string()))?;

        debug!("Fetching YouTube metadata for {}", video_id);

        // API key goes in a header so it never shows up in logged URLs.
        let response = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[("part", "snippet"), ("id", video_id.as_str())])
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                CoreError::MetadataLookupFailed(format!("failed to fetch video data: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(CoreError::MetadataLookupFailed(
                "quota exceeded or invalid key".to_string(),
            ));
        }
        if status != StatusCode::OK {
            return Err(CoreError::MetadataLookupFailed(format!(
                "youtube error: {}",
                status.as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|_| CoreError::MetadataLookupFailed("failed to read response".to_string()))?;

        parse_response(&body)
    }
}

// =============================================================================
// Response Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    published_at: String,
}

fn parse_response(body: &str) -> CoreResult<VideoMetadata> {
    let response: VideosResponse = serde_json::from_str(body)
        .map_err(|_| CoreError::MetadataLookupFailed("failed to parse response".to_string()))?;

    let snippet = response
        .items
        .into_iter()
        .next()
        .map(|item| item.snippet)
        .ok_or_else(|| CoreError::MetadataLookupFailed("video not found".to_string()))?;

    let release_date = DateTime::parse_from_rfc3339(&snippet.published_at)
        .map(|at| at.format(ISO_DATE_FORMAT).to_string())
        .unwrap_or_default();

    Ok(VideoMetadata {
        title: snippet.title,
        creator: snippet.channel_title,
        release_date,
    })
}
