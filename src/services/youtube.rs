// SPDX-License-Identifier: MIT

//! YouTube Data API v3 client for channel and video lookups.
//!
//! Handles:
//! - Handle to channel-ID resolution
//! - Channel metadata (name, subscriber/video/view counts)
//! - Cursor-paginated video-ID listing
//! - Batched video detail lookups (max 50 IDs per call)

use serde::Deserialize;

use crate::error::AppError;
use crate::models::channel::{ChannelSummary, VideoTotals, NOT_AVAILABLE};

const DATA_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Upstream ceiling on IDs per `videos.list` call and results per page.
const MAX_BATCH_SIZE: usize = 50;

/// YouTube Data API client (API-key authenticated).
#[derive(Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DATA_API_BASE_URL.to_string(),
            api_key,
        }
    }

    /// Resolve a public handle (e.g. `@example`) to a channel ID.
    pub async fn resolve_handle(&self, handle: &str) -> Result<Option<String>, AppError> {
        let url = format!("{}/channels", self.base_url);
        let response: ChannelListResponse = self
            .get_json(&url, &[("part", "id"), ("forHandle", handle)])
            .await?;

        Ok(response.items.into_iter().next().map(|item| item.id))
    }

    /// Fetch channel metadata. `None` when the channel does not exist.
    pub async fn channel_details(
        &self,
        channel_id: &str,
    ) -> Result<Option<ChannelSummary>, AppError> {
        let url = format!("{}/channels", self.base_url);
        let response: ChannelListResponse = self
            .get_json(&url, &[("part", "snippet,statistics"), ("id", channel_id)])
            .await?;

        let Some(item) = response.items.into_iter().next() else {
            return Ok(None);
        };

        let count = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let statistics = item.statistics.unwrap_or_default();

        Ok(Some(ChannelSummary {
            channel_id: item.id,
            channel_name: item.snippet.map(|s| s.title).unwrap_or_default(),
            subscribers: count(statistics.subscriber_count),
            total_videos: count(statistics.video_count),
            total_views: count(statistics.view_count),
        }))
    }

    /// List all video IDs for a channel, newest first.
    ///
    /// Follows the page-token cursor until the upstream stops returning
    /// one. An absent or empty cursor terminates the loop.
    pub async fn list_video_ids(&self, channel_id: &str) -> Result<Vec<String>, AppError> {
        let url = format!("{}/search", self.base_url);
        let mut video_ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let max_results = MAX_BATCH_SIZE.to_string();
            let mut params = vec![
                ("part", "id"),
                ("channelId", channel_id),
                ("maxResults", max_results.as_str()),
                ("order", "date"),
                ("type", "video"),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let page: SearchPage = self.get_json(&url, &params).await?;
            page_token = collect_page(page, &mut video_ids);

            if page_token.is_none() {
                return Ok(video_ids);
            }
        }
    }

    /// Fetch statistics for a set of videos and fold them into totals.
    ///
    /// IDs are batched in groups of 50, the upstream ceiling per call.
    /// The video count is the number of requested IDs, not the number
    /// of items returned; deleted or private videos contribute nothing
    /// but still count toward averages.
    pub async fn video_totals(&self, video_ids: &[String]) -> Result<VideoTotals, AppError> {
        let url = format!("{}/videos", self.base_url);
        let mut totals = VideoTotals::with_count(video_ids.len() as u64);

        for batch in video_ids.chunks(MAX_BATCH_SIZE) {
            let ids = batch.join(",");
            let response: VideoListResponse = self
                .get_json(&url, &[("part", "statistics,contentDetails"), ("id", &ids)])
                .await?;

            for item in response.items {
                accumulate_video(&mut totals, &item);
            }
        }

        Ok(totals)
    }

    /// Generic GET with API key and JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::YouTubeApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::YouTubeApi(format!("HTTP {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::YouTubeApi(format!("JSON parse error: {e}")))
    }
}

/// Append one search page's video IDs and return the next cursor, if
/// any. Empty cursors are treated as absent so the caller terminates.
fn collect_page(page: SearchPage, into: &mut Vec<String>) -> Option<String> {
    into.extend(
        page.items
            .into_iter()
            .filter_map(|item| item.id.video_id),
    );
    page.next_page_token.filter(|token| !token.is_empty())
}

/// Fold one video's duration and view count into the totals.
fn accumulate_video(totals: &mut VideoTotals, item: &VideoItem) {
    let duration_secs = item
        .content_details
        .as_ref()
        .map(|details| parse_iso_duration(&details.duration))
        .unwrap_or(0);

    let views = item
        .statistics
        .as_ref()
        .and_then(|stats| stats.view_count.as_deref())
        .and_then(|count| count.parse::<u64>().ok())
        .unwrap_or(0);

    totals.add_video(duration_secs, views);
}

/// Parse an ISO-8601 video duration (`PT1H2M3S`) to seconds.
fn parse_iso_duration(duration: &str) -> u64 {
    let mut seconds = 0u64;
    let mut num = String::new();

    for c in duration.chars() {
        if c.is_ascii_digit() {
            num.push(c);
        } else {
            let n: u64 = num.parse().unwrap_or(0);
            num.clear();

            match c {
                'D' => seconds += n * 86_400,
                'H' => seconds += n * 3_600,
                'M' => seconds += n * 60,
                'S' => seconds += n,
                _ => {}
            }
        }
    }

    seconds
}

// ─── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    id: String,
    #[serde(default)]
    snippet: Option<ChannelSnippet>,
    #[serde(default)]
    statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
    video_count: Option<String>,
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    #[serde(default)]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    statistics: Option<VideoStatistics>,
    #[serde(default)]
    content_details: Option<VideoContentDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    #[serde(default)]
    view_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoContentDetails {
    duration: String,
}
