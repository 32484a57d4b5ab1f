// SPDX-License-Identifier: MIT

//! Channel metadata and derived per-video aggregates.

use serde::Serialize;
use std::time::Duration;

/// Upstream sentinel for counts the channel owner has hidden.
pub const NOT_AVAILABLE: &str = "N/A";

/// Public channel metadata, counts passed through as upstream strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    #[serde(skip_serializing)]
    pub channel_id: String,
    pub channel_name: String,
    pub subscribers: String,
    pub total_videos: String,
    pub total_views: String,
}

/// Running totals accumulated while walking a channel's videos.
///
/// `video_count` is the number of videos the channel listing returned,
/// fixed up front; the detail lookup may return fewer items (deleted
/// or private videos drop out) and averages still divide by the
/// listed count.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VideoTotals {
    pub video_count: u64,
    pub total_views: u64,
    /// Sum of per-video durations, in seconds.
    pub total_duration_secs: u64,
    /// Sum of duration × views per video, in seconds.
    pub watch_time_secs: f64,
}

impl VideoTotals {
    /// Start totals over a known number of listed videos.
    pub fn with_count(video_count: u64) -> Self {
        Self {
            video_count,
            ..Self::default()
        }
    }

    /// Fold one video's statistics into the totals.
    pub fn add_video(&mut self, duration_secs: u64, views: u64) {
        self.total_views += views;
        self.total_duration_secs += duration_secs;
        self.watch_time_secs += duration_secs as f64 * views as f64;
    }

    /// Derive the aggregate metrics. Never divides by zero: an empty
    /// channel yields zero averages and a zero duration.
    pub fn aggregate(&self) -> VideoAggregate {
        let (average_views, average_duration_secs) = if self.video_count == 0 {
            (0.0, 0.0)
        } else {
            (
                self.total_views as f64 / self.video_count as f64,
                self.total_duration_secs as f64 / self.video_count as f64,
            )
        };

        VideoAggregate {
            total_watch_time_hours: round2(self.watch_time_secs / 3600.0),
            average_views: round2(average_views),
            average_video_duration: Duration::from_secs_f64(average_duration_secs),
        }
    }
}

/// Derived per-video metrics. Computed per request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAggregate {
    pub total_watch_time_hours: f64,
    pub average_views: f64,
    pub average_video_duration: Duration,
}

impl Serialize for VideoAggregate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("VideoAggregate", 3)?;
        state.serialize_field("total_watch_time_hours", &self.total_watch_time_hours)?;
        state.serialize_field("average_views", &self.average_views)?;
        state.serialize_field(
            "average_video_duration",
            &format_duration(self.average_video_duration),
        )?;
        state.end()
    }
}

/// Round to two decimal places for view/watch-time metrics.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a duration as `H:MM:SS` (hours unpadded, like `str(timedelta)`).
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_matches_known_channel() {
        // Two videos: 60s × 10 views and 120s × 20 views.
        let mut totals = VideoTotals::with_count(2);
        totals.add_video(60, 10);
        totals.add_video(120, 20);

        let aggregate = totals.aggregate();
        assert_eq!(aggregate.average_views, 15.0);
        assert_eq!(aggregate.total_watch_time_hours, 0.75);
        assert_eq!(aggregate.average_video_duration, Duration::from_secs(90));
    }

    #[test]
    fn test_aggregate_empty_channel() {
        let aggregate = VideoTotals::default().aggregate();
        assert_eq!(aggregate.average_views, 0.0);
        assert_eq!(aggregate.total_watch_time_hours, 0.0);
        assert_eq!(aggregate.average_video_duration, Duration::ZERO);
    }

    #[test]
    fn test_watch_time_rounding() {
        // 1000s × 1 view = 1000s = 0.2777...h, rounds to 0.28
        let mut totals = VideoTotals::with_count(1);
        totals.add_video(1000, 1);
        assert_eq!(totals.aggregate().total_watch_time_hours, 0.28);
    }

    #[test]
    fn test_averages_divide_by_listed_count() {
        // Three videos listed, but details came back for only one:
        // averages still divide by three.
        let mut totals = VideoTotals::with_count(3);
        totals.add_video(90, 30);

        let aggregate = totals.aggregate();
        assert_eq!(aggregate.average_views, 10.0);
        assert_eq!(aggregate.average_video_duration, Duration::from_secs(30));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(90)), "0:01:30");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1:01:01");
        assert_eq!(format_duration(Duration::ZERO), "0:00:00");
    }

    #[test]
    fn test_aggregate_serializes_duration_as_string() {
        let mut totals = VideoTotals::with_count(2);
        totals.add_video(60, 10);
        totals.add_video(120, 20);

        let value = serde_json::to_value(totals.aggregate()).unwrap();
        assert_eq!(value["average_video_duration"], "0:01:30");
        assert_eq!(value["average_views"], 15.0);
        assert_eq!(value["total_watch_time_hours"], 0.75);
    }
}
