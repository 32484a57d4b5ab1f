// SPDX-License-Identifier: MIT

//! Services module - API clients and OAuth handling.

pub mod analytics;
pub mod oauth;
pub mod youtube;

pub use analytics::AnalyticsClient;
pub use oauth::{OAuthClient, RefreshOutcome};
pub use youtube::YouTubeClient;
