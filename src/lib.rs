// SPDX-License-Identifier: MIT

//! Tubescope: YouTube channel analytics backend
//!
//! This crate provides a web API that authenticates users with their
//! YouTube account via OAuth and aggregates channel statistics from
//! the YouTube Analytics and Data APIs.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;

use config::Config;
use services::{AnalyticsClient, OAuthClient, YouTubeClient};
use session::SessionStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub oauth: OAuthClient,
    pub youtube: YouTubeClient,
    pub analytics: AnalyticsClient,
}

impl AppState {
    /// Construct all clients from configuration. Called once at
    /// startup; handlers receive the state by reference.
    pub fn from_config(config: Config) -> Self {
        let oauth = OAuthClient::new(&config);
        let youtube = YouTubeClient::new(config.youtube_api_key.clone());
        Self {
            config,
            sessions: SessionStore::new(),
            oauth,
            youtube,
            analytics: AnalyticsClient::new(),
        }
    }
}
