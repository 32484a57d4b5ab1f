// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tubescope::config::Config;
use tubescope::routes::create_router;
use tubescope::AppState;

/// Create a test app with offline state (no upstream calls are made by
/// the paths these tests exercise). Returns the router and the shared
/// state so tests can seed sessions.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::from_config(Config::default()));
    (create_router(state.clone()), state)
}
