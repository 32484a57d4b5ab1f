// SPDX-License-Identifier: MIT

//! Authenticated analytics routes over the reporting API.
//!
//! One parameterized query runner serves both the `channel==MINE` and
//! explicit-channel variants; the endpoints differ only in scope.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::AuthCredential;
use crate::models::{IdScope, ReportQuery};
use crate::services::analytics::last_30_days;
use crate::AppState;

/// Analytics routes (require a session credential).
/// The session middleware is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analytics", get(my_analytics))
        .route("/analytics/{channel_id}", get(channel_analytics))
}

/// The report query set served by the analytics endpoints, all over
/// the last-30-days window.
fn report_query_set(scope: IdScope, today: NaiveDate) -> Vec<(&'static str, ReportQuery)> {
    let (start_date, end_date) = last_30_days(today);

    let query = |metrics: &[&str], dimensions: &str, sort: Option<&str>| ReportQuery {
        ids: scope.clone(),
        metrics: metrics.iter().map(|m| m.to_string()).collect(),
        dimensions: dimensions.to_string(),
        start_date,
        end_date,
        sort: sort.map(str::to_string),
    };

    vec![
        ("views_over_time", query(&["views"], "day", Some("day"))),
        (
            "watch_time",
            query(&["estimatedMinutesWatched"], "day", Some("day")),
        ),
        (
            "subscribers_gained",
            query(&["subscribersGained"], "day", Some("day")),
        ),
        (
            "top_location",
            query(&["views", "estimatedMinutesWatched"], "country", Some("-views")),
        ),
    ]
}

/// Analytics for the authenticated user's own channel.
async fn my_analytics(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<AuthCredential>,
) -> Result<Json<Value>> {
    run_report_set(&state, &credential, IdScope::Mine).await
}

/// Analytics for an explicit channel ID the user can report on.
async fn channel_analytics(
    State(state): State<Arc<AppState>>,
    Extension(credential): Extension<AuthCredential>,
    Path(channel_id): Path<String>,
) -> Result<Json<Value>> {
    run_report_set(&state, &credential, IdScope::Channel(channel_id)).await
}

async fn run_report_set(
    state: &AppState,
    credential: &AuthCredential,
    scope: IdScope,
) -> Result<Json<Value>> {
    let queries = report_query_set(scope, Utc::now().date_naive());
    let composed = state
        .analytics
        .run_queries(&credential.0.token, &queries)
        .await;

    Ok(Json(Value::Object(composed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_set_names_are_stable() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let queries = report_query_set(IdScope::Mine, today);

        let names: Vec<&str> = queries.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec![
                "views_over_time",
                "watch_time",
                "subscribers_gained",
                "top_location"
            ]
        );
    }

    #[test]
    fn test_query_set_scope_and_window() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let queries = report_query_set(IdScope::Channel("UC123".to_string()), today);

        for (_, query) in &queries {
            assert_eq!(query.ids, IdScope::Channel("UC123".to_string()));
            assert_eq!(query.end_date, today);
            assert_eq!(
                query.start_date,
                NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
            );
        }
    }

    #[test]
    fn test_top_location_uses_country_dimension() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let queries = report_query_set(IdScope::Mine, today);

        let (_, top_location) = queries
            .iter()
            .find(|(name, _)| *name == "top_location")
            .unwrap();
        assert_eq!(top_location.dimensions, "country");
        assert_eq!(top_location.sort.as_deref(), Some("-views"));
    }
}
