// SPDX-License-Identifier: MIT

//! YouTube Analytics (reporting) API client.
//!
//! Each report query is an independent request whose result passes
//! through as raw JSON. One query failing never aborts its siblings;
//! the failed entry is recorded as `null` in the combined result.

use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::models::ReportQuery;

const ANALYTICS_API_BASE_URL: &str = "https://youtubeanalytics.googleapis.com/v2";

/// Reporting window used by the analytics endpoints.
pub fn last_30_days(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(30), today)
}

/// YouTube Analytics API client (bearer-token authenticated).
#[derive(Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for AnalyticsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: ANALYTICS_API_BASE_URL.to_string(),
        }
    }

    /// Run one report query, returning the upstream JSON untouched.
    pub async fn query(
        &self,
        access_token: &str,
        query: &ReportQuery,
    ) -> Result<Value, AppError> {
        let url = format!("{}/reports", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&query.to_params())
            .send()
            .await
            .map_err(|e| AppError::ReportUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ReportUnavailable(format!(
                "HTTP {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ReportUnavailable(format!("JSON parse error: {e}")))
    }

    /// Run a set of named queries sequentially, isolating failures.
    ///
    /// The returned map contains every query's name; failed queries
    /// appear as `null` so callers get a stable shape.
    pub async fn run_queries(
        &self,
        access_token: &str,
        queries: &[(&str, ReportQuery)],
    ) -> Map<String, Value> {
        let mut results = Vec::with_capacity(queries.len());
        for (name, query) in queries {
            let result = self.query(access_token, query).await;
            if let Err(err) = &result {
                tracing::warn!(query = *name, error = %err, "Report query failed");
            }
            results.push((*name, result));
        }
        compose_results(results)
    }
}

/// Merge named query results into one payload. Every name is present;
/// failures become `null` rather than missing keys.
pub fn compose_results(results: Vec<(&str, Result<Value, AppError>)>) -> Map<String, Value> {
    results
        .into_iter()
        .map(|(name, result)| (name.to_string(), result.unwrap_or(Value::Null)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_30_days_window() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let (start, end) = last_30_days(today);
        assert_eq!(end, today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_compose_keeps_failed_queries_as_null() {
        let composed = compose_results(vec![
            (
                "views_over_time",
                Ok(json!({"rows": [["2025-01-01", 10]]})),
            ),
            (
                "top_location",
                Err(AppError::ReportUnavailable("quota".to_string())),
            ),
        ]);

        // Both keys present: one populated, one null.
        assert_eq!(composed.len(), 2);
        assert_eq!(
            composed["views_over_time"],
            json!({"rows": [["2025-01-01", 10]]})
        );
        assert_eq!(composed["top_location"], Value::Null);
    }

    #[test]
    fn test_compose_empty() {
        assert!(compose_results(Vec::new()).is_empty());
    }
}
