// SPDX-License-Identifier: MIT

//! Report query parameters for the YouTube Analytics API.

use chrono::NaiveDate;

/// Which channel a report query is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdScope {
    /// The channel owned by the authenticated user (`channel==MINE`).
    Mine,
    /// An explicit channel ID (`channel==UC...`).
    Channel(String),
}

impl IdScope {
    /// Render as the `ids` query parameter value.
    pub fn as_ids_param(&self) -> String {
        match self {
            IdScope::Mine => "channel==MINE".to_string(),
            IdScope::Channel(id) => format!("channel=={id}"),
        }
    }
}

/// A single reporting-API query. Immutable once constructed; each
/// query is independent of its siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    pub ids: IdScope,
    pub metrics: Vec<String>,
    pub dimensions: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub sort: Option<String>,
}

impl ReportQuery {
    /// Render as `(name, value)` pairs ready for `reqwest::RequestBuilder::query`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("ids", self.ids.as_ids_param()),
            ("startDate", self.start_date.format("%Y-%m-%d").to_string()),
            ("endDate", self.end_date.format("%Y-%m-%d").to_string()),
            ("metrics", self.metrics.join(",")),
            ("dimensions", self.dimensions.clone()),
        ];
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_param_rendering() {
        assert_eq!(IdScope::Mine.as_ids_param(), "channel==MINE");
        assert_eq!(
            IdScope::Channel("UC123".to_string()).as_ids_param(),
            "channel==UC123"
        );
    }

    #[test]
    fn test_query_params() {
        let query = ReportQuery {
            ids: IdScope::Mine,
            metrics: vec!["views".to_string(), "subscribersGained".to_string()],
            dimensions: "day".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            sort: Some("day".to_string()),
        };

        let params = query.to_params();
        assert!(params.contains(&("ids", "channel==MINE".to_string())));
        assert!(params.contains(&("startDate", "2025-01-01".to_string())));
        assert!(params.contains(&("endDate", "2025-01-31".to_string())));
        assert!(params.contains(&("metrics", "views,subscribersGained".to_string())));
        assert!(params.contains(&("dimensions", "day".to_string())));
        assert!(params.contains(&("sort", "day".to_string())));
    }

    #[test]
    fn test_sort_omitted_when_absent() {
        let query = ReportQuery {
            ids: IdScope::Channel("UC9".to_string()),
            metrics: vec!["views".to_string()],
            dimensions: "country".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            sort: None,
        };
        assert!(!query.to_params().iter().any(|(name, _)| *name == "sort"));
    }
}
