//! DTOs for the click statistics endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::application::services::{Granularity, StatsBucket, StatsReport};
use crate::error::AppError;

/// Raw query string of `GET /stats?from=YYYY-MM-DD&to=YYYY-MM-DD&by=day|month`.
///
/// Fields are kept as strings so every malformed value produces the same
/// JSON validation error instead of an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct StatsQueryParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub by: Option<String>,
}

/// A validated stats query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsQuery {
    pub granularity: Granularity,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl StatsQueryParams {
    /// Parses and validates the range and granularity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when a parameter is missing or
    /// malformed, or when `from` is after `to`.
    pub fn validate(&self) -> Result<StatsQuery, AppError> {
        let from = parse_date("from", self.from.as_deref())?;
        let to = parse_date("to", self.to.as_deref())?;

        let granularity = match self.by.as_deref() {
            Some(by) => by.parse::<Granularity>().map_err(|reason| {
                AppError::bad_request(
                    "Invalid granularity",
                    json!({ "field": "by", "value": by, "reason": reason }),
                )
            })?,
            None => {
                return Err(AppError::bad_request(
                    "Missing query parameter",
                    json!({ "field": "by", "expected": ["day", "month"] }),
                ));
            }
        };

        if from > to {
            return Err(AppError::bad_request(
                "Invalid date range",
                json!({ "from": from, "to": to, "reason": "from must not be after to" }),
            ));
        }

        Ok(StatsQuery {
            granularity,
            from,
            to,
        })
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<NaiveDate, AppError> {
    let value = value.ok_or_else(|| {
        AppError::bad_request(
            "Missing query parameter",
            json!({ "field": field, "format": "YYYY-MM-DD" }),
        )
    })?;

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        AppError::bad_request(
            "Invalid date",
            json!({ "field": field, "value": value, "format": "YYYY-MM-DD" }),
        )
    })
}

/// One bucket of the stats response.
#[derive(Debug, Serialize)]
pub struct StatsBucketDto {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub clicks: i64,
}

impl From<StatsBucket> for StatsBucketDto {
    fn from(bucket: StatsBucket) -> Self {
        Self {
            period_from: bucket.period_from,
            period_to: bucket.period_to,
            clicks: bucket.clicks,
        }
    }
}

/// Response for `GET /stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub stats: Vec<StatsBucketDto>,
    pub total_clicks: i64,
}

impl From<StatsReport> for StatsResponse {
    fn from(report: StatsReport) -> Self {
        Self {
            stats: report.buckets.into_iter().map(Into::into).collect(),
            total_clicks: report.total_clicks,
        }
    }
}
