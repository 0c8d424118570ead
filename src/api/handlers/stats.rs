//! Handler for click statistics.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::stats::{StatsQueryParams, StatsResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns clicks over a date range, bucketed by day or calendar month.
///
/// # Endpoint
///
/// `GET /stats?from=2024-01-01&to=2024-01-31&by=day`
///
/// # Response
///
/// ```json
/// {
///   "stats": [
///     { "period_from": "2024-01-01", "period_to": "2024-01-01", "clicks": 5 }
///   ],
///   "total_clicks": 5
/// }
/// ```
///
/// A range without clicks returns one `{from, to, 0}` bucket.
///
/// # Errors
///
/// Returns 400 Bad Request for a missing or malformed date, `from` after
/// `to`, or `by` other than `day`/`month`.
pub async fn stats_handler(
    State(state): State<AppState>,
    Query(params): Query<StatsQueryParams>,
) -> Result<Json<StatsResponse>, AppError> {
    let query = params.validate()?;

    let report = state
        .stats_service
        .get_stats(query.granularity, query.from, query.to)
        .await?;

    Ok(Json(report.into()))
}
