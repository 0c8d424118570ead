//! Click statistics over date ranges.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::entities::DailyClicks;
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;

/// Bucket width of a stats report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Day,
    Month,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            other => Err(format!("unsupported granularity '{other}', expected day or month")),
        }
    }
}

/// Clicks summed over an inclusive period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsBucket {
    pub period_from: NaiveDate,
    pub period_to: NaiveDate,
    pub clicks: i64,
}

/// Result of a range query: chronological buckets plus their sum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsReport {
    pub buckets: Vec<StatsBucket>,
    pub total_clicks: i64,
}

/// Read-only view over the click counters.
///
/// Queries run concurrently with the aggregator and see whatever it has
/// committed so far.
pub struct StatsService<R: StatsRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: StatsRepository + ?Sized> StatsService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Sums clicks over `from..=to`, bucketed by day or calendar month.
    ///
    /// Periods without clicks are omitted. When the whole range is empty the
    /// report holds a single `{from, to, 0}` bucket. A reversed range yields
    /// an empty report.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_stats(
        &self,
        granularity: Granularity,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<StatsReport, AppError> {
        if from > to {
            return Ok(StatsReport {
                buckets: Vec::new(),
                total_clicks: 0,
            });
        }

        let days = self.repository.daily_totals(from, to).await?;

        let mut buckets = match granularity {
            Granularity::Day => bucket_by_day(&days),
            Granularity::Month => bucket_by_month(&days),
        };

        if buckets.is_empty() {
            buckets.push(StatsBucket {
                period_from: from,
                period_to: to,
                clicks: 0,
            });
        }

        let total_clicks = buckets.iter().map(|b| b.clicks).sum();

        Ok(StatsReport {
            buckets,
            total_clicks,
        })
    }

    /// Sums clicks for a single link over `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn link_totals(
        &self,
        link_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, AppError> {
        if from > to {
            return Ok(0);
        }

        self.repository.link_total(link_id, from, to).await
    }
}

fn bucket_by_day(days: &[DailyClicks]) -> Vec<StatsBucket> {
    days.iter()
        .filter(|d| d.clicks > 0)
        .map(|d| StatsBucket {
            period_from: d.date,
            period_to: d.date,
            clicks: d.clicks,
        })
        .collect()
}

fn bucket_by_month(days: &[DailyClicks]) -> Vec<StatsBucket> {
    let mut buckets: Vec<StatsBucket> = Vec::new();

    for day in days.iter().filter(|d| d.clicks > 0) {
        let first = month_start(day.date);

        match buckets.last_mut() {
            Some(bucket) if bucket.period_from == first => bucket.clicks += day.clicks,
            _ => buckets.push(StatsBucket {
                period_from: first,
                period_to: month_end(first),
                clicks: day.clicks,
            }),
        }
    }

    buckets
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_end(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
