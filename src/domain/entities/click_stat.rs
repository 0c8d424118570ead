//! Per-link, per-day click counter.

use chrono::NaiveDate;

/// Accumulated clicks for one link on one calendar day.
///
/// At most one row exists per `(link_id, date)` pair; every click for that
/// pair increments `click_count`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ClickStat {
    pub id: i64,
    pub link_id: i64,
    pub date: NaiveDate,
    pub click_count: i64,
}

/// Sum of clicks across all links for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: i64,
}
