//! Repository trait for per-day click counters.

use crate::domain::entities::{ClickStat, DailyClicks};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository interface for click counters.
///
/// Writes come from a single consumer
/// ([`crate::domain::click_worker::ClickAggregator`]), so the read-then-write
/// upsert it performs through [`Self::find_stat`], [`Self::create_stat`] and
/// [`Self::increment_stat`] never races with itself. Reads may run
/// concurrently with those writes.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgStatsRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryStatsRepository`] - in-process maps
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Finds the counter for a link on a given day.
    async fn find_stat(&self, link_id: i64, date: NaiveDate)
    -> Result<Option<ClickStat>, AppError>;

    /// Inserts a new counter row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a row for `(link_id, date)` exists.
    async fn create_stat(
        &self,
        link_id: i64,
        date: NaiveDate,
        click_count: i64,
    ) -> Result<ClickStat, AppError>;

    /// Adds one click to an existing counter row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the row does not exist.
    async fn increment_stat(&self, stat_id: i64) -> Result<(), AppError>;

    /// Sums clicks across all links per day for `from..=to`, oldest first.
    ///
    /// Days without clicks are omitted.
    async fn daily_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyClicks>, AppError>;

    /// Sums clicks for one link over `from..=to`.
    async fn link_total(&self, link_id: i64, from: NaiveDate, to: NaiveDate)
    -> Result<i64, AppError>;
}
