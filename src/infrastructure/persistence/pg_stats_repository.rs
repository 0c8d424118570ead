//! PostgreSQL implementation of the click counter repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ClickStat, DailyClicks};
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;

/// PostgreSQL repository for per-day click counters (`click_stats`).
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn find_stat(
        &self,
        link_id: i64,
        date: NaiveDate,
    ) -> Result<Option<ClickStat>, AppError> {
        let stat = sqlx::query_as::<_, ClickStat>(
            "SELECT id, link_id, date, click_count FROM click_stats \
             WHERE link_id = $1 AND date = $2",
        )
        .bind(link_id)
        .bind(date)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(stat)
    }

    async fn create_stat(
        &self,
        link_id: i64,
        date: NaiveDate,
        click_count: i64,
    ) -> Result<ClickStat, AppError> {
        let stat = sqlx::query_as::<_, ClickStat>(
            r#"
            INSERT INTO click_stats (link_id, date, click_count)
            VALUES ($1, $2, $3)
            RETURNING id, link_id, date, click_count
            "#,
        )
        .bind(link_id)
        .bind(date)
        .bind(click_count)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(stat)
    }

    async fn increment_stat(&self, stat_id: i64) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE click_stats SET click_count = click_count + 1 WHERE id = $1")
                .bind(stat_id)
                .execute(self.pool.as_ref())
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Click counter not found",
                serde_json::json!({ "stat_id": stat_id }),
            ));
        }

        Ok(())
    }

    async fn daily_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyClicks>, AppError> {
        let rows = sqlx::query_as::<_, DailyClicks>(
            r#"
            SELECT date, SUM(click_count)::BIGINT AS clicks
            FROM click_stats
            WHERE date BETWEEN $1 AND $2
            GROUP BY date
            ORDER BY date
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }

    async fn link_total(
        &self,
        link_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(click_count), 0)::BIGINT
            FROM click_stats
            WHERE link_id = $1 AND date BETWEEN $2 AND $3
            "#,
        )
        .bind(link_id)
        .bind(from)
        .bind(to)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(total)
    }
}
