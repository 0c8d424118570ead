//! In-process click counter store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{ClickStat, DailyClicks};
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    stats: HashMap<i64, ClickStat>,
    by_link_day: HashMap<(i64, NaiveDate), i64>,
    next_id: i64,
}

/// Counter repository keeping one [`ClickStat`] per `(link_id, date)`.
#[derive(Default)]
pub struct InMemoryStatsRepository {
    inner: RwLock<Inner>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn find_stat(
        &self,
        link_id: i64,
        date: NaiveDate,
    ) -> Result<Option<ClickStat>, AppError> {
        let inner = self.inner.read().await;

        Ok(inner
            .by_link_day
            .get(&(link_id, date))
            .and_then(|id| inner.stats.get(id))
            .cloned())
    }

    async fn create_stat(
        &self,
        link_id: i64,
        date: NaiveDate,
        click_count: i64,
    ) -> Result<ClickStat, AppError> {
        let mut inner = self.inner.write().await;

        if inner.by_link_day.contains_key(&(link_id, date)) {
            return Err(AppError::conflict(
                "Database constraint violation",
                json!({ "constraint": "click_stats_link_date_key" }),
            ));
        }

        inner.next_id += 1;
        let stat = ClickStat {
            id: inner.next_id,
            link_id,
            date,
            click_count,
        };
        inner.by_link_day.insert((link_id, date), stat.id);
        inner.stats.insert(stat.id, stat.clone());

        Ok(stat)
    }

    async fn increment_stat(&self, stat_id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;

        let stat = inner.stats.get_mut(&stat_id).ok_or_else(|| {
            AppError::not_found("Click counter not found", json!({ "stat_id": stat_id }))
        })?;
        stat.click_count += 1;

        Ok(())
    }

    async fn daily_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyClicks>, AppError> {
        let inner = self.inner.read().await;
        let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();

        for stat in inner.stats.values() {
            if stat.date >= from && stat.date <= to {
                *days.entry(stat.date).or_default() += stat.click_count;
            }
        }

        Ok(days
            .into_iter()
            .map(|(date, clicks)| DailyClicks { date, clicks })
            .collect())
    }

    async fn link_total(
        &self,
        link_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64, AppError> {
        let inner = self.inner.read().await;

        Ok(inner
            .stats
            .values()
            .filter(|s| s.link_id == link_id && s.date >= from && s.date <= to)
            .map(|s| s.click_count)
            .sum())
    }
}
