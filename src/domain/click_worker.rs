//! Background consumer folding click events into per-day counters.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::event::{ClickEvent, Event};
use crate::domain::event_bus::Subscription;
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;

/// Which clock decides the calendar day (UTC) a click is counted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attribution {
    /// Day the redirect was served (`ClickEvent::clicked_at`).
    #[default]
    EventTime,
    /// Day the aggregator processed the event. Clicks queued across midnight
    /// land on the later day.
    ProcessingTime,
}

impl FromStr for Attribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "event" => Ok(Self::EventTime),
            "processing" => Ok(Self::ProcessingTime),
            other => Err(format!("unknown click attribution '{other}'")),
        }
    }
}

/// Result of processing a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A counter was created or incremented.
    Recorded,
    /// Not a click event.
    Ignored,
    /// Click event with an impossible payload.
    Malformed,
    /// The counter store rejected the write.
    Failed,
}

/// Sole writer of click counters.
///
/// Events are handled strictly one at a time, so the read-then-write upsert
/// never sees two "first clicks" for the same link and day.
pub struct ClickAggregator<R: StatsRepository + ?Sized> {
    repository: Arc<R>,
    attribution: Attribution,
}

impl<R: StatsRepository + ?Sized> ClickAggregator<R> {
    pub fn new(repository: Arc<R>, attribution: Attribution) -> Self {
        Self {
            repository,
            attribution,
        }
    }

    /// Drains the subscription until the bus is gone.
    ///
    /// Per-event failures are logged and never stop the loop.
    pub async fn run(self, mut subscription: Subscription) {
        info!(attribution = ?self.attribution, "Click aggregator started");

        while let Some(event) = subscription.recv().await {
            self.handle(event).await;
        }

        info!("Event bus closed, click aggregator stopped");
    }

    /// Processes one event.
    pub async fn handle(&self, event: Event) -> HandleOutcome {
        let click = match event {
            Event::LinkClicked(click) => click,
            other => {
                debug!(kind = %other.kind(), "Skipping non-click event");
                metrics::counter!("click_events_skipped_total", "reason" => "kind").increment(1);
                return HandleOutcome::Ignored;
            }
        };

        if click.link_id <= 0 {
            warn!(link_id = click.link_id, "Malformed click event, skipping");
            metrics::counter!("click_events_skipped_total", "reason" => "malformed").increment(1);
            return HandleOutcome::Malformed;
        }

        match self.record(click).await {
            Ok(()) => {
                metrics::counter!("clicks_recorded_total").increment(1);
                HandleOutcome::Recorded
            }
            Err(e) => {
                error!(link_id = click.link_id, error = %e, "Failed to record click");
                metrics::counter!("click_events_failed_total").increment(1);
                HandleOutcome::Failed
            }
        }
    }

    fn attribution_day(&self, click: &ClickEvent) -> NaiveDate {
        match self.attribution {
            Attribution::EventTime => click.clicked_at.date_naive(),
            Attribution::ProcessingTime => Utc::now().date_naive(),
        }
    }

    async fn record(&self, click: ClickEvent) -> Result<(), AppError> {
        let day = self.attribution_day(&click);

        match self.repository.find_stat(click.link_id, day).await? {
            Some(stat) => self.repository.increment_stat(stat.id).await,
            None => self
                .repository
                .create_stat(click.link_id, day, 1)
                .await
                .map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ClickStat;
    use crate::domain::repositories::MockStatsRepository;
    use chrono::{Duration, TimeZone};
    use mockall::predicate::eq;
    use serde_json::json;

    fn stat(id: i64, link_id: i64, date: NaiveDate, click_count: i64) -> ClickStat {
        ClickStat {
            id,
            link_id,
            date,
            click_count,
        }
    }

    #[tokio::test]
    async fn test_first_click_creates_counter() {
        let mut repo = MockStatsRepository::new();
        let clicked_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let day = clicked_at.date_naive();

        repo.expect_find_stat()
            .with(eq(123), eq(day))
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_create_stat()
            .with(eq(123), eq(day), eq(1))
            .times(1)
            .returning(move |link_id, date, count| Ok(stat(1, link_id, date, count)));
        repo.expect_increment_stat().never();

        let aggregator = ClickAggregator::new(Arc::new(repo), Attribution::EventTime);
        let outcome = aggregator
            .handle(ClickEvent::at(123, clicked_at).into())
            .await;

        assert_eq!(outcome, HandleOutcome::Recorded);
    }

    #[tokio::test]
    async fn test_subsequent_click_increments_counter() {
        let mut repo = MockStatsRepository::new();
        let clicked_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let day = clicked_at.date_naive();

        repo.expect_find_stat()
            .times(1)
            .returning(move |link_id, date| Ok(Some(stat(9, link_id, date, 4))));
        repo.expect_increment_stat()
            .with(eq(9))
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_create_stat().never();

        let aggregator = ClickAggregator::new(Arc::new(repo), Attribution::EventTime);
        let outcome = aggregator
            .handle(ClickEvent::at(123, clicked_at).into())
            .await;

        assert_eq!(outcome, HandleOutcome::Recorded);
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[tokio::test]
    async fn test_non_click_events_do_not_touch_store() {
        let mut repo = MockStatsRepository::new();
        repo.expect_find_stat().never();
        repo.expect_create_stat().never();
        repo.expect_increment_stat().never();

        let aggregator = ClickAggregator::new(Arc::new(repo), Attribution::EventTime);

        assert_eq!(
            aggregator.handle(Event::LinkCreated { link_id: 1 }).await,
            HandleOutcome::Ignored
        );
        assert_eq!(
            aggregator.handle(Event::LinkDeleted { link_id: 1 }).await,
            HandleOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_malformed_click_is_skipped() {
        let mut repo = MockStatsRepository::new();
        repo.expect_find_stat().never();

        let aggregator = ClickAggregator::new(Arc::new(repo), Attribution::EventTime);

        assert_eq!(
            aggregator.handle(ClickEvent::new(0).into()).await,
            HandleOutcome::Malformed
        );
        assert_eq!(
            aggregator.handle(ClickEvent::new(-5).into()).await,
            HandleOutcome::Malformed
        );
    }

    #[tokio::test]
    async fn test_store_error_is_reported_not_propagated() {
        let mut repo = MockStatsRepository::new();
        repo.expect_find_stat()
            .times(1)
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));

        let aggregator = ClickAggregator::new(Arc::new(repo), Attribution::EventTime);

        assert_eq!(
            aggregator.handle(ClickEvent::new(1).into()).await,
            HandleOutcome::Failed
        );
    }

    #[tokio::test]
    async fn test_processing_time_attribution_uses_today() {
        let mut repo = MockStatsRepository::new();
        let yesterday = Utc::now() - Duration::days(1);

        repo.expect_find_stat()
            .withf(|_, date| *date == Utc::now().date_naive())
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_create_stat()
            .times(1)
            .returning(|link_id, date, count| Ok(stat(1, link_id, date, count)));

        let aggregator = ClickAggregator::new(Arc::new(repo), Attribution::ProcessingTime);
        let outcome = aggregator
            .handle(ClickEvent::at(5, yesterday).into())
            .await;

        assert_eq!(outcome, HandleOutcome::Recorded);
    }

    #[test]
    fn test_attribution_from_str() {
        assert_eq!("event".parse(), Ok(Attribution::EventTime));
        assert_eq!("Processing".parse(), Ok(Attribution::ProcessingTime));
        assert!("wallclock".parse::<Attribution>().is_err());
    }
}
