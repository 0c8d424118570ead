#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use chrono::NaiveDate;
use link_shortener::api::routes::routes;
use link_shortener::domain::click_worker::{Attribution, ClickAggregator};
use link_shortener::domain::entities::{Link, NewLink};
use link_shortener::domain::event_bus::{EventBus, OverflowPolicy};
use link_shortener::domain::repositories::{LinkRepository, StatsRepository};
use link_shortener::infrastructure::memory::{InMemoryLinkRepository, InMemoryStatsRepository};
use link_shortener::state::AppState;
use tokio::task::JoinHandle;

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub links: Arc<InMemoryLinkRepository>,
    pub stats: Arc<InMemoryStatsRepository>,
}

pub fn create_test_state() -> (
    AppState,
    Arc<InMemoryLinkRepository>,
    Arc<InMemoryStatsRepository>,
) {
    let links = Arc::new(InMemoryLinkRepository::new());
    let stats = Arc::new(InMemoryStatsRepository::new());
    let bus = EventBus::new(1_000, OverflowPolicy::Block);

    let state = AppState::new(links.clone(), stats.clone(), bus);

    (state, links, stats)
}

/// App without a running aggregator; clicks stay queued on the bus.
pub fn test_app() -> TestApp {
    let (state, links, stats) = create_test_state();
    let server = TestServer::new(routes().with_state(state.clone())).unwrap();

    TestApp {
        server,
        state,
        links,
        stats,
    }
}

/// App with a click aggregator consuming the bus.
pub fn test_app_with_aggregator() -> (TestApp, JoinHandle<()>) {
    let app = test_app();
    let aggregator = ClickAggregator::new(app.stats.clone(), Attribution::EventTime);
    let handle = tokio::spawn(aggregator.run(app.state.event_bus.subscribe()));

    (app, handle)
}

pub async fn create_test_link(repo: &InMemoryLinkRepository, hash: &str, url: &str) -> Link {
    repo.create(NewLink {
        original_url: url.to_string(),
        hash: hash.to_string(),
    })
    .await
    .unwrap()
}

pub async fn seed_stat(repo: &InMemoryStatsRepository, link_id: i64, date: NaiveDate, clicks: i64) {
    repo.create_stat(link_id, date, clicks).await.unwrap();
}

/// Polls until the link's counter for `date` reaches `expected`.
pub async fn wait_for_clicks(
    repo: &InMemoryStatsRepository,
    link_id: i64,
    date: NaiveDate,
    expected: i64,
) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);

    loop {
        let current = repo
            .find_stat(link_id, date)
            .await
            .unwrap()
            .map(|s| s.click_count)
            .unwrap_or(0);

        if current >= expected {
            assert_eq!(current, expected, "counter overshot");
            return;
        }

        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {expected} clicks on link {link_id}, saw {current}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
