//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, StatsService};
use crate::domain::event_bus::EventBus;
use crate::domain::repositories::{LinkRepository, StatsRepository};

/// Services and the event bus, cheap to clone per request.
///
/// Repositories are trait objects so the same router serves both the
/// PostgreSQL and the in-memory backend.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub stats_service: Arc<StatsService<dyn StatsRepository>>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        stats_repository: Arc<dyn StatsRepository>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(link_repository, event_bus.clone())),
            stats_service: Arc::new(StatsService::new(stats_repository)),
            event_bus,
        }
    }
}
