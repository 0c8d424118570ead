//! Events carried by the in-process [`crate::domain::event_bus::EventBus`].

use std::fmt;

use chrono::{DateTime, Utc};

/// A successful redirect, published once per resolved hash.
///
/// Carries the time the redirect was served so the aggregator can attribute
/// the click to the day it happened rather than the day it was processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    pub fn new(link_id: i64) -> Self {
        Self::at(link_id, Utc::now())
    }

    /// Creates a click event with an explicit timestamp.
    pub fn at(link_id: i64, clicked_at: DateTime<Utc>) -> Self {
        Self {
            link_id,
            clicked_at,
        }
    }
}

/// Messages published on the bus.
///
/// Only [`Event::LinkClicked`] affects click counters; the lifecycle events
/// are informational for other subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    LinkClicked(ClickEvent),
    LinkCreated { link_id: i64 },
    LinkDeleted { link_id: i64 },
}

/// Discriminant of an [`Event`], used for logging and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LinkClicked,
    LinkCreated,
    LinkDeleted,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::LinkClicked(_) => EventKind::LinkClicked,
            Event::LinkCreated { .. } => EventKind::LinkCreated,
            Event::LinkDeleted { .. } => EventKind::LinkDeleted,
        }
    }
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::LinkClicked => "link.clicked",
            EventKind::LinkCreated => "link.created",
            EventKind::LinkDeleted => "link.deleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ClickEvent> for Event {
    fn from(click: ClickEvent) -> Self {
        Event::LinkClicked(click)
    }
}
