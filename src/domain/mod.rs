//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces, the event model and the click
//! aggregation worker, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`event`] - Events published on the bus
//! - [`event_bus`] - Bounded in-process publish/subscribe channel
//! - [`click_worker`] - Background click aggregator
//!
//! # Click Processing Flow
//!
//! 1. The redirect handler resolves a hash to a link
//! 2. An [`event::Event::LinkClicked`] is published on the [`event_bus::EventBus`]
//! 3. [`click_worker::ClickAggregator`] consumes events one at a time
//! 4. Per-day counters are upserted via [`repositories::StatsRepository`]

pub mod click_worker;
pub mod entities;
pub mod event;
pub mod event_bus;
pub mod repositories;
