//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access and are implemented by the
//! infrastructure layer (PostgreSQL and in-memory backends).
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link CRUD operations
//! - [`StatsRepository`] - Per-day click counters and range sums
//!
//! Mock implementations are generated with `mockall` for unit tests.

pub mod link_repository;
pub mod stats_repository;

pub use link_repository::LinkRepository;
pub use stats_repository::StatsRepository;

#[cfg(test)]
pub use link_repository::MockLinkRepository;
#[cfg(test)]
pub use stats_repository::MockStatsRepository;
