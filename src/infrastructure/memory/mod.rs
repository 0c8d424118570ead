//! In-memory repository implementations.
//!
//! Used with `STORAGE_BACKEND=memory` and by the HTTP tests. State lives in
//! `tokio::sync::RwLock`-guarded maps and is lost on restart.

pub mod link_repository;
pub mod stats_repository;

pub use link_repository::InMemoryLinkRepository;
pub use stats_repository::InMemoryStatsRepository;
