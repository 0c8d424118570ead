//! Repository trait for short link data access.

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// Lookups by hash, listing and counting only consider live links
/// (`deleted_at IS NULL`). Lookups by id also return soft-deleted rows so
/// callers can tell "deleted" from "never existed".
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryLinkRepository`] - in-process maps
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Creates a new short link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a live link already holds the hash.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by id, including soft-deleted links.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds a live link by its hash.
    async fn find_by_hash(&self, hash: &str) -> Result<Option<Link>, AppError>;

    /// Returns true if a live link holds `hash`.
    async fn exists_by_hash(&self, hash: &str) -> Result<bool, AppError>;

    /// Applies a partial update to a live link and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no live link has this id.
    /// Returns [`AppError::Conflict`] if the new hash is already taken.
    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError>;

    /// Soft-deletes a link by setting `deleted_at = now()`.
    ///
    /// Returns `Ok(false)` if the link was not found or already deleted.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists live links, newest id first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError>;

    /// Counts live links.
    async fn count(&self) -> Result<i64, AppError>;
}
