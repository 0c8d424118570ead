//! Link creation, resolution and maintenance service.

use std::sync::Arc;

use serde_json::json;
use url::Url;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::event::Event;
use crate::domain::event_bus::EventBus;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::hash_generator::{ensure_unique_hash, is_valid_hash};

/// Requested changes to an existing link.
#[derive(Debug, Clone, Default)]
pub struct UpdateLink {
    pub url: Option<String>,
    pub hash: Option<String>,
    pub regenerate_hash: bool,
}

impl UpdateLink {
    fn is_empty(&self) -> bool {
        self.url.is_none() && self.hash.is_none() && !self.regenerate_hash
    }
}

/// Service for creating, resolving and maintaining short links.
///
/// Every hash it hands out goes through
/// [`ensure_unique_hash`](crate::utils::hash_generator::ensure_unique_hash)
/// against the live link set. Lifecycle changes are announced on the
/// [`EventBus`] as [`Event::LinkCreated`] and [`Event::LinkDeleted`].
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    events: EventBus,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>, events: EventBus) -> Self {
        Self {
            link_repository,
            events,
        }
    }

    /// Creates a short link for `url` with a freshly generated hash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL is not an absolute
    /// HTTP(S) URL.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create_link(&self, url: String) -> Result<Link, AppError> {
        let original_url = parse_destination(&url)?;
        let hash = self.unique_hash().await?;

        let link = self
            .link_repository
            .create(NewLink { original_url, hash })
            .await?;

        tracing::info!(link_id = link.id, hash = %link.hash, "Short link created");
        self.events
            .publish_detached(Event::LinkCreated { link_id: link.id });

        Ok(link)
    }

    /// Resolves a hash to its live link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no live link holds the hash.
    pub async fn resolve(&self, hash: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_hash(hash)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "hash": hash })))
    }

    /// Changes the destination and/or hash of a live link.
    ///
    /// A supplied `hash` must have the generated shape and must not be held by
    /// another live link. `regenerate_hash` draws a new unique hash instead.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the link does not exist or is deleted
    /// - [`AppError::Validation`] for an empty request, a bad URL or hash, or
    ///   when both `hash` and `regenerate_hash` are given
    /// - [`AppError::Conflict`] if the requested hash is taken
    pub async fn update_link(&self, id: i64, update: UpdateLink) -> Result<Link, AppError> {
        if update.is_empty() {
            return Err(AppError::bad_request(
                "Nothing to update",
                json!({ "fields": ["url", "hash", "regenerate_hash"] }),
            ));
        }

        if update.hash.is_some() && update.regenerate_hash {
            return Err(AppError::bad_request(
                "Specify either hash or regenerate_hash, not both",
                json!({ "fields": ["hash", "regenerate_hash"] }),
            ));
        }

        let current = self.live_link(id).await?;
        let mut patch = LinkPatch::default();

        if let Some(url) = update.url {
            patch.original_url = Some(parse_destination(&url)?);
        }

        if let Some(hash) = update.hash {
            if !is_valid_hash(&hash) {
                return Err(AppError::bad_request(
                    "Invalid hash",
                    json!({ "hash": hash, "reason": "expected 12 characters from [0-9A-Za-z]" }),
                ));
            }

            if hash != current.hash {
                if self.link_repository.exists_by_hash(&hash).await? {
                    return Err(AppError::conflict(
                        "Hash is already in use",
                        json!({ "hash": hash }),
                    ));
                }
                patch.hash = Some(hash);
            }
        } else if update.regenerate_hash {
            patch.hash = Some(self.unique_hash().await?);
        }

        if patch.is_empty() {
            return Ok(current);
        }

        let link = self.link_repository.update(id, patch).await?;
        tracing::info!(link_id = link.id, hash = %link.hash, "Short link updated");

        Ok(link)
    }

    /// Soft-deletes a link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist or is
    /// already deleted.
    pub async fn delete_link(&self, id: i64) -> Result<(), AppError> {
        if !self.link_repository.soft_delete(id).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "id": id }),
            ));
        }

        tracing::info!(link_id = id, "Short link deleted");
        self.events.publish_detached(Event::LinkDeleted { link_id: id });

        Ok(())
    }

    /// Returns one page of live links (newest first) and the live total.
    pub async fn list_links(&self, limit: i64, offset: i64) -> Result<(Vec<Link>, i64), AppError> {
        let links = self.link_repository.list(limit, offset).await?;
        let count = self.link_repository.count().await?;

        Ok((links, count))
    }

    /// Counts live links. Also used as the storage reachability check.
    pub async fn count_links(&self) -> Result<i64, AppError> {
        self.link_repository.count().await
    }

    async fn live_link(&self, id: i64) -> Result<Link, AppError> {
        match self.link_repository.find_by_id(id).await? {
            Some(link) if !link.is_deleted() => Ok(link),
            _ => Err(AppError::not_found(
                "Short link not found",
                json!({ "id": id }),
            )),
        }
    }

    async fn unique_hash(&self) -> Result<String, AppError> {
        ensure_unique_hash(|candidate| {
            let repository = self.link_repository.clone();
            async move { repository.exists_by_hash(&candidate).await }
        })
        .await
    }
}

/// Accepts absolute `http`/`https` URLs with a host.
fn parse_destination(raw: &str) -> Result<String, AppError> {
    let invalid = |reason: &str| {
        AppError::bad_request(
            "Invalid URL format",
            json!({ "url": raw, "reason": reason }),
        )
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("only http and https are allowed"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event_bus::OverflowPolicy;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::hash_generator::HASH_LENGTH;
    use chrono::Utc;
    use std::time::Duration;

    fn create_test_link(id: i64, hash: &str, url: &str) -> Link {
        let now = Utc::now();
        Link {
            id,
            original_url: url.to_string(),
            hash: hash.to_string(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn service(repo: MockLinkRepository) -> (LinkService<MockLinkRepository>, EventBus) {
        let bus = EventBus::new(16, OverflowPolicy::Block);
        (LinkService::new(Arc::new(repo), bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_create_link_success() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_exists_by_hash()
            .times(1)
            .returning(|_| Ok(false));
        mock_repo
            .expect_create()
            .withf(|new_link| {
                new_link.original_url == "https://example.com/"
                    && new_link.hash.len() == HASH_LENGTH
            })
            .times(1)
            .returning(|new_link| Ok(create_test_link(10, &new_link.hash, &new_link.original_url)));

        let (service, bus) = service(mock_repo);
        let mut sub = bus.subscribe();

        let link = service
            .create_link("https://example.com".to_string())
            .await
            .unwrap();

        assert_eq!(link.id, 10);
        assert!(is_valid_hash(&link.hash));

        let event = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .unwrap();
        assert_eq!(event, Some(Event::LinkCreated { link_id: 10 }));
    }

    #[tokio::test]
    async fn test_create_link_retries_on_collision() {
        let mut mock_repo = MockLinkRepository::new();
        let mut calls = 0;

        mock_repo
            .expect_exists_by_hash()
            .times(3)
            .returning(move |_| {
                calls += 1;
                Ok(calls < 3)
            });
        mock_repo
            .expect_create()
            .times(1)
            .returning(|new_link| Ok(create_test_link(1, &new_link.hash, &new_link.original_url)));

        let (service, _bus) = service(mock_repo);

        assert!(service
            .create_link("https://example.com/a".to_string())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_create_link_invalid_url() {
        let (service, _bus) = service(MockLinkRepository::new());

        for bad in ["not-a-url", "ftp://example.com/file", "javascript:alert(1)"] {
            let result = service.create_link(bad.to_string()).await;
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_create_link_store_failure_propagates() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_exists_by_hash()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        mock_repo.expect_create().never();

        let (service, _bus) = service(mock_repo);
        let result = service.create_link("https://example.com".to_string()).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_hash()
            .withf(|hash| hash == "missing00000")
            .times(1)
            .returning(|_| Ok(None));

        let (service, _bus) = service(mock_repo);
        let result = service.resolve("missing00000").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_link_custom_hash_conflict() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(create_test_link(id, "aaaaaaaaaaaa", "https://a.com/"))));
        mock_repo
            .expect_exists_by_hash()
            .withf(|hash| hash == "bbbbbbbbbbbb")
            .times(1)
            .returning(|_| Ok(true));
        mock_repo.expect_update().never();

        let (service, _bus) = service(mock_repo);
        let result = service
            .update_link(
                1,
                UpdateLink {
                    hash: Some("bbbbbbbbbbbb".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_link_rejects_malformed_hash() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(create_test_link(id, "aaaaaaaaaaaa", "https://a.com/"))));

        let (service, _bus) = service(mock_repo);
        let result = service
            .update_link(
                1,
                UpdateLink {
                    hash: Some("short".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_update_link_regenerates_hash() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(create_test_link(id, "aaaaaaaaaaaa", "https://a.com/"))));
        mock_repo
            .expect_exists_by_hash()
            .times(1)
            .returning(|_| Ok(false));
        mock_repo
            .expect_update()
            .withf(|id, patch| {
                *id == 1
                    && patch.original_url.is_none()
                    && patch.hash.as_deref().is_some_and(is_valid_hash)
            })
            .times(1)
            .returning(|id, patch| {
                Ok(create_test_link(
                    id,
                    &patch.hash.unwrap_or_default(),
                    "https://a.com/",
                ))
            });

        let (service, _bus) = service(mock_repo);
        let link = service
            .update_link(
                1,
                UpdateLink {
                    regenerate_hash: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(link.hash, "aaaaaaaaaaaa");
    }

    #[tokio::test]
    async fn test_update_link_same_hash_is_noop() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(create_test_link(id, "aaaaaaaaaaaa", "https://a.com/"))));
        mock_repo.expect_exists_by_hash().never();
        mock_repo.expect_update().never();

        let (service, _bus) = service(mock_repo);
        let link = service
            .update_link(
                1,
                UpdateLink {
                    hash: Some("aaaaaaaaaaaa".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(link.hash, "aaaaaaaaaaaa");
    }

    #[tokio::test]
    async fn test_update_deleted_link_not_found() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_id().returning(|id| {
            let mut link = create_test_link(id, "aaaaaaaaaaaa", "https://a.com/");
            link.deleted_at = Some(Utc::now());
            Ok(Some(link))
        });

        let (service, _bus) = service(mock_repo);
        let result = service
            .update_link(
                1,
                UpdateLink {
                    url: Some("https://b.com".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_link_requires_changes() {
        let (service, _bus) = service(MockLinkRepository::new());

        let empty = service.update_link(1, UpdateLink::default()).await;
        assert!(matches!(empty, Err(AppError::Validation { .. })));

        let both = service
            .update_link(
                1,
                UpdateLink {
                    hash: Some("aaaaaaaaaaaa".to_string()),
                    regenerate_hash: true,
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(both, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_delete_link_publishes_event() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_soft_delete()
            .with(mockall::predicate::eq(7))
            .times(1)
            .returning(|_| Ok(true));

        let (service, bus) = service(mock_repo);
        let mut sub = bus.subscribe();

        service.delete_link(7).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .unwrap();
        assert_eq!(event, Some(Event::LinkDeleted { link_id: 7 }));
    }

    #[tokio::test]
    async fn test_delete_missing_link() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_soft_delete().returning(|_| Ok(false));

        let (service, _bus) = service(mock_repo);

        assert!(matches!(
            service.delete_link(99).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_links_returns_page_and_count() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_list()
            .with(mockall::predicate::eq(2), mockall::predicate::eq(0))
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    create_test_link(3, "cccccccccccc", "https://c.com/"),
                    create_test_link(2, "bbbbbbbbbbbb", "https://b.com/"),
                ])
            });
        mock_repo.expect_count().times(1).returning(|| Ok(3));

        let (service, _bus) = service(mock_repo);
        let (links, count) = service.list_links(2, 0).await.unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].id, 3);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_parse_destination_normalizes() {
        assert_eq!(
            parse_destination("  https://Example.com/path?q=1 ").unwrap(),
            "https://example.com/path?q=1"
        );
    }
}
