//! In-process link store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{Link, LinkPatch, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    links: BTreeMap<i64, Link>,
    /// Hash to id, live links only.
    live_hashes: HashMap<String, i64>,
    live_count: i64,
    next_id: i64,
}

impl Inner {
    fn live_hash_holder(&self, hash: &str) -> Option<&Link> {
        self.live_hashes
            .get(hash)
            .and_then(|id| self.links.get(id))
    }
}

/// Link repository backed by an ordered map.
///
/// Mirrors the PostgreSQL semantics: ids increase monotonically and a hash
/// is unique among live links only.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    inner: RwLock<Inner>,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn hash_conflict(hash: &str) -> AppError {
    AppError::conflict(
        "Database constraint violation",
        json!({ "constraint": "links_hash_live_idx", "hash": hash }),
    )
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let mut inner = self.inner.write().await;

        if inner.live_hash_holder(&new_link.hash).is_some() {
            return Err(hash_conflict(&new_link.hash));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let link = Link {
            id: inner.next_id,
            original_url: new_link.original_url,
            hash: new_link.hash,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.live_hashes.insert(link.hash.clone(), link.id);
        inner.links.insert(link.id, link.clone());
        inner.live_count += 1;

        Ok(link)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self.inner.read().await.links.get(&id).cloned())
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<Link>, AppError> {
        Ok(self.inner.read().await.live_hash_holder(hash).cloned())
    }

    async fn exists_by_hash(&self, hash: &str) -> Result<bool, AppError> {
        Ok(self.inner.read().await.live_hash_holder(hash).is_some())
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<Link, AppError> {
        let mut inner = self.inner.write().await;

        if let Some(hash) = &patch.hash
            && inner.live_hash_holder(hash).is_some_and(|l| l.id != id)
        {
            return Err(hash_conflict(hash));
        }

        let Inner {
            links,
            live_hashes,
            ..
        } = &mut *inner;

        let link = links
            .get_mut(&id)
            .filter(|l| l.deleted_at.is_none())
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": id })))?;

        if let Some(url) = patch.original_url {
            link.original_url = url;
        }
        if let Some(hash) = patch.hash {
            live_hashes.remove(&link.hash);
            live_hashes.insert(hash.clone(), link.id);
            link.hash = hash;
        }
        link.updated_at = Utc::now();

        Ok(link.clone())
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;

        let Inner {
            links,
            live_hashes,
            live_count,
            ..
        } = &mut *inner;

        match links.get_mut(&id) {
            Some(link) if link.deleted_at.is_none() => {
                let now = Utc::now();
                link.deleted_at = Some(now);
                link.updated_at = now;
                live_hashes.remove(&link.hash);
                *live_count -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Link>, AppError> {
        let inner = self.inner.read().await;

        Ok(inner
            .links
            .values()
            .rev()
            .filter(|l| l.deleted_at.is_none())
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.inner.read().await.live_count)
    }
}
