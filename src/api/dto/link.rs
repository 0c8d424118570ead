//! DTOs for the link CRUD endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

use crate::application::services::UpdateLink;
use crate::domain::entities::Link;

/// Request body for `POST /link`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// The destination URL (must be absolute HTTP/HTTPS).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

/// Request body for `PATCH /link/{id}`.
///
/// All fields are optional; only provided fields are changed.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLinkRequest {
    /// New destination URL.
    #[validate(url(message = "Invalid URL format"))]
    pub url: Option<String>,

    /// Explicit new hash (12 characters from `[0-9A-Za-z]`).
    #[validate(length(equal = 12, message = "Hash must be 12 characters"))]
    pub hash: Option<String>,

    /// Draw a fresh random hash.
    #[serde(default)]
    pub regenerate_hash: bool,
}

impl From<UpdateLinkRequest> for UpdateLink {
    fn from(req: UpdateLinkRequest) -> Self {
        UpdateLink {
            url: req.url,
            hash: req.hash,
            regenerate_hash: req.regenerate_hash,
        }
    }
}

/// A link as returned by the API.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: i64,
    pub hash: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            hash: link.hash,
            original_url: link.original_url,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Response for `GET /link`.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub links: Vec<LinkResponse>,
    /// Total number of live links, independent of the page.
    pub count: i64,
}

/// Query parameters for `GET /link`.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,
}

impl ListParams {
    pub const DEFAULT_LIMIT: i64 = 20;
    pub const MAX_LIMIT: i64 = 100;

    /// Validates the parameters and returns `(limit, offset)`.
    ///
    /// # Defaults
    ///
    /// - `limit`: 20 (allowed `1..=100`)
    /// - `offset`: 0 (must not be negative)
    pub fn validate_and_get_limit_offset(&self) -> Result<(i64, i64), String> {
        let limit = self.limit.unwrap_or(Self::DEFAULT_LIMIT);
        let offset = self.offset.unwrap_or(0);

        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(format!("Limit must be between 1 and {}", Self::MAX_LIMIT));
        }

        if offset < 0 {
            return Err("Offset must not be negative".to_string());
        }

        Ok((limit, offset))
    }
}
