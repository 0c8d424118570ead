//! Handlers for link management endpoints (create, update, delete, list).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::link::{
    CreateLinkRequest, LinkListResponse, LinkResponse, ListParams, UpdateLinkRequest,
};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /link`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/page" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the URL is invalid.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateLinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.create_link(payload.url).await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Partially updates a link.
///
/// # Endpoint
///
/// `PATCH /link/{id}`
///
/// # Request Body
///
/// ```json
/// { "url": "https://new.example.com", "hash": "Abc123XYZ789" }
/// ```
///
/// or `{ "regenerate_hash": true }` to draw a new random hash.
///
/// # Errors
///
/// - 400 Bad Request on invalid input
/// - 404 Not Found if the link does not exist or is deleted
/// - 409 Conflict if the requested hash is taken
pub async fn update_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let id = parse_id(&id)?;
    payload.validate()?;

    let link = state.link_service.update_link(id, payload.into()).await?;

    Ok(Json(link.into()))
}

/// Soft-deletes a link.
///
/// # Endpoint
///
/// `DELETE /link/{id}`
///
/// # Response
///
/// 204 No Content on success, 404 if the link does not exist.
pub async fn delete_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;

    state.link_service.delete_link(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Lists live links, newest first.
///
/// # Endpoint
///
/// `GET /link?limit=20&offset=0`
///
/// # Response
///
/// ```json
/// { "links": [{ "id": 2, "hash": "...", "original_url": "..." }], "count": 2 }
/// ```
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (limit, offset) = params.validate_and_get_limit_offset().map_err(|e| {
        AppError::bad_request(e, json!({ "limit": params.limit, "offset": params.offset }))
    })?;

    let (links, count) = state.link_service.list_links(limit, offset).await?;

    Ok(Json(LinkListResponse {
        links: links.into_iter().map(LinkResponse::from).collect(),
        count,
    }))
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::bad_request("Invalid link id", json!({ "id": raw })))
}
