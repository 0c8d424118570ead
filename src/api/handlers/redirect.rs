//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use serde_json::json;
use tracing::{debug, error};

use crate::domain::event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::hash_generator::is_valid_hash;

/// Redirects a short hash to its original URL.
///
/// # Endpoint
///
/// `GET /link/{hash}`
///
/// # Click Tracking
///
/// A [`ClickEvent`] is published from a detached task after the link is
/// resolved. The response never waits for the event bus, so a full or slow
/// bus delays or drops clicks instead of redirects.
///
/// # Errors
///
/// Returns 404 Not Found if no live link holds the hash. Storage failures
/// are logged and also answered with 404.
pub async fn redirect_handler(
    Path(hash): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    if !is_valid_hash(&hash) {
        debug!(hash = %hash, "Rejecting malformed hash");
        return Err(not_found(&hash));
    }

    let link = match state.link_service.resolve(&hash).await {
        Ok(link) => link,
        Err(e @ AppError::NotFound { .. }) => return Err(e),
        Err(e) => {
            error!(hash = %hash, error = %e, "Link lookup failed");
            return Err(not_found(&hash));
        }
    };

    state
        .event_bus
        .publish_detached(ClickEvent::new(link.id).into());

    Ok(Redirect::temporary(&link.original_url))
}

fn not_found(hash: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "hash": hash }))
}
