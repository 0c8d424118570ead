//! API route configuration.

use crate::api::handlers::{
    create_link_handler, delete_link_handler, health_handler, list_links_handler,
    redirect_handler, stats_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes.
///
/// # Endpoints
///
/// - `GET    /link/{hash}`  - Redirect to the original URL (307)
/// - `POST   /link`         - Create a short link
/// - `GET    /link`         - List live links (`limit`, `offset`)
/// - `PATCH  /link/{id}`    - Partially update a link
/// - `DELETE /link/{id}`    - Soft-delete a link
/// - `GET    /stats`        - Clicks by day or month over a date range
/// - `GET    /health`       - Storage and event bus status
///
/// `/link/{key}` is a hash for `GET` and a numeric id for `PATCH`/`DELETE`;
/// the router needs one parameter name per path segment.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/link", post(create_link_handler).get(list_links_handler))
        .route(
            "/link/{key}",
            get(redirect_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
}
