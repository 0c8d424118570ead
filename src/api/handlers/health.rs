//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Storage**: Counts live links
/// 2. **Event bus**: Open (a consumer is attached), reports queue depth
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "storage": { "status": "ok", "message": "Reachable, 12 live links" },
///     "event_bus": { "status": "ok", "message": "Queued: 0/10000, subscribers: 1" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let storage = check_storage(&state).await;
    let event_bus = check_event_bus(&state);

    let all_healthy = storage.is_ok() && event_bus.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { storage, event_bus },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_storage(state: &AppState) -> CheckStatus {
    match state.link_service.count_links().await {
        Ok(count) => CheckStatus::ok(format!("Reachable, {count} live links")),
        Err(e) => CheckStatus::error(format!("Storage error: {e}")),
    }
}

fn check_event_bus(state: &AppState) -> CheckStatus {
    let bus = &state.event_bus;

    if bus.is_closed() {
        return CheckStatus::error("Event bus is closed, no click consumer attached");
    }

    CheckStatus::ok(format!(
        "Queued: {}/{}, subscribers: {}",
        bus.queued(),
        bus.max_capacity(),
        bus.subscriber_count()
    ))
}
