use axum::extract::State;
use axum::Json;
use campus_events_api_types::HealthStatus;
use chrono::Utc;
use tracing::warn;

use crate::AppState;

pub mod auth;
pub mod clubs;
pub mod events;
pub mod lookup;
pub mod organizers;
pub mod preferences;
pub mod users;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let connected = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check could not reach the database");
            false
        }
    };

    Json(HealthStatus {
        status: if connected { "healthy" } else { "unhealthy" }.to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        timestamp: Utc::now(),
    })
}

/// `None` for missing and whitespace-only strings.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
