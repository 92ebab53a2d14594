use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use campus_events_api_types::{SavePreferencesRequest, SavedPreferences};
use std::collections::BTreeSet;
use tracing::info;

use crate::handlers::clubs::resolve_attendee;
use crate::utils::error::AppError;
use crate::utils::response::success;
use crate::AppState;

fn distinct(ids: &[i32]) -> Vec<i32> {
    ids.iter()
        .copied()
        .filter(|id| *id > 0)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Stores notification preferences: followed categories and clubs with reminders.
pub async fn save_preferences(
    State(state): State<AppState>,
    payload: Result<Json<SavePreferencesRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let store = state.store.as_ref();

    let attendee_id = request
        .attendee_id
        .ok_or_else(|| AppError::ValidationError("attendee_id is required".to_string()))?;
    let category_ids = distinct(&request.category_ids);
    let club_ids = distinct(&request.club_ids);
    if category_ids.is_empty() && club_ids.is_empty() {
        return Err(AppError::ValidationError(
            "category_ids or club_ids must not be empty".to_string(),
        ));
    }

    let attendee_id = resolve_attendee(store, attendee_id, false).await?;
    store
        .save_category_preferences(attendee_id, &category_ids)
        .await?;
    store.save_club_reminders(attendee_id, &club_ids).await?;
    info!(
        attendee_id,
        categories = category_ids.len(),
        clubs = club_ids.len(),
        "Saved preferences"
    );

    let saved = SavedPreferences {
        categories_saved: category_ids.len() as u64,
        clubs_saved: club_ids.len() as u64,
    };
    Ok(success(saved, "Preferences saved successfully"))
}
