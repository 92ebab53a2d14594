use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use campus_events_api_types::{NamedOrganizer, OrganizerDetail, OrganizerSummary};
use tracing::warn;

use crate::models::organizer::sort_by_name;
use crate::utils::error::AppError;
use crate::AppState;

pub async fn list_organizers(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrganizerSummary>>, AppError> {
    let mut organizers = Vec::new();
    for row in state.store.organizers().await? {
        let organizer_id = row.organizer_id;
        match OrganizerSummary::try_from(row) {
            Ok(organizer) => organizers.push(organizer),
            Err(e) => warn!(organizer_id, error = %e, "Skipping organizer"),
        }
    }
    Ok(Json(organizers))
}

/// Organizers with a displayable name, alphabetically.
pub async fn all_organizers(
    State(state): State<AppState>,
) -> Result<Json<Vec<NamedOrganizer>>, AppError> {
    let mut organizers = Vec::new();
    for row in state.store.named_organizers().await? {
        let organizer_id = row.organizer_id;
        match row.into_named() {
            Ok(Some(organizer)) => organizers.push(organizer),
            Ok(None) => {}
            Err(e) => warn!(organizer_id, error = %e, "Skipping organizer"),
        }
    }
    sort_by_name(&mut organizers);
    Ok(Json(organizers))
}

pub async fn get_organizer(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<OrganizerDetail>, AppError> {
    let Path(organizer_id) = path?;
    let row = state
        .store
        .organizer_detail(organizer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organizer not found".to_string()))?;
    Ok(Json(OrganizerDetail::try_from(row)?))
}
