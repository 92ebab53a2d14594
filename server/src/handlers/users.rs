use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use campus_events_api_types::UserProfile;

use crate::utils::error::AppError;
use crate::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<UserProfile>, AppError> {
    let Path(user_id) = path?;
    state
        .store
        .user(user_id)
        .await?
        .map(|row| Json(row.into()))
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
