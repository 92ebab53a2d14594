use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use campus_events_api_types::{ClubJoinRequest, ClubJoinResponse, ClubMembership};
use serde::Deserialize;
use tracing::info;

use crate::store::EventStore;
use crate::utils::error::AppError;
use crate::AppState;

fn attendee_not_found() -> AppError {
    AppError::NotFound("Attendee not found".to_string())
}

async fn club_for_organizer(store: &dyn EventStore, organizer_id: i32) -> Result<i32, AppError> {
    store
        .club_id_for_organizer(organizer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Club not found for organizer".to_string()))
}

/// Maps an id that is either an attendee id or a user id onto an attendee id.
///
/// With `create_for_user`, a user of an attendee type that has no attendee row yet gets a minimal
/// one.
pub(crate) async fn resolve_attendee(
    store: &dyn EventStore,
    id: i32,
    create_for_user: bool,
) -> Result<i32, AppError> {
    if store.attendee_exists(id).await? {
        return Ok(id);
    }
    if let Some(attendee_id) = store.attendee_id_for_user(id).await? {
        return Ok(attendee_id);
    }
    if !create_for_user {
        return Err(attendee_not_found());
    }

    match store.user(id).await? {
        Some(user) if user.is_attendee() => {
            let attendee_id = store
                .create_attendee_for_user(user.user_id)
                .await?
                .ok_or_else(attendee_not_found)?;
            info!(user_id = user.user_id, attendee_id, "Created attendee record for user");
            Ok(attendee_id)
        }
        _ => Err(attendee_not_found()),
    }
}

pub async fn join_club(
    State(state): State<AppState>,
    payload: Result<Json<ClubJoinRequest>, JsonRejection>,
) -> Result<Json<ClubJoinResponse>, AppError> {
    let Json(request) = payload?;
    let store = state.store.as_ref();

    let attendee_id = request
        .attendee_id
        .ok_or_else(|| AppError::ValidationError("attendee_id is required".to_string()))?;
    let club_id = match (request.club_id, request.organizer_id) {
        (Some(club_id), _) => club_id,
        (None, Some(organizer_id)) => club_for_organizer(store, organizer_id).await?,
        (None, None) => {
            return Err(AppError::ValidationError(
                "club_id or organizer_id required".to_string(),
            ))
        }
    };

    let attendee_id = resolve_attendee(store, attendee_id, true).await?;
    store
        .add_club_member(club_id, attendee_id, request.remind_required)
        .await?;
    info!(club_id, attendee_id, "Attendee joined club");

    Ok(Json(ClubJoinResponse {
        success: true,
        club_id,
        attendee_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ClubCheckParams {
    organizer_id: Option<i32>,
    attendee_id: Option<i32>,
}

pub async fn check_membership(
    State(state): State<AppState>,
    query: Result<Query<ClubCheckParams>, QueryRejection>,
) -> Result<Json<ClubMembership>, AppError> {
    let Query(params) = query?;
    let (Some(organizer_id), Some(attendee_id)) = (params.organizer_id, params.attendee_id) else {
        return Err(AppError::ValidationError(
            "organizer_id and attendee_id are required".to_string(),
        ));
    };

    let club_id = club_for_organizer(state.store.as_ref(), organizer_id).await?;
    let joined = state.store.is_club_member(club_id, attendee_id).await?;
    Ok(Json(ClubMembership { club_id, joined }))
}
