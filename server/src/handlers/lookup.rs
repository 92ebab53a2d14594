use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use campus_events_api_types::{Building, BuildingLabel, Category, LocationInfo};

use crate::utils::error::AppError;
use crate::AppState;

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.store.categories().await?))
}

pub async fn list_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<LocationInfo>>, AppError> {
    Ok(Json(state.store.locations().await?))
}

pub async fn list_buildings(
    State(state): State<AppState>,
) -> Result<Json<Vec<Building>>, AppError> {
    Ok(Json(state.store.buildings().await?))
}

/// An unknown building has no labels; that is not an error.
pub async fn building_labels(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<BuildingLabel>>, AppError> {
    let Path(building) = path?;
    Ok(Json(state.store.building_labels(&building).await?))
}
