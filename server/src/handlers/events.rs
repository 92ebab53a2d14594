use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use campus_events_api_types::{
    CreateEventRequest, CreatedEvent, Event, EventFilterRequest, PartitionedEvents,
};
use chrono::Local;
use std::collections::HashSet;
use tracing::{debug, info};

use crate::models::event::{assemble_events, EventRelations, EventSelection};
use crate::procedures::{FilterArgs, UploadEventArgs};
use crate::store::EventStore;
use crate::utils::error::AppError;
use crate::utils::response::created;
use crate::AppState;

/// Fetches the selected events together with their organizers, categories and locations.
pub(crate) async fn load_events(
    store: &dyn EventStore,
    selection: EventSelection,
) -> Result<Vec<Event>, AppError> {
    let rows = store.event_rows(&selection).await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = rows.iter().map(|r| r.event_id).collect();
    let (organizers, categories, locations) = tokio::try_join!(
        store.event_organizers(&ids),
        store.event_categories(&ids),
        store.event_locations(&ids),
    )?;

    Ok(assemble_events(
        rows,
        EventRelations {
            organizers,
            categories,
            locations,
        },
    ))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    let events = load_events(state.store.as_ref(), EventSelection::All).await?;
    debug!(count = events.len(), "Fetched events");
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Event>, AppError> {
    let Path(event_id) = path?;
    load_events(state.store.as_ref(), EventSelection::ById(event_id))
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let args = UploadEventArgs::try_from(request)?;

    let event_id = state.store.upload_event(&args).await?.ok_or_else(|| {
        AppError::InternalServerError("uploadEvent returned no event id".to_string())
    })?;
    info!(event_id, title = %args.title, "Event created");

    Ok(created(CreatedEvent { event_id }, "Event created successfully"))
}

fn dedup_ids(ids: Vec<i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

pub async fn filter_events(
    State(state): State<AppState>,
    payload: Result<Json<EventFilterRequest>, JsonRejection>,
) -> Result<Json<PartitionedEvents>, AppError> {
    let Json(request) = payload?;
    let store = state.store.as_ref();

    let organizer_ids = if request.organizers.is_empty() {
        None
    } else {
        let ids = store.organizer_ids_by_name(&request.organizers).await?;
        if ids.is_empty() {
            debug!(organizers = ?request.organizers, "No organizer matches the given names");
            return Ok(Json(PartitionedEvents::default()));
        }
        Some(ids)
    };

    let args = FilterArgs::new(&request, organizer_ids.as_deref());
    let event_ids = dedup_ids(store.filter_event_ids(&args).await?);
    if event_ids.is_empty() {
        return Ok(Json(PartitionedEvents::default()));
    }

    let events = load_events(store, EventSelection::ByIds(event_ids)).await?;
    let partitioned = PartitionedEvents::partition(events, Local::now().naive_local());
    debug!(
        upcoming = partitioned.upcoming.len(),
        past = partitioned.past.len(),
        "Filtered events"
    );
    Ok(Json(partitioned))
}

pub async fn organizer_events(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<Vec<Event>>, AppError> {
    let Path(organizer_id) = path?;
    let selection = EventSelection::ByOrganizer(organizer_id);
    let events = load_events(state.store.as_ref(), selection).await?;
    Ok(Json(events))
}
