use axum::http::Request;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::config::request_id::X_REQUEST_ID;
use crate::config::{create_cors_layer, create_request_id_layer};
use crate::handlers::{auth, clubs, events, health_check, lookup, organizers, preferences, users};
use crate::AppState;

#[cfg(test)]
mod tests;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/filter", post(events::filter_events))
        .route("/events/:id", get(events::get_event))
        .route("/categories", get(lookup::list_categories))
        .route("/locations", get(lookup::list_locations))
        .route("/buildings", get(lookup::list_buildings))
        .route("/buildings/:building/labels", get(lookup::building_labels))
        .route("/organizers", get(organizers::list_organizers))
        .route("/all-organizers", get(organizers::all_organizers))
        .route("/organizers/:id", get(organizers::get_organizer))
        .route("/organizers/:id/events", get(events::organizer_events))
        .route("/clubs/join", post(clubs::join_club))
        .route("/clubs/check", get(clubs::check_membership))
        .route("/users/:id", get(users::get_user))
        .route("/login", post(auth::login))
        .route("/signup/attendee", post(auth::signup_attendee))
        .route("/signup/student", post(auth::signup_student))
        .route("/signup/club", post(auth::signup_club))
        .route("/signup/school", post(auth::signup_school))
        .route("/save-preferences", post(preferences::save_preferences))
}

pub fn create_routes(state: AppState, production: bool) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let request_id = request
            .headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
        .layer(trace_layer)
        .layer(create_request_id_layer())
        .layer(create_cors_layer(production))
}
