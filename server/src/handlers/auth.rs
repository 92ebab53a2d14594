//! Account routes. Credentials are checked and accounts created by stored routines; the handlers
//! validate the input and relay the routine results.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campus_events_api_types::{
    ClubSignup, LoginRequest, LoginResponse, PersonSignup, SchoolSignup, SignupResponse,
};
use tracing::{info, warn};

use crate::handlers::non_blank;
use crate::store::{EventStore, Signup};
use crate::utils::error::AppError;
use crate::AppState;

const UNKNOWN_RESULT: &str = "Unknown result";

fn missing_credentials() -> AppError {
    AppError::ValidationError("Email and password are required.".to_string())
}

fn starts_with_ignore_case(message: &str, prefix: &str) -> bool {
    message
        .trim_start()
        .get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}

/// 409 for messages starting with "error", 200 otherwise.
fn relay(message: String) -> Response {
    let status = if starts_with_ignore_case(&message, "error") {
        StatusCode::CONFLICT
    } else {
        StatusCode::OK
    };
    (status, Json(SignupResponse { message })).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(request) = payload?;
    let (Some(email), Some(password)) = (non_blank(&request.email), non_blank(&request.password))
    else {
        return Err(missing_credentials());
    };

    match state.store.login(email.trim(), password).await? {
        Some(user_id) => {
            info!(user_id, "User logged in");
            Ok(Json(LoginResponse {
                success: true,
                user_id,
            }))
        }
        None => Err(AppError::AuthError("Invalid email or password.".to_string())),
    }
}

/// Runs the signup procedure and returns its message, or the placeholder when it reported none.
async fn run_signup(store: &dyn EventStore, signup: Signup<'_>) -> Result<String, AppError> {
    let present = |value: Option<&str>| value.map_or(false, |v| !v.trim().is_empty());
    if !present(signup.email()) || !present(signup.password()) {
        return Err(missing_credentials());
    }

    let message = store
        .signup(signup)
        .await?
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_RESULT.to_string());
    info!(email = signup.email().unwrap_or_default(), %message, "Signup procedure finished");
    Ok(message)
}

/// Attendee and student organizer signups also record the major on the attendee row.
async fn person_signup(
    store: &dyn EventStore,
    signup: Signup<'_>,
    person: &PersonSignup,
) -> Result<Response, AppError> {
    let mut message = run_signup(store, signup).await?;

    if let (Some(email), Some(major)) = (non_blank(&person.email), non_blank(&person.major)) {
        if starts_with_ignore_case(&message, "success") {
            match store.set_attendee_major(email, major.trim()).await {
                Ok(true) => message.push_str(" Major recorded."),
                Ok(false) => message.push_str(" (Could not find user to set major)"),
                Err(e) => {
                    warn!(error = %e, "Failed to set major for new user");
                    message.push_str(" (Failed to save major)");
                }
            }
        }
    }

    Ok(relay(message))
}

pub async fn signup_attendee(
    State(state): State<AppState>,
    payload: Result<Json<PersonSignup>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    person_signup(state.store.as_ref(), Signup::Attendee(&request), &request).await
}

pub async fn signup_student(
    State(state): State<AppState>,
    payload: Result<Json<PersonSignup>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    person_signup(
        state.store.as_ref(),
        Signup::StudentOrganizer(&request),
        &request,
    )
    .await
}

pub async fn signup_club(
    State(state): State<AppState>,
    payload: Result<Json<ClubSignup>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let message = run_signup(state.store.as_ref(), Signup::Club(&request)).await?;
    Ok(relay(message))
}

pub async fn signup_school(
    State(state): State<AppState>,
    payload: Result<Json<SchoolSignup>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let message = run_signup(state.store.as_ref(), Signup::School(&request)).await?;
    Ok(relay(message))
}
