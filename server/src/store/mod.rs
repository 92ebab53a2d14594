//! Database interface of the server.
//!
//! Route handlers talk to an [EventStore] trait object held in the application state. The
//! production implementation ([mysql::MySqlStore]) wraps a sqlx MySQL connection pool; each method
//! runs one query or one stored routine call and returns plain rows. Combining rows into API
//! documents happens in the handlers, so it can be exercised against the in-memory
//! [mock::StoreMock] in unit tests.

use async_trait::async_trait;
use campus_events_api_types::{
    Building, BuildingLabel, Category, ClubSignup, LocationInfo, PersonSignup, SchoolSignup,
};

use crate::models::event::{
    EventCategoryRow, EventLocationRow, EventOrganizerRow, EventRow, EventSelection,
};
use crate::models::organizer::{NamedOrganizerRow, OrganizerDetailRow, OrganizerRow};
use crate::models::user::UserRow;
use crate::procedures::{FilterArgs, ParamCounts, UploadEventArgs};

#[cfg(test)]
pub mod mock;
pub mod mysql;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// A signup request, dispatched to the procedure of its variant.
#[derive(Debug, Clone, Copy)]
pub enum Signup<'a> {
    Attendee(&'a PersonSignup),
    StudentOrganizer(&'a PersonSignup),
    Club(&'a ClubSignup),
    School(&'a SchoolSignup),
}

impl Signup<'_> {
    pub fn email(&self) -> Option<&str> {
        match self {
            Signup::Attendee(s) | Signup::StudentOrganizer(s) => s.email.as_deref(),
            Signup::Club(s) => s.email.as_deref(),
            Signup::School(s) => s.email.as_deref(),
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            Signup::Attendee(s) | Signup::StudentOrganizer(s) => s.password.as_deref(),
            Signup::Club(s) => s.password.as_deref(),
            Signup::School(s) => s.password.as_deref(),
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Round trip to the database.
    async fn ping(&self) -> StoreResult<()>;

    /// `None` if no routine of that name exists in the current schema.
    async fn routine_params(&self, name: &str) -> StoreResult<Option<ParamCounts>>;

    // events

    /// Base rows, newest first (by start date, then start time).
    async fn event_rows(&self, selection: &EventSelection) -> StoreResult<Vec<EventRow>>;
    async fn event_organizers(&self, event_ids: &[i32]) -> StoreResult<Vec<EventOrganizerRow>>;
    async fn event_categories(&self, event_ids: &[i32]) -> StoreResult<Vec<EventCategoryRow>>;
    async fn event_locations(&self, event_ids: &[i32]) -> StoreResult<Vec<EventLocationRow>>;
    /// Ids of organizers whose club, school or student name is one of `names`.
    async fn organizer_ids_by_name(&self, names: &[String]) -> StoreResult<Vec<i32>>;
    /// Event ids returned by the `filter_events` procedure.
    async fn filter_event_ids(&self, args: &FilterArgs) -> StoreResult<Vec<i32>>;
    /// Calls `uploadEvent` and returns the generated event id.
    async fn upload_event(&self, args: &UploadEventArgs) -> StoreResult<Option<i64>>;

    // lookup data

    async fn categories(&self) -> StoreResult<Vec<Category>>;
    async fn locations(&self) -> StoreResult<Vec<LocationInfo>>;
    async fn buildings(&self) -> StoreResult<Vec<Building>>;
    async fn building_labels(&self, building: &str) -> StoreResult<Vec<BuildingLabel>>;

    // organizers and users

    async fn organizers(&self) -> StoreResult<Vec<OrganizerRow>>;
    async fn named_organizers(&self) -> StoreResult<Vec<NamedOrganizerRow>>;
    async fn organizer_detail(&self, organizer_id: i32) -> StoreResult<Option<OrganizerDetailRow>>;
    async fn user(&self, user_id: i32) -> StoreResult<Option<UserRow>>;

    // clubs and preferences

    async fn club_id_for_organizer(&self, organizer_id: i32) -> StoreResult<Option<i32>>;
    async fn attendee_exists(&self, attendee_id: i32) -> StoreResult<bool>;
    async fn attendee_id_for_user(&self, user_id: i32) -> StoreResult<Option<i32>>;
    /// Creates a minimal attendee row from the user account and returns its id.
    async fn create_attendee_for_user(&self, user_id: i32) -> StoreResult<Option<i32>>;
    /// Insert-ignore; joining twice leaves one membership row.
    async fn add_club_member(
        &self,
        club_id: i32,
        attendee_id: i32,
        remind_required: bool,
    ) -> StoreResult<()>;
    async fn is_club_member(&self, club_id: i32, attendee_id: i32) -> StoreResult<bool>;
    async fn save_category_preferences(
        &self,
        attendee_id: i32,
        category_ids: &[i32],
    ) -> StoreResult<()>;
    /// Joins the clubs (if needed) with reminders switched on.
    async fn save_club_reminders(&self, attendee_id: i32, club_ids: &[i32]) -> StoreResult<()>;

    // accounts

    /// User id for valid credentials, as decided by `fn_user_login`.
    async fn login(&self, email: &str, password: &str) -> StoreResult<Option<i32>>;
    /// Runs the signup procedure and returns its status message.
    async fn signup(&self, signup: Signup<'_>) -> StoreResult<Option<String>>;
    /// `false` if no user has that email.
    async fn set_attendee_major(&self, email: &str, major: &str) -> StoreResult<bool>;
}
