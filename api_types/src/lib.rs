use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod de;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    OnCampus,
    Online,
    OffCampus,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OnCampus => "on_campus",
            EventType::Online => "online",
            EventType::OffCampus => "off_campus",
        }
    }

    /// Human readable form, e.g. "On Campus".
    pub fn label(&self) -> &'static str {
        match self {
            EventType::OnCampus => "On Campus",
            EventType::Online => "Online",
            EventType::OffCampus => "Off Campus",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for EventType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The schema has used both spellings over time.
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "on_campus" => Ok(EventType::OnCampus),
            "online" => Ok(EventType::Online),
            "off_campus" => Ok(EventType::OffCampus),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizerType {
    Student,
    Club,
    School,
}

impl FromStr for OrganizerType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(OrganizerType::Student),
            "club" => Ok(OrganizerType::Club),
            "school" => Ok(OrganizerType::School),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub building: String,
    pub label: String,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOrganizer {
    pub organizer_id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub organizer_type: OrganizerType,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: i32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: Location,
    #[serde(default)]
    pub organizer: Vec<EventOrganizer>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub event_type: EventType,
    pub cost: Decimal,
    pub max_participants: Option<i32>,
    pub application_required: bool,
    pub perks: Option<String>,
    /// Base64 encoded flyer image
    #[serde(default)]
    pub flyer: Option<String>,
    #[serde(default)]
    pub online_link: Option<String>,
    #[serde(default)]
    pub application_deadline: Option<NaiveDate>,
}

impl Event {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.start_date.and_time(self.start_time)
    }
}

/// Events split around the current time, as returned by the filter endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartitionedEvents {
    pub upcoming: Vec<Event>,
    pub past: Vec<Event>,
}

impl PartitionedEvents {
    /// Events starting strictly after `now` are upcoming, all others are past. Relative order
    /// within each bucket is preserved.
    pub fn partition(events: Vec<Event>, now: NaiveDateTime) -> Self {
        let (upcoming, past) = events.into_iter().partition(|e| e.starts_at() > now);
        Self { upcoming, past }
    }

    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilterRequest {
    #[serde(
        default,
        deserialize_with = "de::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "de::lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "de::from_str_lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_type: Option<EventType>,
    #[serde(default, deserialize_with = "de::string_list")]
    pub categories: Vec<String>,
    /// Organizer display names
    #[serde(default, deserialize_with = "de::string_list")]
    pub organizers: Vec<String>,
    /// Location labels
    #[serde(default, deserialize_with = "de::string_list")]
    pub locations: Vec<String>,
}

/// Flat payload of the event creation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEventRequest {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub perks: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_i32")]
    pub max_participants: Option<i32>,
    #[serde(default, deserialize_with = "de::lenient_i32")]
    pub application_required: Option<i32>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub application_link: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_date")]
    pub application_deadline: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub flyer_url: Option<String>,
    #[serde(default, deserialize_with = "de::from_str_lenient")]
    pub event_type: Option<EventType>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub online_link: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub building: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::lenient_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::lenient_time")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "de::lenient_time")]
    pub end_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "de::lenient_decimal")]
    pub cost: Option<Decimal>,
    #[serde(default, deserialize_with = "de::lenient_i32")]
    pub organizer_id: Option<i32>,
    #[serde(default, deserialize_with = "de::id_list")]
    pub collaborating_organizers: Vec<i32>,
    #[serde(default, deserialize_with = "de::id_list")]
    pub category_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub event_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: i32,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub building: String,
    pub label: String,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub building: String,
    pub label_count: i64,
    pub max_capacity: Option<i32>,
    /// Comma separated labels, alphabetical
    pub all_labels: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingLabel {
    pub location_id: i32,
    pub label: String,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizerSummary {
    pub organizer_id: i32,
    pub organizer_type: OrganizerType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedOrganizer {
    pub organizer_id: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub organizer_type: OrganizerType,
}

/// Organizer profile. Which optional fields are present depends on the organizer type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizerDetail {
    pub organizer_id: i32,
    #[serde(rename = "type")]
    pub organizer_type: OrganizerType,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub club_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supervisor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i32,
    pub user_type: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: i32,
}

/// Signup payload for attendees and student organizers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonSignup {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub last_name: Option<String>,
    #[serde(default, rename = "netId", deserialize_with = "de::blank_as_none")]
    pub net_id: Option<String>,
    #[serde(default, rename = "gradYear", deserialize_with = "de::lenient_i32")]
    pub grad_year: Option<i32>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub major: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClubSignup {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub club_name: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub club_url: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub contact_email: Option<String>,
    #[serde(default, rename = "yearFounded", deserialize_with = "de::lenient_i32")]
    pub year_founded: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchoolSignup {
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::blank_as_none")]
    pub supervisor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClubJoinRequest {
    #[serde(default, deserialize_with = "de::lenient_i32")]
    pub attendee_id: Option<i32>,
    #[serde(default, deserialize_with = "de::lenient_i32")]
    pub club_id: Option<i32>,
    #[serde(default, deserialize_with = "de::lenient_i32")]
    pub organizer_id: Option<i32>,
    #[serde(default)]
    pub remind_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubJoinResponse {
    pub success: bool,
    pub club_id: i32,
    pub attendee_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubMembership {
    pub club_id: i32,
    pub joined: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavePreferencesRequest {
    #[serde(default, deserialize_with = "de::lenient_i32")]
    pub attendee_id: Option<i32>,
    #[serde(default, deserialize_with = "de::id_list")]
    pub category_ids: Vec<i32>,
    #[serde(default, deserialize_with = "de::id_list")]
    pub club_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPreferences {
    pub categories_saved: u64,
    pub clubs_saved: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
