use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use campus_events_api_types::{Event, EventOrganizer, EventType, Location};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

use crate::models::organizer::{parse_organizer_type, OrganizerNames};

pub const DEFAULT_BUILDING: &str = "TBD";
pub const DEFAULT_LOCATION_LABEL: &str = "Location TBD";
pub const DEFAULT_ORGANIZER_CONTACT: &str = "events@dku.edu";
pub const UNKNOWN_ORGANIZER: &str = "Unknown";

/// One event joined with its timeslot, application and online link.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventRow {
    pub event_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub perks: Option<String>,
    pub max_participants: Option<i32>,
    pub application_required: Option<i8>,
    pub event_type: String,
    pub cost: Option<Decimal>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub application_deadline: Option<NaiveDate>,
    pub online_link: Option<String>,
    pub flyer: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventOrganizerRow {
    pub event_id: i32,
    pub organizer_id: i32,
    pub organizer_type: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub names: OrganizerNames,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventCategoryRow {
    pub event_id: i32,
    pub category_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventLocationRow {
    pub event_id: i32,
    pub location_id: i32,
    pub building: String,
    pub label: String,
    pub capacity: Option<i32>,
}

/// Which events a base-row query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSelection {
    All,
    ById(i32),
    ByIds(Vec<i32>),
    ByOrganizer(i32),
}

/// Related rows of a batch of events, keyed by event id.
#[derive(Debug, Default)]
pub struct EventRelations {
    pub organizers: Vec<EventOrganizerRow>,
    pub categories: Vec<EventCategoryRow>,
    pub locations: Vec<EventLocationRow>,
}

fn group_by_event<T>(rows: Vec<T>, key: impl Fn(&T) -> i32) -> HashMap<i32, Vec<T>> {
    let mut grouped: HashMap<i32, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

/// Builds the nested event documents from base rows and their related rows.
///
/// The base row order is kept. Organizers are deduplicated by id, categories by name (and
/// sorted), and the location is the linked location with the lowest id. Unreadable enum values
/// are logged and confined to their own row.
pub fn assemble_events(rows: Vec<EventRow>, relations: EventRelations) -> Vec<Event> {
    let mut organizers = group_by_event(relations.organizers, |r| r.event_id);
    let mut categories = group_by_event(relations.categories, |r| r.event_id);
    let mut locations = group_by_event(relations.locations, |r| r.event_id);

    rows.into_iter()
        .map(|row| {
            let id = row.event_id;
            assemble_event(
                row,
                organizers.remove(&id).unwrap_or_default(),
                categories.remove(&id).unwrap_or_default(),
                locations.remove(&id).unwrap_or_default(),
            )
        })
        .collect()
}

fn assemble_event(
    row: EventRow,
    organizer_rows: Vec<EventOrganizerRow>,
    category_rows: Vec<EventCategoryRow>,
    location_rows: Vec<EventLocationRow>,
) -> Event {
    let event_type = row.event_type.parse().unwrap_or_else(|e| {
        warn!(event_id = row.event_id, error = %e, "Unreadable event type, using on_campus");
        EventType::OnCampus
    });

    let mut seen = BTreeSet::new();
    let mut organizer = Vec::with_capacity(organizer_rows.len());
    for r in organizer_rows {
        if !seen.insert(r.organizer_id) {
            continue;
        }
        let organizer_type = match parse_organizer_type(&r.organizer_type) {
            Ok(organizer_type) => organizer_type,
            Err(e) => {
                warn!(
                    event_id = row.event_id,
                    organizer_id = r.organizer_id,
                    error = %e,
                    "Skipping event organizer"
                );
                continue;
            }
        };
        organizer.push(EventOrganizer {
            organizer_id: r.organizer_id,
            name: r
                .names
                .display_name(Some(organizer_type))
                .unwrap_or_else(|| UNKNOWN_ORGANIZER.to_string()),
            organizer_type,
            contact: r
                .names
                .email
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ORGANIZER_CONTACT.to_string()),
        });
    }

    let categories: Vec<String> = category_rows
        .into_iter()
        .map(|r| r.category_name)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let first_location = location_rows.into_iter().min_by_key(|l| l.location_id);
    let location = Location {
        building: first_location
            .as_ref()
            .map(|l| l.building.clone())
            .unwrap_or_else(|| DEFAULT_BUILDING.to_string()),
        label: first_location
            .map(|l| l.label)
            .unwrap_or_else(|| DEFAULT_LOCATION_LABEL.to_string()),
        capacity: row.max_participants,
    };

    Event {
        event_id: row.event_id,
        title: row.title,
        description: row.description.unwrap_or_default(),
        start_date: row.start_date,
        end_date: row.end_date,
        start_time: row.start_time,
        end_time: row.end_time,
        location,
        organizer,
        categories,
        event_type,
        cost: row.cost.unwrap_or(Decimal::ZERO),
        max_participants: row.max_participants,
        application_required: row.application_required == Some(1),
        perks: row.perks,
        flyer: row.flyer.filter(|f| !f.is_empty()).map(|f| BASE64.encode(f)),
        online_link: row.online_link,
        application_deadline: row.application_deadline,
    }
}
