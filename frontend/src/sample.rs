//! Built-in events shown when the backend cannot be reached.

use campus_events_api_types::{Event, EventOrganizer, EventType, Location, OrganizerType};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

struct SampleEvent {
    event_id: i32,
    title: &'static str,
    description: &'static str,
    date: (i32, u32, u32),
    hours: (u32, u32),
    building: &'static str,
    label: &'static str,
    organizer: (i32, &'static str, OrganizerType),
    categories: &'static [&'static str],
    event_type: EventType,
    cost: i64,
}

const SAMPLE_EVENTS: &[SampleEvent] = &[
    SampleEvent {
        event_id: 1,
        title: "AI and Machine Learning Workshop Series",
        description: "Hands-on sessions covering neural networks, model training and deployment.",
        date: (2024, 12, 15),
        hours: (14, 16),
        building: "Innovation Center",
        label: "Innovation Center",
        organizer: (1, "AI Research Club", OrganizerType::Club),
        categories: &["technology", "workshop", "ai"],
        event_type: EventType::OnCampus,
        cost: 0,
    },
    SampleEvent {
        event_id: 2,
        title: "Data Science Fundamentals Workshop",
        description: "An introduction to data analysis, visualization and statistics with Python.",
        date: (2024, 12, 18),
        hours: (10, 12),
        building: "Library",
        label: "Library, Room 205",
        organizer: (2, "Data Science Society", OrganizerType::Club),
        categories: &["data science", "workshop", "academic"],
        event_type: EventType::OnCampus,
        cost: 5,
    },
    SampleEvent {
        event_id: 3,
        title: "Virtual Career Fair",
        description: "Meet recruiters from technology and consulting firms from your laptop.",
        date: (2024, 12, 20),
        hours: (9, 15),
        building: "Online",
        label: "Online",
        organizer: (3, "Career Services", OrganizerType::School),
        categories: &["career", "networking"],
        event_type: EventType::Online,
        cost: 0,
    },
    SampleEvent {
        event_id: 4,
        title: "Kunshan Heritage Walking Tour",
        description: "A guided afternoon through the old town with a local historian.",
        date: (2025, 1, 10),
        hours: (13, 17),
        building: "Zhouzhuang Water Town",
        label: "Zhouzhuang Water Town",
        organizer: (4, "Cultural Exchange Club", OrganizerType::Club),
        categories: &["culture", "social"],
        event_type: EventType::OffCampus,
        cost: 15,
    },
];

fn to_event(sample: &SampleEvent) -> Option<Event> {
    let (year, month, day) = sample.date;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let (organizer_id, name, organizer_type) = sample.organizer;
    Some(Event {
        event_id: sample.event_id,
        title: sample.title.to_string(),
        description: sample.description.to_string(),
        start_date: date,
        end_date: date,
        start_time: NaiveTime::from_hms_opt(sample.hours.0, 0, 0)?,
        end_time: NaiveTime::from_hms_opt(sample.hours.1, 0, 0)?,
        location: Location {
            building: sample.building.to_string(),
            label: sample.label.to_string(),
            capacity: None,
        },
        organizer: vec![EventOrganizer {
            organizer_id,
            name: name.to_string(),
            organizer_type,
            contact: String::new(),
        }],
        categories: sample.categories.iter().map(|c| c.to_string()).collect(),
        event_type: sample.event_type,
        cost: Decimal::from(sample.cost),
        max_participants: None,
        application_required: false,
        perks: None,
        flyer: None,
        online_link: None,
        application_deadline: None,
    })
}

pub fn sample_events() -> Vec<Event> {
    SAMPLE_EVENTS.iter().filter_map(to_event).collect()
}
