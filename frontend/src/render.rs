use askama::Template;
use campus_events_api_types::{Event, EventType};
use chrono::NaiveTime;
use rust_decimal::Decimal;

use crate::store::ViewMode;

const CARD_CATEGORY_LIMIT: usize = 2;

#[derive(Template)]
#[template(path = "event_card.html")]
pub struct EventCardTemplate {
    event_id: i32,
    view_class: &'static str,
    type_class: &'static str,
    type_label: &'static str,
    cost_class: &'static str,
    cost_label: String,
    title: String,
    description: String,
    date_label: String,
    time_label: String,
    location_label: String,
    organizer_label: String,
    categories: Vec<String>,
}

impl EventCardTemplate {
    pub fn new(event: &Event, view: ViewMode) -> Self {
        Self {
            event_id: event.event_id,
            view_class: view.css_class(),
            type_class: type_class(event.event_type),
            type_label: event.event_type.label(),
            cost_class: if event.cost.is_zero() { "free" } else { "paid" },
            cost_label: format_cost(event.cost),
            title: event.title.clone(),
            description: event.description.clone(),
            date_label: event.start_date.format("%b %-d, %Y").to_string(),
            time_label: format!(
                "{} - {}",
                format_time(Some(event.start_time)),
                format_time(Some(event.end_time))
            ),
            location_label: event.location.label.clone(),
            organizer_label: organizer_label(event),
            categories: event
                .categories
                .iter()
                .take(CARD_CATEGORY_LIMIT)
                .cloned()
                .collect(),
        }
    }
}

fn type_class(event_type: EventType) -> &'static str {
    match event_type {
        EventType::OnCampus => "on-campus",
        EventType::Online => "online",
        EventType::OffCampus => "off-campus",
    }
}

/// 12 hour clock, e.g. "2:05 PM". Missing times show as "TBD".
pub fn format_time(time: Option<NaiveTime>) -> String {
    time.map(|t| t.format("%-I:%M %p").to_string())
        .unwrap_or_else(|| "TBD".to_string())
}

pub fn format_cost(cost: Decimal) -> String {
    if cost.is_zero() {
        "Free".to_string()
    } else {
        format!("${}", cost.normalize())
    }
}

fn organizer_label(event: &Event) -> String {
    if event.organizer.is_empty() {
        return "TBA".to_string();
    }
    event
        .organizer
        .iter()
        .map(|o| o.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders one card per event, in the given order.
pub fn render_cards<'a>(
    events: impl IntoIterator<Item = &'a Event>,
    view: ViewMode,
) -> Result<String, askama::Error> {
    let mut html = String::new();
    for event in events {
        html.push_str(&EventCardTemplate::new(event, view).render()?);
        html.push('\n');
    }
    Ok(html)
}
