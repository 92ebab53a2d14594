use campus_events_api_types::{Event, EventFilterRequest, EventType};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Active filter selection. Empty lists and `None` bounds do not constrain anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub search: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub event_types: Vec<EventType>,
    pub categories: Vec<String>,
    /// Organizer display names
    pub organizers: Vec<String>,
    /// Location labels
    pub locations: Vec<String>,
    pub min_cost: Option<Decimal>,
    pub max_cost: Option<Decimal>,
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.trim().eq_ignore_ascii_case(value.trim()))
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        *self == Filters::default()
    }

    fn search_term(&self) -> Option<String> {
        let term = self.search.trim();
        (!term.is_empty()).then(|| term.to_lowercase())
    }

    fn matches_search(&self, event: &Event) -> bool {
        let Some(term) = self.search_term() else {
            return true;
        };
        event.title.to_lowercase().contains(&term)
            || event.description.to_lowercase().contains(&term)
            || event
                .organizer
                .iter()
                .any(|o| o.name.to_lowercase().contains(&term))
    }

    fn matches_dates(&self, event: &Event) -> bool {
        self.start_date.map_or(true, |from| event.start_date >= from)
            && self.end_date.map_or(true, |to| event.start_date <= to)
    }

    fn matches_type(&self, event: &Event) -> bool {
        self.event_types.is_empty() || self.event_types.contains(&event.event_type)
    }

    fn matches_categories(&self, event: &Event) -> bool {
        self.categories.is_empty()
            || event
                .categories
                .iter()
                .any(|c| contains_ignore_case(&self.categories, c))
    }

    fn matches_organizers(&self, event: &Event) -> bool {
        self.organizers.is_empty()
            || event
                .organizer
                .iter()
                .any(|o| contains_ignore_case(&self.organizers, &o.name))
    }

    fn matches_locations(&self, event: &Event) -> bool {
        self.locations.is_empty() || contains_ignore_case(&self.locations, &event.location.label)
    }

    fn matches_cost(&self, event: &Event) -> bool {
        self.min_cost.map_or(true, |min| event.cost >= min)
            && self.max_cost.map_or(true, |max| event.cost <= max)
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.matches_search(event)
            && self.matches_dates(event)
            && self.matches_type(event)
            && self.matches_categories(event)
            && self.matches_organizers(event)
            && self.matches_locations(event)
            && self.matches_cost(event)
    }

    /// The part of the filter the remote filter endpoint cannot evaluate.
    pub fn matches_client_side(&self, event: &Event) -> bool {
        self.matches_search(event) && self.matches_cost(event) && self.matches_type(event)
    }

    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        events.iter().filter(|e| self.matches(e)).cloned().collect()
    }

    /// Request for `POST /api/events/filter`. The route takes a single event type, so a multi-type
    /// selection is left to [Filters::matches_client_side].
    pub fn to_request(&self) -> EventFilterRequest {
        let event_type = match self.event_types.as_slice() {
            [only] => Some(*only),
            _ => None,
        };
        EventFilterRequest {
            start_date: self.start_date,
            end_date: self.end_date,
            event_type,
            categories: self.categories.clone(),
            organizers: self.organizers.clone(),
            locations: self.locations.clone(),
        }
    }
}
