//! Client state. Every change goes through [AppStore::dispatch], the async work that produces the
//! actions lives in [crate::controller].

use campus_events_api_types::{Category, Event, LocationInfo, NamedOrganizer, PartitionedEvents};
use chrono::NaiveDateTime;
use std::collections::VecDeque;

use crate::filter::Filters;
use crate::render::render_cards;
use crate::sort::SortOrder;

pub const PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataSource {
    #[default]
    Live,
    /// The backend was unreachable at startup, built-in events are shown.
    Sample,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn css_class(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Options offered by the filter controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lookups {
    pub categories: Vec<Category>,
    pub locations: Vec<LocationInfo>,
    pub organizers: Vec<NamedOrganizer>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetLoading(bool),
    /// Replaces all events and shows them unfiltered.
    EventsLoaded {
        events: Vec<Event>,
        source: DataSource,
        now: NaiveDateTime,
    },
    LookupsLoaded(Lookups),
    SetFilters(Filters),
    /// Result of evaluating the current filters, locally or remotely.
    FilterApplied(Vec<Event>),
    ClearFilters,
    SetSort(SortOrder),
    SetView(ViewMode),
    LoadMore,
    Notify(Notification),
    DismissNotification,
}

#[derive(Debug, Clone, Default)]
pub struct AppStore {
    events: Vec<Event>,
    upcoming: Vec<Event>,
    past: Vec<Event>,
    filtered: Vec<Event>,
    filters: Filters,
    sort: SortOrder,
    view: ViewMode,
    page: usize,
    loading: bool,
    source: DataSource,
    lookups: Lookups,
    notifications: VecDeque<Notification>,
}

impl AppStore {
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SetLoading(loading) => self.loading = loading,
            Action::EventsLoaded {
                events,
                source,
                now,
            } => {
                let split = PartitionedEvents::partition(events.clone(), now);
                self.upcoming = split.upcoming;
                self.past = split.past;
                self.filtered = events.clone();
                self.events = events;
                self.source = source;
                self.filters = Filters::default();
                self.page = 1;
                self.loading = false;
            }
            Action::LookupsLoaded(lookups) => self.lookups = lookups,
            Action::SetFilters(filters) => self.filters = filters,
            Action::FilterApplied(events) => {
                self.filtered = events;
                self.page = 1;
                self.loading = false;
            }
            Action::ClearFilters => {
                self.filters = Filters::default();
                self.filtered = self.events.clone();
                self.page = 1;
            }
            Action::SetSort(sort) => {
                self.sort = sort;
                self.page = 1;
            }
            Action::SetView(view) => self.view = view,
            Action::LoadMore => {
                if self.has_more() {
                    self.page += 1;
                }
            }
            Action::Notify(notification) => self.notifications.push_back(notification),
            Action::DismissNotification => {
                self.notifications.pop_front();
            }
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn upcoming(&self) -> &[Event] {
        &self.upcoming
    }

    pub fn past(&self) -> &[Event] {
        &self.past
    }

    pub fn filtered(&self) -> &[Event] {
        &self.filtered
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn lookups(&self) -> &Lookups {
        &self.lookups
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    fn visible_len(&self) -> usize {
        (self.page * PAGE_SIZE).min(self.filtered.len())
    }

    /// The sorted filtered events up to the current page.
    pub fn visible(&self) -> Vec<&Event> {
        let mut sorted = self.sort.sorted(&self.filtered);
        sorted.truncate(self.visible_len());
        sorted
    }

    pub fn has_more(&self) -> bool {
        self.visible_len() < self.filtered.len()
    }

    pub fn results_summary(&self) -> String {
        match self.filtered.len() {
            0 => "No events found".to_string(),
            n if n == self.events.len() => format!("Showing all {} events", n),
            n => format!("Showing {} filtered events", n),
        }
    }

    pub fn render(&self) -> Result<String, askama::Error> {
        render_cards(self.visible(), self.view)
    }
}
