//! Async side of the client: loads data, runs filters and feeds the results into the
//! [AppStore] as actions.

use async_trait::async_trait;
use campus_events_api_types::{
    Category, Event, EventFilterRequest, HealthStatus, LocationInfo, NamedOrganizer,
    PartitionedEvents,
};
use chrono::Local;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::api::{ApiClient, ClientError};
use crate::filter::Filters;
use crate::sample::sample_events;
use crate::sort::SortOrder;
use crate::store::{Action, AppStore, DataSource, Lookups, Notification, ViewMode};

/// The backend calls the event browser needs.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn health(&self) -> Result<HealthStatus, ClientError>;
    async fn events(&self) -> Result<Vec<Event>, ClientError>;
    async fn filter_events(
        &self,
        request: &EventFilterRequest,
    ) -> Result<PartitionedEvents, ClientError>;
    async fn categories(&self) -> Result<Vec<Category>, ClientError>;
    async fn locations(&self) -> Result<Vec<LocationInfo>, ClientError>;
    async fn organizers(&self) -> Result<Vec<NamedOrganizer>, ClientError>;
}

#[async_trait]
impl EventSource for ApiClient {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        ApiClient::health(self).await
    }

    async fn events(&self) -> Result<Vec<Event>, ClientError> {
        ApiClient::events(self).await
    }

    async fn filter_events(
        &self,
        request: &EventFilterRequest,
    ) -> Result<PartitionedEvents, ClientError> {
        ApiClient::filter_events(self, request).await
    }

    async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        ApiClient::categories(self).await
    }

    async fn locations(&self) -> Result<Vec<LocationInfo>, ClientError> {
        ApiClient::locations(self).await
    }

    async fn organizers(&self) -> Result<Vec<NamedOrganizer>, ClientError> {
        ApiClient::all_organizers(self).await
    }
}

fn or_notify<T: Default>(store: &mut AppStore, what: &str, result: Result<T, ClientError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load {}", what);
        store.dispatch(Action::Notify(Notification::error(format!(
            "Could not load {}",
            what
        ))));
        T::default()
    })
}

pub struct EventBrowser<S> {
    source: S,
    store: AppStore,
}

impl<S: EventSource> EventBrowser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            store: AppStore::new(),
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn dispatch(&mut self, action: Action) {
        self.store.dispatch(action);
    }

    fn load_sample_data(&mut self) {
        self.store.dispatch(Action::EventsLoaded {
            events: sample_events(),
            source: DataSource::Sample,
            now: Local::now().naive_local(),
        });
        self.store.dispatch(Action::Notify(Notification::info(
            "Server unavailable, showing sample events",
        )));
    }

    /// Probes the backend and loads everything the page needs, or the sample events when the
    /// backend is unreachable.
    pub async fn init(&mut self) {
        self.store.dispatch(Action::SetLoading(true));

        let healthy = match self.source.health().await {
            Ok(status) if status.is_healthy() => true,
            Ok(status) => {
                warn!(database = %status.database, "Backend reports unhealthy database");
                false
            }
            Err(e) => {
                warn!(error = %e, "Backend health check failed");
                false
            }
        };
        if !healthy {
            self.load_sample_data();
            return;
        }

        let (events, categories, locations, organizers) = tokio::join!(
            self.source.events(),
            self.source.categories(),
            self.source.locations(),
            self.source.organizers(),
        );

        let events = match events {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "Failed to load events");
                self.store.dispatch(Action::Notify(Notification::error(
                    "Could not load events from the server",
                )));
                self.load_sample_data();
                return;
            }
        };
        info!(count = events.len(), "Loaded events");

        let lookups = Lookups {
            categories: or_notify(&mut self.store, "categories", categories),
            locations: or_notify(&mut self.store, "locations", locations),
            organizers: or_notify(&mut self.store, "organizers", organizers),
        };
        self.store.dispatch(Action::LookupsLoaded(lookups));
        self.store.dispatch(Action::EventsLoaded {
            events,
            source: DataSource::Live,
            now: Local::now().naive_local(),
        });
    }

    /// Evaluates `filters` remotely when live, falling back to local filtering on failure.
    pub async fn apply_filters(&mut self, filters: Filters) {
        self.store.dispatch(Action::SetFilters(filters.clone()));
        if filters.is_empty() {
            self.store.dispatch(Action::ClearFilters);
            return;
        }

        let filtered = match self.store.source() {
            DataSource::Sample => filters.apply(self.store.events()),
            DataSource::Live => {
                self.store.dispatch(Action::SetLoading(true));
                match self.source.filter_events(&filters.to_request()).await {
                    Ok(result) => result
                        .upcoming
                        .into_iter()
                        .chain(result.past)
                        .filter(|e| filters.matches_client_side(e))
                        .collect(),
                    Err(e) => {
                        warn!(error = %e, "Remote filtering failed, filtering locally");
                        self.store.dispatch(Action::Notify(Notification::error(
                            "Filtering on the server failed, showing local results",
                        )));
                        filters.apply(self.store.events())
                    }
                }
            }
        };
        self.store.dispatch(Action::FilterApplied(filtered));
    }

    pub async fn search(&mut self, text: &str) {
        let filters = Filters {
            search: text.to_string(),
            ..self.store.filters().clone()
        };
        self.apply_filters(filters).await;
    }

    /// Waits for the next settled search text, e.g. from a [crate::debounce::Debouncer] fed by
    /// the search input, and applies it. Returns `false` once the input side is gone.
    pub async fn next_search(&mut self, searches: &mut UnboundedReceiver<String>) -> bool {
        match searches.recv().await {
            Some(text) => {
                self.search(&text).await;
                true
            }
            None => false,
        }
    }

    pub fn sort_by(&mut self, sort: SortOrder) {
        self.store.dispatch(Action::SetSort(sort));
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.store.dispatch(Action::SetView(view));
    }

    pub fn load_more(&mut self) {
        self.store.dispatch(Action::LoadMore);
    }

    pub fn render(&self) -> Result<String, askama::Error> {
        self.store.render()
    }
}
