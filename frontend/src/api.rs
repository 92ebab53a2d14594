use campus_events_api_types::{
    Building, BuildingLabel, Category, ClubJoinRequest, ClubJoinResponse, ClubMembership,
    ClubSignup, CreateEventRequest, CreatedEvent, Event, EventFilterRequest, HealthStatus,
    LocationInfo, LoginRequest, LoginResponse, NamedOrganizer, OrganizerDetail,
    OrganizerSummary, PartitionedEvents, PersonSignup, SavePreferencesRequest, SavedPreferences,
    SchoolSignup, SignupResponse, UserProfile,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },
}

/// `{success, data, message}` wrapper used by the write routes.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Pulls a readable message out of an error body: `{error: {message}}`, `{message}` or raw text.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// HTTP client for the `/api` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:3000/api`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base,
        })
    }

    /// Appends percent-encoded path segments to the base url.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        Self::read(self.http.get(url).send().await?).await
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST");
        Self::read(self.http.post(url).json(body).send().await?).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get(&["health"]).await
    }

    pub async fn events(&self) -> Result<Vec<Event>, ClientError> {
        self.get(&["events"]).await
    }

    pub async fn event(&self, event_id: i32) -> Result<Event, ClientError> {
        self.get(&["events", &event_id.to_string()]).await
    }

    pub async fn create_event(&self, request: &CreateEventRequest) -> Result<i64, ClientError> {
        let created: Envelope<CreatedEvent> = self.post(&["events"], request).await?;
        Ok(created.data.event_id)
    }

    pub async fn filter_events(
        &self,
        request: &EventFilterRequest,
    ) -> Result<PartitionedEvents, ClientError> {
        self.post(&["events", "filter"], request).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        self.get(&["categories"]).await
    }

    pub async fn locations(&self) -> Result<Vec<LocationInfo>, ClientError> {
        self.get(&["locations"]).await
    }

    pub async fn buildings(&self) -> Result<Vec<Building>, ClientError> {
        self.get(&["buildings"]).await
    }

    pub async fn building_labels(&self, building: &str) -> Result<Vec<BuildingLabel>, ClientError> {
        self.get(&["buildings", building, "labels"]).await
    }

    pub async fn organizers(&self) -> Result<Vec<OrganizerSummary>, ClientError> {
        self.get(&["organizers"]).await
    }

    pub async fn all_organizers(&self) -> Result<Vec<NamedOrganizer>, ClientError> {
        self.get(&["all-organizers"]).await
    }

    pub async fn organizer(&self, organizer_id: i32) -> Result<OrganizerDetail, ClientError> {
        self.get(&["organizers", &organizer_id.to_string()]).await
    }

    pub async fn organizer_events(&self, organizer_id: i32) -> Result<Vec<Event>, ClientError> {
        self.get(&["organizers", &organizer_id.to_string(), "events"])
            .await
    }

    pub async fn join_club(
        &self,
        request: &ClubJoinRequest,
    ) -> Result<ClubJoinResponse, ClientError> {
        self.post(&["clubs", "join"], request).await
    }

    pub async fn check_club(
        &self,
        organizer_id: i32,
        attendee_id: i32,
    ) -> Result<ClubMembership, ClientError> {
        let mut url = self.endpoint(&["clubs", "check"])?;
        url.query_pairs_mut()
            .append_pair("organizer_id", &organizer_id.to_string())
            .append_pair("attendee_id", &attendee_id.to_string());
        Self::read(self.http.get(url).send().await?).await
    }

    pub async fn user(&self, user_id: i32) -> Result<UserProfile, ClientError> {
        self.get(&["users", &user_id.to_string()]).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        self.post(&["login"], request).await
    }

    pub async fn signup_attendee(
        &self,
        request: &PersonSignup,
    ) -> Result<SignupResponse, ClientError> {
        self.post(&["signup", "attendee"], request).await
    }

    pub async fn signup_student(
        &self,
        request: &PersonSignup,
    ) -> Result<SignupResponse, ClientError> {
        self.post(&["signup", "student"], request).await
    }

    pub async fn signup_club(&self, request: &ClubSignup) -> Result<SignupResponse, ClientError> {
        self.post(&["signup", "club"], request).await
    }

    pub async fn signup_school(
        &self,
        request: &SchoolSignup,
    ) -> Result<SignupResponse, ClientError> {
        self.post(&["signup", "school"], request).await
    }

    pub async fn save_preferences(
        &self,
        request: &SavePreferencesRequest,
    ) -> Result<SavedPreferences, ClientError> {
        let saved: Envelope<SavedPreferences> = self.post(&["save-preferences"], request).await?;
        Ok(saved.data)
    }
}
