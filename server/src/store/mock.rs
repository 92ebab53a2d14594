use async_trait::async_trait;
use campus_events_api_types::{Building, BuildingLabel, Category, LocationInfo};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::models::event::{
    EventCategoryRow, EventLocationRow, EventOrganizerRow, EventRow, EventSelection,
};
use crate::models::organizer::{NamedOrganizerRow, OrganizerDetailRow, OrganizerRow};
use crate::models::user::UserRow;
use crate::procedures::{FilterArgs, ParamCounts, UploadEventArgs, ALL_CONTRACTS};
use crate::store::{EventStore, Signup, StoreResult};

/**
 * A mock [EventStore] implementation for testing.
 *
 * The simulated database consists of the [StoreMockData] structure with vectors of rows. These
 * can be directly modified by the tests.
 *
 * Stored routines are not executed: `filter_events` returns [StoreMockData::filter_result] and
 * the signup procedures only register credentials for [EventStore::login]. The
 * [StoreMockData::next_error] attribute can be set to simulate a database error.
 */
#[derive(Default)]
pub struct StoreMock {
    pub data: Mutex<StoreMockData>,
}

#[derive(Default)]
pub struct StoreMockData {
    pub events: Vec<EventRow>,
    pub event_organizers: Vec<EventOrganizerRow>,
    pub event_categories: Vec<EventCategoryRow>,
    pub event_locations: Vec<EventLocationRow>,
    /// Number of [EventStore::event_rows] calls
    pub event_detail_queries: usize,
    pub filter_result: Vec<i32>,
    pub filter_calls: Vec<FilterArgs>,
    pub uploads: Vec<UploadEventArgs>,
    pub categories: Vec<Category>,
    pub locations: Vec<LocationInfo>,
    pub organizers: Vec<NamedOrganizerRow>,
    pub organizer_details: Vec<OrganizerDetailRow>,
    pub users: Vec<UserRow>,
    /// (email, password, user id)
    pub credentials: Vec<(String, String, i32)>,
    /// (attendee id, user id)
    pub attendees: Vec<(i32, i32)>,
    /// (club id, organizer id)
    pub clubs: Vec<(i32, i32)>,
    /// (club id, attendee id) -> remind_required
    pub memberships: HashMap<(i32, i32), bool>,
    /// (attendee id, category id)
    pub category_preferences: HashSet<(i32, i32)>,
    /// email -> major
    pub majors: HashMap<String, String>,
    /// Routine signatures reported to the startup check; `None` reports the pinned contracts.
    pub routines: Option<HashMap<&'static str, ParamCounts>>,
    /// If not none, the next call to a store method will return this error.
    pub next_error: Option<sqlx::Error>,
}

impl StoreMock {
    fn data(&self) -> StoreResult<MutexGuard<'_, StoreMockData>> {
        let mut data = self.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        Ok(data)
    }
}

fn related<T: Clone>(rows: &[T], event_ids: &[i32], key: impl Fn(&T) -> i32) -> Vec<T> {
    rows.iter()
        .filter(|r| event_ids.contains(&key(r)))
        .cloned()
        .collect()
}

#[async_trait]
impl EventStore for StoreMock {
    async fn ping(&self) -> StoreResult<()> {
        drop(self.data()?);
        Ok(())
    }

    async fn routine_params(&self, name: &str) -> StoreResult<Option<ParamCounts>> {
        let data = self.data()?;
        Ok(match &data.routines {
            Some(routines) => routines.get(name).copied(),
            None => ALL_CONTRACTS
                .iter()
                .find(|c| c.name == name)
                .map(|c| ParamCounts {
                    inputs: c.inputs,
                    outputs: c.outputs,
                }),
        })
    }

    async fn event_rows(&self, selection: &EventSelection) -> StoreResult<Vec<EventRow>> {
        let mut data = self.data()?;
        data.event_detail_queries += 1;
        let mut rows: Vec<EventRow> = data
            .events
            .iter()
            .filter(|e| match selection {
                EventSelection::All => true,
                EventSelection::ById(id) => e.event_id == *id,
                EventSelection::ByIds(ids) => ids.contains(&e.event_id),
                EventSelection::ByOrganizer(organizer_id) => data
                    .event_organizers
                    .iter()
                    .any(|o| o.event_id == e.event_id && o.organizer_id == *organizer_id),
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.start_date, b.start_time).cmp(&(a.start_date, a.start_time)));
        Ok(rows)
    }

    async fn event_organizers(&self, event_ids: &[i32]) -> StoreResult<Vec<EventOrganizerRow>> {
        let data = self.data()?;
        Ok(related(&data.event_organizers, event_ids, |r| r.event_id))
    }

    async fn event_categories(&self, event_ids: &[i32]) -> StoreResult<Vec<EventCategoryRow>> {
        let data = self.data()?;
        Ok(related(&data.event_categories, event_ids, |r| r.event_id))
    }

    async fn event_locations(&self, event_ids: &[i32]) -> StoreResult<Vec<EventLocationRow>> {
        let data = self.data()?;
        Ok(related(&data.event_locations, event_ids, |r| r.event_id))
    }

    async fn organizer_ids_by_name(&self, names: &[String]) -> StoreResult<Vec<i32>> {
        let data = self.data()?;
        Ok(data
            .organizers
            .iter()
            .filter(|o| {
                [&o.names.club_name, &o.names.school_name, &o.names.student_name]
                    .into_iter()
                    .flatten()
                    .any(|n| names.contains(n))
            })
            .map(|o| o.organizer_id)
            .collect())
    }

    async fn filter_event_ids(&self, args: &FilterArgs) -> StoreResult<Vec<i32>> {
        let mut data = self.data()?;
        data.filter_calls.push(args.clone());
        Ok(data.filter_result.clone())
    }

    async fn upload_event(&self, args: &UploadEventArgs) -> StoreResult<Option<i64>> {
        let mut data = self.data()?;
        data.uploads.push(args.clone());
        Ok(Some(100 + data.uploads.len() as i64))
    }

    async fn categories(&self) -> StoreResult<Vec<Category>> {
        let data = self.data()?;
        let mut categories = data.categories.clone();
        categories.sort_by(|a, b| a.category_name.cmp(&b.category_name));
        Ok(categories)
    }

    async fn locations(&self) -> StoreResult<Vec<LocationInfo>> {
        let data = self.data()?;
        let mut locations = data.locations.clone();
        locations.sort_by(|a, b| (&a.building, &a.label).cmp(&(&b.building, &b.label)));
        Ok(locations)
    }

    async fn buildings(&self) -> StoreResult<Vec<Building>> {
        let data = self.data()?;
        let mut grouped: BTreeMap<&str, Vec<&LocationInfo>> = BTreeMap::new();
        for location in &data.locations {
            grouped.entry(&location.building).or_default().push(location);
        }
        Ok(grouped
            .into_iter()
            .map(|(building, locations)| {
                let mut labels: Vec<&str> = locations.iter().map(|l| l.label.as_str()).collect();
                labels.sort();
                Building {
                    building: building.to_string(),
                    label_count: locations.len() as i64,
                    max_capacity: locations.iter().filter_map(|l| l.capacity).max(),
                    all_labels: Some(labels.join(", ")),
                }
            })
            .collect())
    }

    async fn building_labels(&self, building: &str) -> StoreResult<Vec<BuildingLabel>> {
        let data = self.data()?;
        let mut labels: Vec<BuildingLabel> = data
            .locations
            .iter()
            .enumerate()
            .filter(|(_, l)| l.building == building)
            .map(|(i, l)| BuildingLabel {
                location_id: i as i32 + 1,
                label: l.label.clone(),
                capacity: l.capacity,
            })
            .collect();
        labels.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(labels)
    }

    async fn organizers(&self) -> StoreResult<Vec<OrganizerRow>> {
        let data = self.data()?;
        Ok(data
            .organizers
            .iter()
            .map(|o| OrganizerRow {
                organizer_id: o.organizer_id,
                organizer_type: o.organizer_type.clone(),
            })
            .collect())
    }

    async fn named_organizers(&self) -> StoreResult<Vec<NamedOrganizerRow>> {
        let data = self.data()?;
        Ok(data.organizers.clone())
    }

    async fn organizer_detail(&self, organizer_id: i32) -> StoreResult<Option<OrganizerDetailRow>> {
        let data = self.data()?;
        Ok(data
            .organizer_details
            .iter()
            .find(|o| o.organizer_id == organizer_id)
            .cloned())
    }

    async fn user(&self, user_id: i32) -> StoreResult<Option<UserRow>> {
        let data = self.data()?;
        Ok(data.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn club_id_for_organizer(&self, organizer_id: i32) -> StoreResult<Option<i32>> {
        let data = self.data()?;
        Ok(data
            .clubs
            .iter()
            .find(|(_, o)| *o == organizer_id)
            .map(|(club_id, _)| *club_id))
    }

    async fn attendee_exists(&self, attendee_id: i32) -> StoreResult<bool> {
        let data = self.data()?;
        Ok(data.attendees.iter().any(|(a, _)| *a == attendee_id))
    }

    async fn attendee_id_for_user(&self, user_id: i32) -> StoreResult<Option<i32>> {
        let data = self.data()?;
        Ok(data
            .attendees
            .iter()
            .find(|(_, u)| *u == user_id)
            .map(|(attendee_id, _)| *attendee_id))
    }

    async fn create_attendee_for_user(&self, user_id: i32) -> StoreResult<Option<i32>> {
        let mut data = self.data()?;
        if !data.users.iter().any(|u| u.user_id == user_id) {
            return Ok(None);
        }
        if let Some((attendee_id, _)) = data.attendees.iter().find(|(_, u)| *u == user_id) {
            return Ok(Some(*attendee_id));
        }
        let attendee_id = data.attendees.iter().map(|(a, _)| *a).max().unwrap_or(0) + 1;
        data.attendees.push((attendee_id, user_id));
        Ok(Some(attendee_id))
    }

    async fn add_club_member(
        &self,
        club_id: i32,
        attendee_id: i32,
        remind_required: bool,
    ) -> StoreResult<()> {
        let mut data = self.data()?;
        data.memberships
            .entry((club_id, attendee_id))
            .or_insert(remind_required);
        Ok(())
    }

    async fn is_club_member(&self, club_id: i32, attendee_id: i32) -> StoreResult<bool> {
        let data = self.data()?;
        Ok(data.memberships.contains_key(&(club_id, attendee_id)))
    }

    async fn save_category_preferences(
        &self,
        attendee_id: i32,
        category_ids: &[i32],
    ) -> StoreResult<()> {
        let mut data = self.data()?;
        for category_id in category_ids {
            data.category_preferences.insert((attendee_id, *category_id));
        }
        Ok(())
    }

    async fn save_club_reminders(&self, attendee_id: i32, club_ids: &[i32]) -> StoreResult<()> {
        let mut data = self.data()?;
        for club_id in club_ids {
            data.memberships.insert((*club_id, attendee_id), true);
        }
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> StoreResult<Option<i32>> {
        let data = self.data()?;
        Ok(data
            .credentials
            .iter()
            .find(|(e, p, _)| e == email && p == password)
            .map(|(_, _, user_id)| *user_id))
    }

    async fn signup(&self, signup: Signup<'_>) -> StoreResult<Option<String>> {
        let mut data = self.data()?;
        let (Some(email), Some(password)) = (signup.email(), signup.password()) else {
            return Ok(Some("Error: email and password are required".to_string()));
        };
        if data.users.iter().any(|u| u.email == email) {
            return Ok(Some("Error: Email already registered".to_string()));
        }

        let user_id = data.users.iter().map(|u| u.user_id).max().unwrap_or(0) + 1;
        let user_type = match signup {
            Signup::Attendee(_) => "attendee",
            Signup::StudentOrganizer(_) => "attendee,organizer",
            Signup::Club(_) | Signup::School(_) => "organizer",
        };
        data.users.push(UserRow {
            user_id,
            user_type: Some(user_type.to_string()),
            email: email.to_string(),
        });
        data.credentials
            .push((email.to_string(), password.to_string(), user_id));
        if matches!(signup, Signup::Attendee(_) | Signup::StudentOrganizer(_)) {
            let attendee_id = data.attendees.iter().map(|(a, _)| *a).max().unwrap_or(0) + 1;
            data.attendees.push((attendee_id, user_id));
        }
        Ok(Some("Success: account created".to_string()))
    }

    async fn set_attendee_major(&self, email: &str, major: &str) -> StoreResult<bool> {
        let mut data = self.data()?;
        if !data.users.iter().any(|u| u.email == email) {
            return Ok(false);
        }
        data.majors.insert(email.to_string(), major.to_string());
        Ok(true)
    }
}
