use campus_events_api_types::UserProfile;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub user_id: i32,
    pub user_type: Option<String>,
    pub email: String,
}

impl UserRow {
    pub fn is_attendee(&self) -> bool {
        self.user_type
            .as_deref()
            .map(|t| t.to_lowercase().contains("attendee"))
            .unwrap_or(false)
    }
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            user_id: row.user_id,
            user_type: row.user_type,
            email: row.email,
        }
    }
}
