use campus_events_api_types::{NamedOrganizer, OrganizerDetail, OrganizerSummary, OrganizerType};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::error::AppError;

/// The candidate display names of an organizer, one per organizer variant, plus the email of the
/// linked user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct OrganizerNames {
    pub club_name: Option<String>,
    pub school_name: Option<String>,
    pub student_name: Option<String>,
    pub email: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl OrganizerNames {
    /// Name of the organizer, preferring the one matching its type. Falls back to the local part
    /// of the account email.
    pub fn display_name(&self, organizer_type: Option<OrganizerType>) -> Option<String> {
        let preferred = match organizer_type {
            Some(OrganizerType::Club) => non_blank(&self.club_name),
            Some(OrganizerType::School) => non_blank(&self.school_name),
            Some(OrganizerType::Student) => non_blank(&self.student_name),
            None => None,
        };
        preferred
            .or_else(|| non_blank(&self.club_name))
            .or_else(|| non_blank(&self.school_name))
            .or_else(|| non_blank(&self.student_name))
            .or_else(|| {
                non_blank(&self.email)
                    .and_then(|email| email.split('@').next())
                    .filter(|local| !local.is_empty())
            })
            .map(str::to_string)
    }
}

pub fn parse_organizer_type(value: &str) -> Result<OrganizerType, AppError> {
    value
        .parse()
        .map_err(|e| AppError::InternalServerError(format!("Unexpected organizer type: {}", e)))
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizerRow {
    pub organizer_id: i32,
    pub organizer_type: String,
}

impl TryFrom<OrganizerRow> for OrganizerSummary {
    type Error = AppError;

    fn try_from(row: OrganizerRow) -> Result<Self, Self::Error> {
        Ok(OrganizerSummary {
            organizer_id: row.organizer_id,
            organizer_type: parse_organizer_type(&row.organizer_type)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NamedOrganizerRow {
    pub organizer_id: i32,
    pub organizer_type: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub names: OrganizerNames,
}

impl NamedOrganizerRow {
    /// `None` for organizers without any usable name; those are hidden from filter listings.
    pub fn into_named(self) -> Result<Option<NamedOrganizer>, AppError> {
        let organizer_type = parse_organizer_type(&self.organizer_type)?;
        Ok(self
            .names
            .display_name(Some(organizer_type))
            .map(|name| NamedOrganizer {
                organizer_id: self.organizer_id,
                name,
                organizer_type,
            }))
    }
}

/// Sorts named organizers the way the filter dropdown lists them.
pub fn sort_by_name(organizers: &mut [NamedOrganizer]) {
    organizers.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.organizer_id.cmp(&b.organizer_id))
    });
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrganizerDetailRow {
    pub organizer_id: i32,
    pub organizer_type: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub club_name: Option<String>,
    pub club_url: Option<String>,
    pub club_contact_email: Option<String>,
    pub school_name: Option<String>,
    pub department: Option<String>,
    pub supervisor: Option<String>,
}

impl TryFrom<OrganizerDetailRow> for OrganizerDetail {
    type Error = AppError;

    fn try_from(row: OrganizerDetailRow) -> Result<Self, Self::Error> {
        let organizer_type = parse_organizer_type(&row.organizer_type)?;
        let mut detail = OrganizerDetail {
            organizer_id: row.organizer_id,
            organizer_type,
            email: row.email,
            name: None,
            club_url: None,
            contact_email: None,
            department: None,
            supervisor: None,
        };

        match organizer_type {
            OrganizerType::Student => {
                if row.first_name.is_some() {
                    let full = format!(
                        "{} {}",
                        row.first_name.unwrap_or_default(),
                        row.last_name.unwrap_or_default()
                    );
                    detail.name = Some(full.trim().to_string());
                }
            }
            OrganizerType::Club => {
                detail.name = row.club_name;
                detail.club_url = row.club_url;
                detail.contact_email = row.club_contact_email;
            }
            OrganizerType::School => {
                detail.name = row.school_name;
                detail.department = row.department;
                detail.supervisor = row.supervisor;
            }
        }

        Ok(detail)
    }
}
