//! Pinned signatures of the stored routines this server calls.
//!
//! Every call site binds its arguments positionally, so the argument count in the `CALL` text,
//! the number of binds and the routine definition in the database must agree. The contracts below
//! are the single source for the first two, and [verify_contracts] checks the third at startup.

use campus_events_api_types::{CreateEventRequest, EventFilterRequest, EventType};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::fmt;
use tracing::{error, info};

use crate::store::EventStore;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Procedure,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutineContract {
    pub name: &'static str,
    pub kind: RoutineKind,
    pub inputs: usize,
    pub outputs: usize,
}

pub const UPLOAD_EVENT: RoutineContract = RoutineContract {
    name: "uploadEvent",
    kind: RoutineKind::Procedure,
    inputs: 20,
    outputs: 1,
};

pub const FILTER_EVENTS: RoutineContract = RoutineContract {
    name: "filter_events",
    kind: RoutineKind::Procedure,
    inputs: 6,
    outputs: 0,
};

pub const SIGNUP_ATTENDEE: RoutineContract = RoutineContract {
    name: "sp_signup_attendee",
    kind: RoutineKind::Procedure,
    inputs: 6,
    outputs: 1,
};

pub const SIGNUP_STUDENT_ORGANIZER: RoutineContract = RoutineContract {
    name: "sp_signup_student_organizer",
    kind: RoutineKind::Procedure,
    inputs: 6,
    outputs: 1,
};

pub const SIGNUP_CLUB: RoutineContract = RoutineContract {
    name: "sp_signup_club",
    kind: RoutineKind::Procedure,
    inputs: 6,
    outputs: 1,
};

pub const SIGNUP_SCHOOL: RoutineContract = RoutineContract {
    name: "sp_signup_school",
    kind: RoutineKind::Procedure,
    inputs: 5,
    outputs: 1,
};

pub const USER_LOGIN: RoutineContract = RoutineContract {
    name: "fn_user_login",
    kind: RoutineKind::Function,
    inputs: 2,
    outputs: 0,
};

pub const ALL_CONTRACTS: [RoutineContract; 7] = [
    UPLOAD_EVENT,
    FILTER_EVENTS,
    SIGNUP_ATTENDEE,
    SIGNUP_STUDENT_ORGANIZER,
    SIGNUP_CLUB,
    SIGNUP_SCHOOL,
    USER_LOGIN,
];

/// Session variable receiving the OUT parameter of the signup procedures.
pub const SIGNUP_MESSAGE_VAR: &str = "@p_error_message";
/// Session variable receiving the id generated by `uploadEvent`.
pub const NEW_EVENT_ID_VAR: &str = "@newEvent_id";

impl RoutineContract {
    fn placeholders(&self) -> String {
        vec!["?"; self.inputs].join(", ")
    }

    /// `CALL name(?, ..., @out)` for procedures; the OUT arguments are given as session variables.
    pub fn call_sql(&self, out_vars: &[&str]) -> String {
        debug_assert_eq!(self.kind, RoutineKind::Procedure);
        debug_assert_eq!(out_vars.len(), self.outputs);
        let mut args = Vec::with_capacity(self.inputs + self.outputs);
        if self.inputs > 0 {
            args.push(self.placeholders());
        }
        args.extend(out_vars.iter().map(|v| v.to_string()));
        format!("CALL {}({})", self.name, args.join(", "))
    }

    /// `SELECT CAST(name(?, ...) AS SIGNED) AS alias` for integer functions.
    pub fn select_sql(&self, alias: &str) -> String {
        debug_assert_eq!(self.kind, RoutineKind::Function);
        format!(
            "SELECT CAST({}({}) AS SIGNED) AS {}",
            self.name,
            self.placeholders(),
            alias
        )
    }
}

/// Parameter counts of a routine as defined in the connected database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamCounts {
    pub inputs: usize,
    pub outputs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    Missing(&'static str),
    Mismatch {
        name: &'static str,
        expected: ParamCounts,
        actual: ParamCounts,
    },
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractViolation::Missing(name) => write!(f, "routine {} does not exist", name),
            ContractViolation::Mismatch {
                name,
                expected,
                actual,
            } => write!(
                f,
                "routine {} takes {} IN / {} OUT parameters, expected {} IN / {} OUT",
                name, actual.inputs, actual.outputs, expected.inputs, expected.outputs
            ),
        }
    }
}

/// Compares every pinned contract with the routine definitions in the database.
pub async fn verify_contracts(store: &dyn EventStore) -> Result<Vec<ContractViolation>, AppError> {
    let mut violations = Vec::new();
    for contract in ALL_CONTRACTS {
        let expected = ParamCounts {
            inputs: contract.inputs,
            outputs: contract.outputs,
        };
        match store.routine_params(contract.name).await? {
            None => {
                error!(routine = contract.name, "Stored routine is missing");
                violations.push(ContractViolation::Missing(contract.name));
            }
            Some(actual) if actual != expected => {
                error!(
                    routine = contract.name,
                    expected_in = expected.inputs,
                    actual_in = actual.inputs,
                    expected_out = expected.outputs,
                    actual_out = actual.outputs,
                    "Stored routine signature differs from the pinned contract"
                );
                violations.push(ContractViolation::Mismatch {
                    name: contract.name,
                    expected,
                    actual,
                });
            }
            Some(_) => {
                info!(routine = contract.name, "Stored routine signature verified");
            }
        }
    }
    Ok(violations)
}

fn json_ids(ids: &[i32]) -> String {
    serde_json::Value::from(ids.to_vec()).to_string()
}

fn json_strings(values: &[String]) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(serde_json::Value::from(values.to_vec()).to_string())
    }
}

/// Arguments of `filter_events`, in call order. Empty lists are passed as NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArgs {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub event_type: Option<EventType>,
    pub categories: Option<String>,
    pub organizer_ids: Option<String>,
    pub locations: Option<String>,
}

impl FilterArgs {
    pub fn new(request: &EventFilterRequest, organizer_ids: Option<&[i32]>) -> Self {
        FilterArgs {
            start_date: request.start_date,
            end_date: request.end_date,
            event_type: request.event_type,
            categories: json_strings(&request.categories),
            organizer_ids: organizer_ids.filter(|ids| !ids.is_empty()).map(json_ids),
            locations: json_strings(&request.locations),
        }
    }
}

/// Arguments of `uploadEvent`, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadEventArgs {
    pub title: String,
    pub description: String,
    pub perks: Option<String>,
    pub max_participants: i32,
    pub application_required: i32,
    pub application_link: Option<String>,
    pub application_deadline: Option<NaiveDate>,
    pub flyer: Option<Vec<u8>>,
    pub event_type: EventType,
    pub online_link: Option<String>,
    pub building: Option<String>,
    pub label: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub cost: Decimal,
    pub organizer_id: i32,
    /// JSON array of organizer ids
    pub collaborating_organizers: String,
    /// JSON array of category ids
    pub category_ids: String,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::ValidationError(format!("{} is required", field)))
}

impl TryFrom<CreateEventRequest> for UploadEventArgs {
    type Error = AppError;

    fn try_from(request: CreateEventRequest) -> Result<Self, Self::Error> {
        let title = required(request.title, "title")?;
        let start_date = required(request.start_date, "start_date")?;
        let end_date = required(request.end_date, "end_date")?;
        let start_time = required(request.start_time, "start_time")?;
        let end_time = required(request.end_time, "end_time")?;
        let organizer_id = required(request.organizer_id.filter(|id| *id > 0), "organizer_id")?;

        Ok(UploadEventArgs {
            title,
            description: request.description.unwrap_or_default(),
            perks: request.perks,
            max_participants: request.max_participants.unwrap_or(0),
            application_required: request.application_required.unwrap_or(0),
            application_link: request.application_link,
            application_deadline: request.application_deadline,
            flyer: request.flyer_url.map(String::into_bytes),
            event_type: request.event_type.unwrap_or(EventType::OnCampus),
            online_link: request.online_link,
            building: request.building,
            label: request.label,
            start_date,
            end_date,
            start_time,
            end_time,
            cost: request.cost.unwrap_or(Decimal::ZERO),
            organizer_id,
            collaborating_organizers: json_ids(&request.collaborating_organizers),
            category_ids: json_ids(&request.category_ids),
        })
    }
}
