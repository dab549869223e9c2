// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

use shared_models::StorageError;

pub const UNKNOWN_NAME: &str = "Unknown";
pub const DEFAULT_TIME: &str = "00:00";

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// The single shape every appointment is converted to before it is shown or filtered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_email: Option<String>,
    pub doctor_id: String,
    pub doctor_name: String,
    pub datetime: String,
    pub reason: String,
    pub token: String,
    pub status: AppointmentStatus,
    pub reminder_sent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Booked,
    Confirmed,
    Completed,
    Cancelled,
    /// Any status the server invents that this client does not know about.
    Other(String),
}

impl From<&str> for AppointmentStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "booked" => AppointmentStatus::Booked,
            "confirmed" => AppointmentStatus::Confirmed,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            other => AppointmentStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(raw: String) -> Self {
        AppointmentStatus::from(raw.as_str())
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Other(other) => write!(f, "{}", other),
        }
    }
}

/// An appointment record as it arrived, from the server or the local store.
/// Field access is lenient: wrong types and empty strings read as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawAppointment(Map<String, Value>);

impl RawAppointment {
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => number_text(n),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Bool(true)))
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }
}

/// Decimal text for a JSON number. Zero reads as absent and whole floats drop
/// their fractional part, so `12.0` and `12` both read as `"12"`.
fn number_text(n: &Number) -> Option<String> {
    if let Some(i) = n.as_i64() {
        return (i != 0).then(|| i.to_string());
    }
    if let Some(u) = n.as_u64() {
        return (u != 0).then(|| u.to_string());
    }

    let f = n.as_f64()?;
    if f == 0.0 || !f.is_finite() {
        None
    } else if f.fract() == 0.0 && f.abs() < 1e15 {
        Some(format!("{}", f as i64))
    } else {
        Some(f.to_string())
    }
}

impl From<Value> for RawAppointment {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawAppointment(map),
            _ => RawAppointment::default(),
        }
    }
}

impl From<&Value> for RawAppointment {
    fn from(value: &Value) -> Self {
        RawAppointment::from(value.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentSource {
    Remote,
    Local,
}

#[derive(Debug, Clone)]
pub struct AppointmentList {
    pub appointments: Vec<Appointment>,
    pub source: AppointmentSource,
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub doctor_id: String,
    /// `YYYY-MM-DDTHH:MM`; the time part is optional.
    pub datetime: String,
    pub reason: String,
}

impl BookingRequest {
    pub fn new(
        doctor_id: impl Into<String>,
        datetime: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            doctor_id: doctor_id.into(),
            datetime: datetime.into(),
            reason: reason.into(),
        }
    }
}

/// Body of `POST /appointments`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    pub patient_name: String,
    pub doctor_name: String,
    pub date: String,
    pub time: String,
}

/// Which branch produced a booking.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "appointment", rename_all = "snake_case")]
pub enum RemoteOutcome {
    /// The server accepted the booking; the record is its response, normalized.
    Confirmed(Box<Appointment>),
    /// The server did not answer usefully; the record was synthesized and stored locally.
    Fallback(Box<Appointment>),
}

impl RemoteOutcome {
    pub fn appointment(&self) -> &Appointment {
        match self {
            RemoteOutcome::Confirmed(appointment) | RemoteOutcome::Fallback(appointment) => {
                appointment
            }
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, RemoteOutcome::Fallback(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingConfirmation {
    pub token: String,
    /// Estimated wait in minutes.
    pub eta: u32,
    pub outcome: RemoteOutcome,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Local appointment store failed: {0}")]
    Storage(#[from] StorageError),
}
