use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{Appointment, AppointmentStatus, RawAppointment, DEFAULT_TIME, UNKNOWN_NAME};

/// Converts one raw record into the canonical shape. Total: every field has a fallback.
///
/// `now` is only consulted when the record carries neither `date` nor `datetime`.
pub fn normalize_at(raw: &RawAppointment, now: DateTime<Utc>) -> Appointment {
    let datetime = match raw.text("date") {
        Some(date) => format!(
            "{}T{}",
            date,
            raw.text("time").unwrap_or_else(|| DEFAULT_TIME.to_string())
        ),
        None => raw
            .text("datetime")
            .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    };

    Appointment {
        id: raw.text("_id").or_else(|| raw.text("id")).unwrap_or_default(),
        patient_id: raw.text("patientId").unwrap_or_default(),
        patient_name: raw
            .text("patientName")
            .or_else(|| raw.text("patient"))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        patient_email: raw.text("patientEmail"),
        doctor_id: raw.text("doctorId").unwrap_or_default(),
        doctor_name: raw
            .text("doctorName")
            .or_else(|| raw.text("doctor"))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        datetime,
        reason: raw.text("reason").unwrap_or_default(),
        token: raw.text("token").unwrap_or_default(),
        status: raw
            .text("status")
            .map(AppointmentStatus::from)
            .unwrap_or_default(),
        reminder_sent: raw.flag("reminderSent"),
        created_at: raw.value("createdAt").cloned(),
    }
}

pub fn normalize(raw: &RawAppointment) -> Appointment {
    normalize_at(raw, Utc::now())
}

pub fn normalize_all<I>(records: I) -> Vec<Appointment>
where
    I: IntoIterator,
    I::Item: Into<RawAppointment>,
{
    let now = Utc::now();
    records
        .into_iter()
        .map(|record| normalize_at(&record.into(), now))
        .collect()
}
