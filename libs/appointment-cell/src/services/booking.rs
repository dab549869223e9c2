// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveTime, SecondsFormat, Utc};
use rand::Rng;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use doctor_cell::services::DoctorService;
use shared_database::{paths, ApiTransport};
use shared_models::Identity;
use shared_utils::{ids, Notifier};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookingConfirmation, BookingRequest,
    CreateAppointmentPayload, RawAppointment, RemoteOutcome, DEFAULT_TIME, UNKNOWN_NAME,
};
use crate::services::local_store::{count_for_doctor, LocalAppointmentStore};
use crate::services::normalizer::normalize;

pub const ETA_STEP_MINUTES: u32 = 15;

pub struct AppointmentBookingService {
    api: Arc<dyn ApiTransport>,
    doctors: DoctorService,
    local: Arc<LocalAppointmentStore>,
    notifier: Arc<dyn Notifier>,
}

impl AppointmentBookingService {
    pub fn new(
        api: Arc<dyn ApiTransport>,
        local: Arc<LocalAppointmentStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            doctors: DoctorService::new(Arc::clone(&api)),
            api,
            local,
            notifier,
        }
    }

    /// Books with the server when it answers, otherwise stores the booking on this device.
    ///
    /// Transport failures never surface here; only a failing local store does.
    /// `identity` of `None` books as a freshly generated guest.
    pub async fn book_appointment(
        &self,
        request: BookingRequest,
        identity: Option<&Identity>,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let directory = self.doctors.load_directory().await;
        let doctor_name = directory
            .find(&request.doctor_id)
            .map(|doctor| doctor.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                warn!("Doctor {} has no name in directory, booking anyway", request.doctor_id);
                UNKNOWN_NAME.to_string()
            });

        let identity = identity
            .cloned()
            .unwrap_or_else(|| Identity::guest(ids::patient_id()));

        info!(
            "Booking appointment for {} with doctor {} at {}",
            identity.name, request.doctor_id, request.datetime
        );

        let (date, time) = split_datetime(&request.datetime);
        let payload = CreateAppointmentPayload {
            patient_name: identity.name.clone(),
            doctor_name: doctor_name.clone(),
            date,
            time,
        };

        let response = self
            .api
            .call(Method::POST, paths::APPOINTMENTS, Some(json!(payload)))
            .await;

        if response.ok {
            return Ok(confirmed(&response.data));
        }

        warn!(
            "Remote booking failed (status {}{}), falling back to local store",
            response.status,
            response
                .message()
                .map(|m| format!(": {}", m))
                .unwrap_or_default()
        );

        self.book_locally(&request, &identity, doctor_name).await
    }

    async fn book_locally(
        &self,
        request: &BookingRequest,
        identity: &Identity,
        doctor_name: String,
    ) -> Result<BookingConfirmation, AppointmentError> {
        let appointment = self
            .local
            .append_with(|existing| {
                let sequence = count_for_doctor(existing, &request.doctor_id) + 1;
                Appointment {
                    id: ids::appointment_id(),
                    patient_id: if identity.has_id() {
                        identity.id.clone()
                    } else {
                        ids::patient_id()
                    },
                    patient_name: identity.name.clone(),
                    patient_email: None,
                    doctor_id: request.doctor_id.clone(),
                    doctor_name,
                    datetime: request.datetime.clone(),
                    reason: request.reason.clone(),
                    token: format_token(sequence),
                    status: AppointmentStatus::Booked,
                    reminder_sent: false,
                    created_at: Some(Value::String(
                        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                    )),
                }
            })
            .await?;

        let eta = fallback_eta(&appointment.token);
        self.notifier.notify(&format!(
            "Server unavailable, appointment saved on this device with token {}",
            appointment.token
        ));
        info!("Stored fallback appointment {} with token {}", appointment.id, appointment.token);

        Ok(BookingConfirmation {
            token: appointment.token.clone(),
            eta,
            outcome: RemoteOutcome::Fallback(Box::new(appointment)),
        })
    }
}

/// The server is authoritative for the record and the token. The ETA is
/// randomized independently of the token, unlike the fallback branch.
fn confirmed(data: &Value) -> BookingConfirmation {
    let mut rng = rand::thread_rng();
    let record = normalize(&RawAppointment::from(data));

    let token = if record.token.is_empty() {
        debug!("Server omitted a token, generating one");
        rng.gen_range(10..=99).to_string()
    } else {
        record.token.clone()
    };
    let eta = ETA_STEP_MINUTES * rng.gen_range(1..=6);

    BookingConfirmation {
        token,
        eta,
        outcome: RemoteOutcome::Confirmed(Box::new(record)),
    }
}

/// Splits `YYYY-MM-DDTHH:MM[...]` into date and `HH:MM`. The time is
/// `00:00` when absent or not a valid clock time.
pub fn split_datetime(datetime: &str) -> (String, String) {
    let mut parts = datetime.splitn(2, 'T');
    let date = parts.next().unwrap_or_default().to_string();
    let time = parts
        .next()
        .map(|rest| rest.chars().take(5).collect::<String>())
        .filter(|hhmm| NaiveTime::parse_from_str(hhmm, "%H:%M").is_ok())
        .unwrap_or_else(|| DEFAULT_TIME.to_string());
    (date, time)
}

/// Zero-padded to at least two digits; three-digit sequences are not truncated.
pub fn format_token(sequence: usize) -> String {
    format!("{:02}", sequence)
}

pub fn fallback_eta(token: &str) -> u32 {
    token.parse::<u32>().unwrap_or(0) * ETA_STEP_MINUTES
}
