use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, warn};

use shared_database::{paths, ApiTransport};
use shared_models::Identity;

use crate::models::{Appointment, AppointmentError, AppointmentList, AppointmentSource};
use crate::services::local_store::LocalAppointmentStore;
use crate::services::normalizer::normalize_all;

pub struct AppointmentListingService {
    api: Arc<dyn ApiTransport>,
    local: Arc<LocalAppointmentStore>,
}

impl AppointmentListingService {
    pub fn new(api: Arc<dyn ApiTransport>, local: Arc<LocalAppointmentStore>) -> Self {
        Self { api, local }
    }

    /// Every appointment the server knows about, or the device-local ones when
    /// the server does not answer with an array.
    pub async fn list_all(&self) -> Result<AppointmentList, AppointmentError> {
        let response = self.api.call(Method::GET, paths::APPOINTMENTS, None).await;

        if let Some(records) = response.array() {
            debug!("Loaded {} appointments from server", records.len());
            return Ok(AppointmentList {
                appointments: normalize_all(records),
                source: AppointmentSource::Remote,
            });
        }

        warn!(
            "Appointment list unavailable (status {}), reading local store",
            response.status
        );
        let records = self.local.load_all().await?;
        Ok(AppointmentList {
            appointments: normalize_all(records),
            source: AppointmentSource::Local,
        })
    }

    /// Appointments belonging to `identity`. Without an identity the list is
    /// returned unfiltered.
    pub async fn list_mine(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let list = self.list_all().await?;

        let Some(identity) = identity else {
            return Ok(list.appointments);
        };

        Ok(list
            .appointments
            .into_iter()
            .filter(|a| belongs_to(a, identity, list.source))
            .collect())
    }
}

/// Name match for any record; email match only for server records.
pub fn belongs_to(
    appointment: &Appointment,
    identity: &Identity,
    source: AppointmentSource,
) -> bool {
    if appointment.patient_name == identity.name {
        return true;
    }

    source == AppointmentSource::Remote
        && matches!(
            (&appointment.patient_email, &identity.email),
            (Some(theirs), Some(mine)) if theirs == mine
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawAppointment;
    use crate::services::normalizer::normalize;
    use serde_json::json;

    fn alice() -> Identity {
        Identity::new("u1", "Alice", Some("alice@example.com".to_string()))
    }

    #[test]
    fn name_match_counts_for_any_source() {
        let record = normalize(&RawAppointment::from(json!({ "patientName": "Alice" })));
        assert!(belongs_to(&record, &alice(), AppointmentSource::Local));
        assert!(belongs_to(&record, &alice(), AppointmentSource::Remote));
    }

    #[test]
    fn email_match_only_for_server_records() {
        let record = normalize(&RawAppointment::from(json!({
            "patientName": "A. Smith",
            "patientEmail": "alice@example.com"
        })));
        assert!(belongs_to(&record, &alice(), AppointmentSource::Remote));
        assert!(!belongs_to(&record, &alice(), AppointmentSource::Local));
    }

    #[test]
    fn missing_emails_do_not_match() {
        let record = normalize(&RawAppointment::from(json!({ "patientName": "Bob" })));
        let anonymous = Identity::new("u2", "Carol", None);
        assert!(!belongs_to(&record, &anonymous, AppointmentSource::Remote));
    }
}
