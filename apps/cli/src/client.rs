use std::sync::Arc;

use appointment_cell::services::{
    AppointmentBookingService, AppointmentListingService, LocalAppointmentStore,
};
use auth_cell::services::SessionService;
use doctor_cell::services::DoctorService;
use shared_config::AppConfig;
use shared_database::{ApiTransport, FileStore, HmsApiClient, KeyValueStore};
use shared_utils::{Notifier, TracingNotifier};

/// Every service the front end talks to, sharing one store and one transport.
pub struct HmsClient {
    pub session: SessionService,
    pub doctors: DoctorService,
    pub booking: AppointmentBookingService,
    pub listing: AppointmentListingService,
}

impl HmsClient {
    pub fn new(config: &AppConfig) -> Self {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage_path.clone()));
        Self::with_store(config, store, Arc::new(TracingNotifier))
    }

    pub fn with_store(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let api: Arc<dyn ApiTransport> = Arc::new(HmsApiClient::new(config, Arc::clone(&store)));
        let local = Arc::new(LocalAppointmentStore::new(Arc::clone(&store)));

        Self {
            session: SessionService::new(Arc::clone(&api), store),
            doctors: DoctorService::new(Arc::clone(&api)),
            booking: AppointmentBookingService::new(Arc::clone(&api), Arc::clone(&local), notifier),
            listing: AppointmentListingService::new(api, local),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appointment_cell::models::BookingRequest;
    use shared_database::MemoryStore;
    use shared_utils::test_utils::{TestConfig, TestUser};
    use shared_utils::RecordingNotifier;

    #[tokio::test]
    async fn offline_booking_shows_up_in_my_appointments() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let config = TestConfig::default().to_app_config();
        let client = HmsClient::with_store(&config, store, notifier.clone());
        let alice = TestUser::new("Alice", "alice@example.com").to_identity();

        let confirmation = client
            .booking
            .book_appointment(BookingRequest::new("d2", "2024-01-05T14:30", "rash"), Some(&alice))
            .await
            .unwrap();
        assert_eq!(confirmation.token, "01");

        let mine = client.listing.list_mine(Some(&alice)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].doctor_name, "Dr. Priya Mehta");
        assert_eq!(mine[0].token, "01");

        let bob = TestUser::new("Bob", "bob@example.com").to_identity();
        assert!(client.listing.list_mine(Some(&bob)).await.unwrap().is_empty());
        assert_eq!(notifier.messages().len(), 1);
    }
}
