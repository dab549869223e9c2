use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::AppointmentSource;
use appointment_cell::services::{AppointmentListingService, LocalAppointmentStore};
use shared_utils::test_utils::{MockHmsResponses, TestConfig, TestHarness, TestUser};

fn listing_service(harness: &TestHarness) -> AppointmentListingService {
    let local = Arc::new(LocalAppointmentStore::new(harness.store.clone()));
    AppointmentListingService::new(harness.api.clone(), local)
}

async fn server_with_appointments(records: serde_json::Value) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_list_mine_filters_by_name() {
    let mock_server = server_with_appointments(json!([
        MockHmsResponses::appointment_response("Alice", "Dr. Meera Iyer", Some(json!("01"))),
        MockHmsResponses::appointment_response("Bob", "Dr. Meera Iyer", Some(json!("02")))
    ]))
    .await;
    let harness = TestHarness::new(&TestConfig::with_base_url(&mock_server.uri()));
    let alice = TestUser::new("Alice", "alice@example.com").to_identity();

    let mine = listing_service(&harness).list_mine(Some(&alice)).await.unwrap();

    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].patient_name, "Alice");
    assert_eq!(mine[0].datetime, "2024-01-05T14:30");
    assert_eq!(mine[0].token, "01");
}

#[tokio::test]
async fn test_list_mine_matches_server_email() {
    let mock_server = server_with_appointments(json!([
        { "_id": "1", "patientName": "A. Smith", "patientEmail": "alice@example.com" },
        { "_id": "2", "patientName": "Bob", "patientEmail": "bob@example.com" }
    ]))
    .await;
    let harness = TestHarness::new(&TestConfig::with_base_url(&mock_server.uri()));
    let alice = TestUser::new("Alice", "alice@example.com").to_identity();

    let mine = listing_service(&harness).list_mine(Some(&alice)).await.unwrap();

    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, "1");
}

#[tokio::test]
async fn test_list_mine_without_identity_is_unfiltered() {
    let mock_server = server_with_appointments(json!([
        { "patientName": "Alice" },
        { "patientName": "Bob" },
        {}
    ]))
    .await;
    let harness = TestHarness::new(&TestConfig::with_base_url(&mock_server.uri()));

    let all = listing_service(&harness).list_mine(None).await.unwrap();

    assert_eq!(all.len(), 3);
    assert_eq!(all[2].patient_name, "Unknown");
}

#[tokio::test]
async fn test_list_all_falls_back_to_local_store() {
    let harness = TestHarness::offline();
    harness
        .seed_local_appointments(json!([
            {
                "id": "a00001",
                "patientName": "Alice",
                "patientEmail": "alice@example.com",
                "doctorId": "d1",
                "doctorName": "Dr. A. Sharma",
                "datetime": "2024-01-05T14:30",
                "token": "01",
                "status": "booked",
                "reminderSent": false
            },
            {
                "id": "a00002",
                "patientName": "Someone Else",
                "patientEmail": "alice@example.com",
                "doctorId": "d1",
                "datetime": "2024-01-05T15:00",
                "token": "02"
            }
        ]))
        .await;
    let service = listing_service(&harness);

    let list = service.list_all().await.unwrap();
    assert_eq!(list.source, AppointmentSource::Local);
    assert_eq!(list.appointments.len(), 2);

    let alice = TestUser::new("Alice", "alice@example.com").to_identity();
    let mine = service.list_mine(Some(&alice)).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, "a00001");
}

#[tokio::test]
async fn test_non_array_response_reads_local_store() {
    let mock_server = server_with_appointments(json!({ "appointments": [] })).await;
    let harness = TestHarness::new(&TestConfig::with_base_url(&mock_server.uri()));
    harness
        .seed_local_appointments(json!([{ "id": "a00009", "patientName": "Alice" }]))
        .await;

    let list = listing_service(&harness).list_all().await.unwrap();

    assert_eq!(list.source, AppointmentSource::Local);
    assert_eq!(list.appointments[0].id, "a00009");
}
