use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{keys, HmsApiClient, KeyValueStore, MemoryStore};
use shared_models::Identity;

/// Base URL nothing listens on, for exercising the offline paths.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

pub struct TestConfig {
    pub api_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            api_base_url: UNREACHABLE_URL.to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_base_url(uri: &str) -> Self {
        Self {
            api_base_url: uri.to_string(),
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig::with_base_url(self.api_base_url.clone())
    }
}

/// A client wired to a fresh in-memory store.
pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub api: Arc<HmsApiClient>,
}

impl TestHarness {
    pub fn new(config: &TestConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let api = Arc::new(HmsApiClient::new(&config.to_app_config(), store.clone()));
        Self { store, api }
    }

    pub fn offline() -> Self {
        Self::new(&TestConfig::default())
    }

    pub async fn seed_local_appointments(&self, records: Value) {
        self.store
            .set(keys::APPOINTMENTS, &records.to_string())
            .await
            .expect("memory store never fails");
    }

    pub async fn local_appointments(&self) -> Vec<Value> {
        let raw = self
            .store
            .get(keys::APPOINTMENTS)
            .await
            .expect("memory store never fails")
            .unwrap_or_else(|| "[]".to_string());
        serde_json::from_str(&raw).expect("local appointments are a JSON array")
    }
}

pub struct TestUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("Test User", "test@example.com")
    }
}

impl TestUser {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    pub fn to_identity(&self) -> Identity {
        Identity::new(self.id.clone(), self.name.clone(), Some(self.email.clone()))
    }
}

pub struct MockHmsResponses;

impl MockHmsResponses {
    pub fn login_response(user: &TestUser, token: &str) -> Value {
        json!({
            "token": token,
            "user": {
                "_id": user.id,
                "name": user.name,
                "email": user.email,
                "role": "patient"
            }
        })
    }

    pub fn doctors_response() -> Value {
        json!([
            {
                "_id": "665f1a",
                "name": "Dr. Meera Iyer",
                "specialization": "Pediatrician",
                "experience": 12
            },
            { "id": "665f1b", "name": "Dr. Tom Abel" }
        ])
    }

    pub fn appointment_response(
        patient_name: &str,
        doctor_name: &str,
        token: Option<Value>,
    ) -> Value {
        let mut record = json!({
            "_id": Uuid::new_v4().to_string(),
            "patientName": patient_name,
            "doctorName": doctor_name,
            "date": "2024-01-05",
            "time": "14:30",
            "status": "booked",
            "createdAt": "2024-01-01T09:00:00.000Z"
        });
        if let Some(token) = token {
            record["token"] = token;
        }
        record
    }

    pub fn error_response(message: &str) -> Value {
        json!({ "message": message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_to_unreachable() {
        let config = TestConfig::default().to_app_config();
        assert_eq!(config.api_base_url, UNREACHABLE_URL);
    }

    #[test]
    fn test_user_identity() {
        let user = TestUser::new("Alice", "alice@example.com");
        let identity = user.to_identity();
        assert_eq!(identity.name, "Alice");
        assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
        assert_eq!(identity.id, user.id);
    }

    #[test]
    fn login_fixture_uses_mongo_id() {
        let user = TestUser::default();
        let body = MockHmsResponses::login_response(&user, "t");
        assert_eq!(body["user"]["_id"], json!(user.id));
    }
}
