use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use shared_database::{keys, KeyValueStore};
use shared_models::StorageError;

use crate::models::Appointment;

/// Device-local appointment sequence, stored as one JSON array under `appointments`.
/// Records are never edited in place: the whole array is read, extended and rewritten.
pub struct LocalAppointmentStore {
    store: Arc<dyn KeyValueStore>,
    append_lock: Mutex<()>,
}

impl LocalAppointmentStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            append_lock: Mutex::new(()),
        }
    }

    /// Raw records in insertion order. A missing, corrupt or non-array value reads as empty.
    pub async fn load_all(&self) -> Result<Vec<Value>, StorageError> {
        let raw = match self.store.get(keys::APPOINTMENTS).await? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(_) | Err(_) => {
                warn!("Local appointments are not a JSON array, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    pub async fn count_for_doctor(&self, doctor_id: &str) -> Result<usize, StorageError> {
        Ok(count_for_doctor(&self.load_all().await?, doctor_id))
    }

    /// Builds a record from the current contents and appends it.
    /// Concurrent callers on this instance are serialized, so `build` always
    /// sees every record appended before it.
    pub async fn append_with<F>(&self, build: F) -> Result<Appointment, StorageError>
    where
        F: FnOnce(&[Value]) -> Appointment,
    {
        let _guard = self.append_lock.lock().await;

        let mut records = self.load_all().await?;
        let appointment = build(&records);
        records.push(serde_json::to_value(&appointment)?);

        self.store
            .set(keys::APPOINTMENTS, &serde_json::to_string(&records)?)
            .await?;
        debug!(
            "Stored local appointment {} ({} records total)",
            appointment.id,
            records.len()
        );

        Ok(appointment)
    }

    pub async fn append(&self, appointment: Appointment) -> Result<Appointment, StorageError> {
        self.append_with(|_| appointment).await
    }
}

pub fn count_for_doctor(records: &[Value], doctor_id: &str) -> usize {
    records
        .iter()
        .filter(|r| r.get("doctorId").and_then(Value::as_str) == Some(doctor_id))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;
    use serde_json::json;
    use shared_database::MemoryStore;

    fn record(id: &str, doctor_id: &str) -> Appointment {
        Appointment {
            id: id.to_string(),
            patient_id: "p1".to_string(),
            patient_name: "Alice".to_string(),
            patient_email: None,
            doctor_id: doctor_id.to_string(),
            doctor_name: "Dr. A. Sharma".to_string(),
            datetime: "2024-01-05T14:30".to_string(),
            reason: String::new(),
            token: "01".to_string(),
            status: AppointmentStatus::Booked,
            reminder_sent: false,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn empty_store_loads_nothing() {
        let local = LocalAppointmentStore::new(Arc::new(MemoryStore::new()));
        assert!(local.load_all().await.unwrap().is_empty());
        assert_eq!(local.count_for_doctor("d1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn append_keeps_existing_records_untouched() {
        let store = Arc::new(MemoryStore::new());
        let legacy = json!({ "id": "old", "doctorId": "d1", "extra": { "kept": true } });
        store
            .set(keys::APPOINTMENTS, &json!([legacy.clone()]).to_string())
            .await
            .unwrap();

        let local = LocalAppointmentStore::new(store);
        local.append(record("a1", "d1")).await.unwrap();
        local.append(record("a2", "d2")).await.unwrap();

        let records = local.load_all().await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], legacy);
        assert_eq!(records[2]["id"], "a2");
        assert_eq!(local.count_for_doctor("d1").await.unwrap(), 2);
        assert_eq!(local.count_for_doctor("d2").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn corrupt_value_reads_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::APPOINTMENTS, "{\"not\":\"a list\"}").await.unwrap();

        let local = LocalAppointmentStore::new(store);
        assert!(local.load_all().await.unwrap().is_empty());
    }

    #[test]
    fn count_ignores_records_without_doctor() {
        let records = vec![
            json!({ "doctorId": "d1" }),
            json!({}),
            json!("junk"),
            json!({ "doctorId": 1 }),
        ];
        assert_eq!(count_for_doctor(&records, "d1"), 1);
    }
}
