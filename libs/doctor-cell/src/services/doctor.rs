use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, warn};

use shared_database::{paths, ApiTransport};

use crate::models::{builtin_roster, DirectorySource, Doctor, DoctorDirectory};

pub struct DoctorService {
    api: Arc<dyn ApiTransport>,
}

impl DoctorService {
    pub fn new(api: Arc<dyn ApiTransport>) -> Self {
        Self { api }
    }

    /// Fetches the directory, substituting the built-in roster when the
    /// server is unreachable, errors, or answers with something other than an array.
    pub async fn load_directory(&self) -> DoctorDirectory {
        let response = self.api.call(Method::GET, paths::DOCTORS, None).await;

        match response.array() {
            Some(records) => {
                let doctors: Vec<Doctor> = records.iter().filter_map(Doctor::from_raw).collect();
                debug!("Loaded {} doctors from server", doctors.len());
                DoctorDirectory {
                    doctors,
                    source: DirectorySource::Remote,
                }
            }
            None => {
                warn!(
                    "Doctor directory unavailable (status {}), using built-in roster",
                    response.status
                );
                DoctorDirectory {
                    doctors: builtin_roster(),
                    source: DirectorySource::BuiltIn,
                }
            }
        }
    }

    pub async fn get_doctors(&self) -> Vec<Doctor> {
        self.load_directory().await.doctors
    }

    pub async fn find_doctor(&self, doctor_id: &str) -> Option<Doctor> {
        self.load_directory().await.find(doctor_id).cloned()
    }
}
