use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub experience: u32,
}

impl Doctor {
    pub fn new(id: &str, name: &str, specialization: &str, experience: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            specialization: specialization.to_string(),
            experience,
        }
    }

    /// Normalizes one server record. `id` wins over `_id`; missing fields become
    /// empty strings or zero. Returns `None` for anything that is not an object.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let text = |key: &str| match obj.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let experience = match obj.get("experience") {
            Some(Value::Number(n)) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };

        Some(Self {
            id: text("id").or_else(|| text("_id")).unwrap_or_default(),
            name: text("name").unwrap_or_default(),
            specialization: text("specialization").unwrap_or_default(),
            experience: u32::try_from(experience).unwrap_or(u32::MAX),
        })
    }
}

/// Roster served when the directory endpoint is unavailable.
pub fn builtin_roster() -> Vec<Doctor> {
    vec![
        Doctor::new("d1", "Dr. A. Sharma", "Cardiologist", 8),
        Doctor::new("d2", "Dr. Priya Mehta", "Dermatologist", 5),
        Doctor::new("d3", "Dr. R. Khan", "Neurologist", 10),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorySource {
    Remote,
    BuiltIn,
}

#[derive(Debug, Clone)]
pub struct DoctorDirectory {
    pub doctors: Vec<Doctor>,
    pub source: DirectorySource,
}

impl DoctorDirectory {
    /// Records without any id never match, not even an empty `doctor_id`.
    pub fn find(&self, doctor_id: &str) -> Option<&Doctor> {
        if doctor_id.is_empty() {
            return None;
        }
        self.doctors.iter().find(|d| d.id == doctor_id)
    }
}
