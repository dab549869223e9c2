use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_models::StorageError;

pub const DEFAULT_ROLE: &str = "patient";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterRequest {
    pub fn patient(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// The server refused, or could not be reached. Carries the message to show the user.
    #[error("{0}")]
    Rejected(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}
