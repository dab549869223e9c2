use std::sync::Arc;

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_database::{keys, paths, ApiTransport, KeyValueStore};
use shared_models::{Identity, StorageError};

use crate::models::{AuthError, LoginRequest, RegisterRequest};

pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTER_FAILED: &str = "Register failed";

/// Owns the bearer credential and the current-user snapshot in the store.
pub struct SessionService {
    api: Arc<dyn ApiTransport>,
    store: Arc<dyn KeyValueStore>,
}

impl SessionService {
    pub fn new(api: Arc<dyn ApiTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { api, store }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<Identity, AuthError> {
        debug!("Logging in {}", request.email);

        let response = self
            .api
            .call(Method::POST, paths::LOGIN, Some(json!(request)))
            .await;

        if !response.ok {
            let message = response.message().unwrap_or(LOGIN_FAILED).to_string();
            warn!("Login rejected (status {}): {}", response.status, message);
            return Err(AuthError::Rejected(message));
        }

        let identity = response
            .data
            .get("user")
            .and_then(Identity::from_value)
            .ok_or_else(|| {
                warn!("Login response carried no user object");
                AuthError::Rejected(LOGIN_FAILED.to_string())
            })?;

        match response.data.get("token").and_then(Value::as_str) {
            Some(token) => self.store.set(keys::TOKEN, token).await?,
            None => warn!("Login response carried no token"),
        }
        let snapshot = serde_json::to_string(&identity).map_err(StorageError::from)?;
        self.store.set(keys::CURRENT_USER, &snapshot).await?;

        info!("Logged in as {}", identity.name);
        Ok(identity)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<(), AuthError> {
        debug!("Registering {} as {}", request.email, request.role);

        let response = self
            .api
            .call(Method::POST, paths::REGISTER, Some(json!(request)))
            .await;

        if response.ok {
            return Ok(());
        }

        let message = response.message().unwrap_or(REGISTER_FAILED).to_string();
        warn!("Registration rejected (status {}): {}", response.status, message);
        Err(AuthError::Rejected(message))
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(keys::TOKEN).await?;
        self.store.remove(keys::CURRENT_USER).await?;
        info!("Logged out");
        Ok(())
    }

    /// The snapshot written at login. Missing or unreadable snapshots yield `None`.
    pub async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        let raw = match self.store.get(keys::CURRENT_USER).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(Identity::from_value(&value)),
            Err(e) => {
                warn!("Current user snapshot is unreadable: {}", e);
                Ok(None)
            }
        }
    }
}
