use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::store::{keys, KeyValueStore};

pub mod paths {
    pub const LOGIN: &str = "/auth/login";
    pub const REGISTER: &str = "/auth/register";
    pub const DOCTORS: &str = "/doctors";
    pub const APPOINTMENTS: &str = "/appointments";
}

/// Result of one remote call. Transport failures are folded into `ok: false, status: 0`.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub ok: bool,
    pub status: u16,
    pub data: Value,
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn unreachable(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: 0,
            data: Value::Null,
            error: Some(error.into()),
        }
    }

    /// The server's `message` field, if it sent one.
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }

    /// The payload when the call succeeded and returned a JSON array.
    pub fn array(&self) -> Option<&Vec<Value>> {
        if self.ok {
            self.data.as_array()
        } else {
            None
        }
    }
}

#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> ApiResponse;
}

pub struct HmsApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
}

impl HmsApiClient {
    pub fn new(config: &AppConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            Client::new()
        });

        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let token = match self.store.get(keys::TOKEN).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read bearer credential: {}", e);
                None
            }
        };

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored bearer credential is not a valid header value"),
            }
        }

        headers
    }
}

#[async_trait]
impl ApiTransport for HmsApiClient {
    async fn call(&self, method: Method, path: &str, body: Option<Value>) -> ApiResponse {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers().await;
        let mut req = self.client.request(method, &url).headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Request to {} failed: {}", url, e);
                return ApiResponse::unreachable(e.to_string());
            }
        };

        let status = response.status();
        let data = match response.text().await {
            Ok(text) => serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({})),
            Err(e) => {
                warn!("Could not read response body from {}: {}", url, e);
                json!({})
            }
        };

        if !status.is_success() {
            warn!("API error ({}) from {}", status, url);
        }

        ApiResponse {
            ok: status.is_success(),
            status: status.as_u16(),
            data,
            error: None,
        }
    }
}
