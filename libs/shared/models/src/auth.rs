use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GUEST_NAME: &str = "Guest";
pub const GUEST_EMAIL: &str = "guest@example.com";

/// The active user that bookings are attributed to and listings are filtered by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email,
            role: None,
        }
    }

    pub fn guest(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: GUEST_NAME.to_string(),
            email: Some(GUEST_EMAIL.to_string()),
            role: None,
        }
    }

    /// Builds an identity from a server `user` object, accepting `_id` in place of `id`.
    /// Returns `None` when the value is not an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(|v| match v {
                    Value::String(s) if !s.is_empty() => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
        };

        Some(Self {
            id: text("id").or_else(|| text("_id")).unwrap_or_default(),
            name: text("name").unwrap_or_default(),
            email: text("email"),
            role: text("role"),
        })
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}
