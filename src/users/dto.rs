use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// User record as stored and as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,     // zero-padded sequence number, see `users::id`
    pub name: String,
    pub email: String,
    pub status: String, // "Active" | "Inactive", checked by the form only
}

/// Body of POST /users and PUT /users/:id.
///
/// Every key must be present, but any JSON value is accepted for it: a
/// present key is `Some` even when its value is empty or not a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    #[serde(default, deserialize_with = "present_as_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_as_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "present_as_text", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            status: Some(status.into()),
        }
    }

    /// Names of the required keys absent from the body, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_none()),
            ("email", self.email.is_none()),
            ("status", self.status.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, missing)| missing.then_some(field))
        .collect()
    }
}

/// Body of PATCH /users/:id. Keys that are absent or not strings are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(default, deserialize_with = "text_only", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text_only", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "text_only", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl UserPatch {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }
}

/// `{"error": "..."}` payload returned with every 4xx/5xx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

fn present_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }))
}

fn text_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}
