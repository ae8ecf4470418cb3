//! Error taxonomy for REST calls made through the interceptor.
//!
//! ERROR HANDLING
//! ==============
//! Only [`ApiError::Unauthorized`] carries a mandated side effect (session
//! teardown, performed by whoever subscribes to invalidation events). Every
//! other variant is returned to the calling form untouched, with
//! [`ApiError::Validation`] keeping the full response body so inputs can show
//! per-field messages.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use crate::util::storage::StorageError;

/// Longest plain-text body surfaced verbatim as an error message.
const MAX_PLAIN_MESSAGE_LEN: usize = 200;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ApiError {
    /// `401`: credential missing, expired or revoked.
    #[error("session expired, please sign in again")]
    Unauthorized,
    /// `403`: authenticated but not allowed to perform this action.
    #[error("{}", .message.as_deref().unwrap_or("you are not allowed to perform this action"))]
    Forbidden { message: Option<String> },
    /// `422`: field-level validation failure.
    #[error("{}", .0.summary())]
    Validation(ValidationErrors),
    /// `429`: too many requests.
    #[error("{}", .message.as_deref().unwrap_or("too many requests, try again shortly"))]
    RateLimited { message: Option<String> },
    /// Any other non-2xx status.
    #[error("request failed ({status}){}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status { status: u16, message: Option<String> },
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),
    /// A 2xx response body did not match the expected schema.
    #[error("unexpected response: {0}")]
    Decode(String),
    /// Persisting credentials failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The action needs an authenticated user and there is none.
    #[error("not signed in")]
    NotAuthenticated,
    /// The response arrived after the session it belonged to ended.
    #[error("session changed before the request completed")]
    SessionChanged,
}

impl ApiError {
    /// Whether this error means the credential is no longer valid.
    #[must_use]
    pub fn is_session_expiry(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// First validation message for `field`, if this is a `422`.
    #[must_use]
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match self {
            ApiError::Validation(errors) => errors.first(field),
            _ => None,
        }
    }

    /// Message suitable for a form banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Structured `422` body: `{ "message": ..., "errors": { field: [..] } }`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationErrors {
    pub message: Option<String>,
    pub errors: BTreeMap<String, Vec<String>>,
    /// Unmodified response body.
    pub body: serde_json::Value,
}

#[derive(Deserialize)]
struct ValidationBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, FieldMessages>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldMessages {
    Many(Vec<String>),
    One(String),
}

impl ValidationErrors {
    /// Parse a `422` body. Anything that is not the expected shape still
    /// yields a value carrying the raw body.
    #[must_use]
    pub fn from_body(raw: &str) -> Self {
        let body: serde_json::Value = serde_json::from_str(raw).unwrap_or(serde_json::Value::Null);
        let parsed = serde_json::from_value::<ValidationBody>(body.clone()).ok();
        let Some(parsed) = parsed else {
            return Self { message: None, errors: BTreeMap::new(), body };
        };
        let errors = parsed
            .errors
            .into_iter()
            .map(|(field, messages)| {
                let messages = match messages {
                    FieldMessages::Many(list) => list,
                    FieldMessages::One(one) => vec![one],
                };
                (field, messages)
            })
            .collect();
        Self { message: parsed.message, errors, body }
    }

    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors.get(field)?.first().map(String::as_str)
    }

    fn summary(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        self.errors
            .values()
            .flat_map(|m| m.first())
            .next()
            .cloned()
            .unwrap_or_else(|| "the submitted data is invalid".to_owned())
    }
}

/// Best-effort message extraction from an error body: JSON `message`, then
/// JSON `error`, then a short plain-text body.
#[must_use]
pub fn extract_message(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "error"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
            .map(str::trim)
            .find(|m| !m.is_empty())
            .map(str::to_owned);
    }
    if trimmed.len() <= MAX_PLAIN_MESSAGE_LEN && !trimmed.starts_with('<') {
        return Some(trimmed.to_owned());
    }
    None
}
