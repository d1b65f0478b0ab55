//! API error types and server message extraction.

use serde_json::Value;
use thiserror::Error;

/// Raw text bodies longer than this are cut before being shown.
const MAX_TEXT_MESSAGE: usize = 200;

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        status: u16,
        /// Human-readable message extracted from the body, if any.
        message: Option<String>,
        body: ErrorBody,
    },

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Empty response body")]
    EmptyBody,

    #[error("Failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    /// The request needs a bearer token and none is stored.
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn server(status: u16, body: ErrorBody) -> Self {
        Self::Server {
            status,
            message: body.message(),
            body,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the server supplied, if it was a server rejection with one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the failure means the session is missing or not allowed.
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::Server { status: 401 | 403, .. }
        )
    }

    /// Whether the request was rejected by the server, as opposed to never completing.
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

/// A non-2xx response body, read without assuming it is JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ErrorBody {
    #[default]
    Empty,
    Json(Value),
    /// Body that did not parse as JSON (e.g. an HTML error page).
    Text(String),
}

impl ErrorBody {
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        serde_json::from_str(text).map_or_else(|_| Self::Text(text.to_string()), Self::Json)
    }

    /// Extract the message to show: `detail`, then `error`, then the first
    /// validation error of any field.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(text) => {
                let text = text.trim();
                Some(text.chars().take(MAX_TEXT_MESSAGE).collect())
            }
            Self::Json(Value::Object(map)) => map
                .get("detail")
                .and_then(first_message)
                .or_else(|| map.get("error").and_then(Value::as_str).map(str::to_string))
                .or_else(|| map.values().find_map(first_message)),
            Self::Json(other) => first_message(other),
        }
    }

    /// Field-level errors as `(field, messages joined by spaces)`, in body order.
    pub fn field_errors(&self) -> Vec<(String, String)> {
        let Self::Json(Value::Object(map)) = self else {
            return Vec::new();
        };
        map.iter()
            .map(|(field, messages)| (field.clone(), join_messages(messages)))
            .collect()
    }

    /// First message for a single named field.
    pub fn field_message(&self, field: &str) -> Option<String> {
        match self {
            Self::Json(Value::Object(map)) => map.get(field).and_then(first_message),
            _ => None,
        }
    }

    /// The `detail` message. A raw text body counts as the detail itself.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.trim().chars().take(MAX_TEXT_MESSAGE).collect()),
            _ => self.field_message("detail"),
        }
    }

    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }
}

/// First human-readable string inside a (possibly nested) error value.
pub fn first_message(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(first_message),
        Value::Object(map) => map.values().find_map(first_message),
        _ => None,
    }
}

fn join_messages(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(join_messages)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
