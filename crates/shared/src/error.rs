//! Error types crossing the transport and authorization boundaries.

use serde_json::Value;
use thiserror::Error;

/// Failure of a channel authorization request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Auth failed ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
    #[error("No authorizer configured for {0}")]
    NotConfigured(String),
}

/// Failure creating a transport handle from a connection config.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    #[error("invalid connection config: {0}")]
    InvalidConfig(String),
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Failure issuing a command on a live transport handle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("not connected")]
    NotConnected,
    #[error("connection closed")]
    Closed,
}

/// Failure managing saved presets.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("preset name is required")]
    BlankName,
    #[error("no preset with id {0}")]
    NotFound(String),
}

/// Why a channel subscription was rejected.
///
/// Payloads arrive either from the authorization provider (a typed error)
/// or from the server/transport as arbitrary JSON; [`SubscriptionError::from_payload`]
/// classifies the latter.
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionError {
    /// Authorization request failed before the subscribe frame was sent.
    Auth(AuthError),
    /// A bare string payload.
    Text(String),
    /// An object exposing an `error` field.
    Error { error: String, payload: Value },
    /// An object exposing a `message` field.
    Message { message: String, payload: Value },
    /// An HTTP-style `{status, type}` object.
    Http { status: String, kind: Option<String>, payload: Value },
    /// Anything else.
    Unrecognized(Value),
}

impl SubscriptionError {
    pub fn from_payload(payload: Value) -> Self {
        match &payload {
            Value::String(text) => SubscriptionError::Text(text.clone()),
            Value::Object(map) => {
                if let Some(error) = map.get("error").filter(|v| is_truthy(v)) {
                    SubscriptionError::Error {
                        error: display_value(error),
                        payload: payload.clone(),
                    }
                } else if let Some(message) = map.get("message").filter(|v| is_truthy(v)) {
                    SubscriptionError::Message {
                        message: display_value(message),
                        payload: payload.clone(),
                    }
                } else if let Some(status) = map.get("status").filter(|v| is_truthy(v)) {
                    SubscriptionError::Http {
                        status: display_value(status),
                        kind: map.get("type").filter(|v| is_truthy(v)).map(display_value),
                        payload: payload.clone(),
                    }
                } else {
                    SubscriptionError::Unrecognized(payload)
                }
            }
            Value::Null => SubscriptionError::Unrecognized(payload),
            other => SubscriptionError::Text(display_value(other)),
        }
    }

    /// Raw payload for the log, when one exists.
    pub fn payload(&self) -> Value {
        match self {
            SubscriptionError::Auth(err) => serde_json::json!({ "error": err.to_string() }),
            SubscriptionError::Text(text) => Value::String(text.clone()),
            SubscriptionError::Error { payload, .. }
            | SubscriptionError::Message { payload, .. }
            | SubscriptionError::Http { payload, .. } => payload.clone(),
            SubscriptionError::Unrecognized(payload) => payload.clone(),
        }
    }
}

impl std::fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionError::Auth(err) => write!(f, "{}", err),
            SubscriptionError::Text(text) => f.write_str(text),
            SubscriptionError::Error { error, .. } => f.write_str(error),
            SubscriptionError::Message { message, .. } => f.write_str(message),
            SubscriptionError::Http { status, kind, .. } => write!(
                f,
                "HTTP {}: {}",
                status,
                kind.as_deref().unwrap_or("Unknown error")
            ),
            SubscriptionError::Unrecognized(payload) => {
                let rendered =
                    serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
                f.write_str(&rendered)
            }
        }
    }
}

impl std::error::Error for SubscriptionError {}

impl From<AuthError> for SubscriptionError {
    fn from(err: AuthError) -> Self {
        SubscriptionError::Auth(err)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
