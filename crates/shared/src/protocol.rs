//! Pusher channels protocol vocabulary (protocol version 7).
//!
//! Only the parts a subscribing client needs: frame shape, reserved event
//! names and the Laravel Echo event-name conventions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PROTOCOL_VERSION: u8 = 7;
pub const CLIENT_NAME: &str = "reverb-tester";
pub const BROADCASTER: &str = "reverb";
pub const DEFAULT_CLUSTER: &str = "mt1";
/// Namespace Laravel Echo prepends to event names that are not prefixed.
pub const DEFAULT_EVENT_NAMESPACE: &str = "App.Events";

/// Prefix for events reserved by the protocol, as seen by channel listeners.
pub const RESERVED_PREFIX: &str = "pusher:";
/// Prefix the server uses on the wire for channel-internal events.
pub const INTERNAL_PREFIX: &str = "pusher_internal:";
pub const CLIENT_EVENT_PREFIX: &str = "client-";

pub const EVENT_CONNECTION_ESTABLISHED: &str = "pusher:connection_established";
pub const EVENT_ERROR: &str = "pusher:error";
pub const EVENT_PING: &str = "pusher:ping";
pub const EVENT_PONG: &str = "pusher:pong";
pub const EVENT_SUBSCRIBE: &str = "pusher:subscribe";
pub const EVENT_UNSUBSCRIBE: &str = "pusher:unsubscribe";
pub const EVENT_SUBSCRIPTION_SUCCEEDED: &str = "pusher:subscription_succeeded";
pub const EVENT_SUBSCRIPTION_ERROR: &str = "pusher:subscription_error";
pub const EVENT_MEMBER_ADDED: &str = "pusher:member_added";
pub const EVENT_MEMBER_REMOVED: &str = "pusher:member_removed";
pub const INTERNAL_SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";
pub const INTERNAL_MEMBER_ADDED: &str = "pusher_internal:member_added";
pub const INTERNAL_MEMBER_REMOVED: &str = "pusher_internal:member_removed";

/// A single protocol frame, in either direction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PusherFrame {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl PusherFrame {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            channel: None,
            data: None,
            user_id: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn subscribe(channel: &str, auth: Option<&Value>) -> Self {
        let mut data = json!({ "channel": channel });
        if let Some(auth) = auth {
            if let Some(signature) = auth.get("auth") {
                data["auth"] = signature.clone();
            }
            if let Some(channel_data) = auth.get("channel_data") {
                data["channel_data"] = channel_data.clone();
            }
        }
        Self::new(EVENT_SUBSCRIBE).with_data(data)
    }

    pub fn unsubscribe(channel: &str) -> Self {
        Self::new(EVENT_UNSUBSCRIBE).with_data(json!({ "channel": channel }))
    }

    pub fn ping() -> Self {
        Self::new(EVENT_PING).with_data(json!({}))
    }

    pub fn pong() -> Self {
        Self::new(EVENT_PONG).with_data(json!({}))
    }

    pub fn client_event(channel: &str, event: &str, data: Value) -> Self {
        Self::new(event).with_channel(channel).with_data(data)
    }

    /// Frame payload with JSON-encoded strings decoded, the way pusher-js
    /// hands data to listeners.
    pub fn decoded_data(&self) -> Value {
        self.data.as_ref().map(decode_data).unwrap_or(Value::Null)
    }
}

/// Decode a JSON-encoded string payload; anything else passes through.
pub fn decode_data(data: &Value) -> Value {
    match data {
        Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| data.clone()),
        other => other.clone(),
    }
}

/// Payload of `pusher:connection_established`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionEstablished {
    pub socket_id: String,
    #[serde(default)]
    pub activity_timeout: Option<u64>,
}

/// Payload of `pusher:error`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProtocolError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<u16>,
}

impl ProtocolError {
    /// Codes 4000-4099 mean the connection must not be retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self.code, Some(4000..=4099))
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

/// Reserved protocol events never reach the catch-all log.
pub fn is_reserved_event(event: &str) -> bool {
    event.starts_with(RESERVED_PREFIX) || event.starts_with(INTERNAL_PREFIX)
}

/// Name a channel listener observes for a wire event name.
pub fn client_visible_name(event: &str) -> String {
    match event.strip_prefix(INTERNAL_PREFIX) {
        Some(rest) => format!("{}{}", RESERVED_PREFIX, rest),
        None => event.to_string(),
    }
}

/// Laravel Echo event-name formatting.
///
/// A leading `.` or `\` marks a custom event name and is stripped as-is;
/// anything else is qualified with the namespace and written with `\`
/// separators, e.g. `MessageSent` becomes `App\Events\MessageSent`.
pub fn format_event_name(event: &str, namespace: Option<&str>) -> String {
    if let Some(rest) = event.strip_prefix('.').or_else(|| event.strip_prefix('\\')) {
        return rest.to_string();
    }
    let qualified = match namespace {
        Some(ns) if !ns.is_empty() => format!("{}.{}", ns, event),
        _ => event.to_string(),
    };
    qualified.replace('.', "\\")
}

/// Whether `event` is one of the accepted spellings of a declared event:
/// bare, dot-prefixed or backslash-prefixed.
pub fn matches_declared_event(event: &str, declared: &str) -> bool {
    let bare = declared
        .strip_prefix('.')
        .or_else(|| declared.strip_prefix('\\'))
        .unwrap_or(declared);
    event == declared
        || event == bare
        || event.strip_prefix('.') == Some(bare)
        || event.strip_prefix('\\') == Some(bare)
}

/// Members of a presence roster, in the order of its `ids` list.
///
/// Accepts both the wire shape (`{"presence": {...}}`) and the inner object.
pub fn roster_members(data: &Value) -> Vec<Value> {
    let presence = data.get("presence").unwrap_or(data);
    let hash = presence.get("hash").and_then(Value::as_object);
    let ids = presence.get("ids").and_then(Value::as_array);

    match (ids, hash) {
        (Some(ids), Some(hash)) => ids
            .iter()
            .map(|id| {
                let key = match id {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                hash.get(&key).cloned().unwrap_or(Value::Null)
            })
            .collect(),
        (None, Some(hash)) => hash.values().cloned().collect(),
        _ => Vec::new(),
    }
}

/// The member description carried by `member_added`/`member_removed`.
pub fn member_info(data: &Value) -> Value {
    data.get("user_info").cloned().unwrap_or_else(|| data.clone())
}
