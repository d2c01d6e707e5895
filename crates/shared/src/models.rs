//! Data model shared between the session engine and the UI.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Connection ---

/// Top-level state of the realtime session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }

    /// Whether a new `connect()` may be issued from this state.
    pub fn can_connect(&self) -> bool {
        matches!(self, ConnectionStatus::Disconnected | ConnectionStatus::Error)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Ws,
    Wss,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
        }
    }

    pub fn use_tls(&self) -> bool {
        matches!(self, Scheme::Wss)
    }

    /// Port used when the connection config leaves it unset.
    pub fn default_port(&self) -> u16 {
        if self.use_tls() {
            443
        } else {
            80
        }
    }
}

impl std::str::FromStr for Scheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ws" => Ok(Scheme::Ws),
            "wss" => Ok(Scheme::Wss),
            other => Err(format!("unknown scheme '{}' (expected ws or wss)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    pub host: String,
    pub port: Option<u16>,
    pub key: String,
    pub scheme: Scheme,
    /// Cluster hint, empty when unset.
    #[serde(default)]
    pub cluster: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: None,
            key: String::new(),
            scheme: Scheme::Ws,
            cluster: String::new(),
        }
    }
}

impl ConnectionConfig {
    /// Display URL: `scheme://host`, with `:port` only when a port is set.
    pub fn url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{}", self.scheme.as_str(), self.host, port),
            None => format!("{}://{}", self.scheme.as_str(), self.host),
        }
    }

    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }

    pub fn cluster_hint(&self) -> Option<&str> {
        let cluster = self.cluster.trim();
        (!cluster.is_empty()).then_some(cluster)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub enabled: bool,
    pub endpoint: String,
    #[serde(default)]
    pub bearer_token: String,
    #[serde(default)]
    pub csrf_token: String,
}

impl AuthConfig {
    /// Authentication is only attached to a connection when it is enabled
    /// and has somewhere to send requests.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.endpoint.trim().is_empty()
    }
}

// --- Channels ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ChannelType {
    Public,
    Private,
    Presence,
}

impl ChannelType {
    pub const ALL: [ChannelType; 3] = [ChannelType::Public, ChannelType::Private, ChannelType::Presence];

    pub fn prefix(&self) -> &'static str {
        match self {
            ChannelType::Public => "",
            ChannelType::Private => "private-",
            ChannelType::Presence => "presence-",
        }
    }

    /// Private and presence channels need a signed authorization.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, ChannelType::Public)
    }

    pub fn full_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix(), name)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChannelType::Public => "public",
            ChannelType::Private => "private",
            ChannelType::Presence => "presence",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SubscriptionStatus {
    Subscribing,
    Subscribed,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSubscription {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: ChannelType,
    pub name: String,
    pub full_name: String,
    pub events: Vec<String>,
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ChannelSubscription {
    pub fn new(r#type: ChannelType, name: &str, events: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            r#type,
            name: name.to_string(),
            full_name: r#type.full_name(name),
            events,
            status: SubscriptionStatus::Subscribing,
            error_message: None,
        }
    }
}

// --- Event log ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum LogKind {
    System,
    Subscribed,
    Unsubscribed,
    Event,
    Error,
    Whisper,
}

impl LogKind {
    pub fn label(&self) -> &'static str {
        match self {
            LogKind::System => "system",
            LogKind::Subscribed => "subscribed",
            LogKind::Unsubscribed => "unsubscribed",
            LogKind::Event => "event",
            LogKind::Error => "error",
            LogKind::Whisper => "whisper",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: LogKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A log entry before the log assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub kind: LogKind,
    pub channel: Option<String>,
    pub event: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl NewLogEntry {
    pub fn new(kind: LogKind) -> Self {
        Self {
            kind,
            channel: None,
            event: None,
            payload: None,
            message: None,
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(LogKind::System).message(message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogKind::Error).message(message)
    }

    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// --- Presets ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub connection: ConnectionConfig,
    pub auth: AuthConfig,
    pub created_at: DateTime<Utc>,
}

impl Preset {
    pub fn new(name: impl Into<String>, connection: ConnectionConfig, auth: AuthConfig) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            connection,
            auth,
            created_at: Utc::now(),
        }
    }
}
