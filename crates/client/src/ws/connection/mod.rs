//! Transport capability consumed by the connection manager.
//!
//! The manager never parses wire frames. It drives a [`Transport`] that
//! creates one [`TransportHandle`] per connection attempt, and it learns
//! about everything that happens on that handle through [`TransportNotice`]s
//! pushed into a [`NoticeSink`]. Each notice carries the [`HandleId`] of the
//! handle that produced it so late notices from a superseded handle can be
//! told apart from live ones.

use std::sync::Arc;

use futures_channel::mpsc::UnboundedSender;
use reverb_tester_shared::{
    ChannelType, ConnectError, ConnectionConfig, SubscriptionError, TransportError, BROADCASTER,
    DEFAULT_CLUSTER, DEFAULT_EVENT_NAMESPACE,
};
use serde_json::Value;

use crate::auth_provider::ChannelAuthorizer;

mod pusher;

pub use pusher::{PusherHandle, PusherTransport};

/// Identity of one transport handle. Never reused within a process.
pub type HandleId = u64;

/// Where transport handles report what happened.
pub type NoticeSink = UnboundedSender<TransportNotice>;

/// A signal from a transport handle, tagged with the handle's identity.
#[derive(Debug, Clone)]
pub struct TransportNotice {
    pub handle: HandleId,
    pub signal: TransportSignal,
}

impl TransportNotice {
    pub fn new(handle: HandleId, signal: TransportSignal) -> Self {
        Self { handle, signal }
    }
}

/// Connection-wide and channel-level signals.
#[derive(Debug, Clone)]
pub enum TransportSignal {
    Connecting,
    Connected { socket_id: String },
    Disconnected,
    StateChange { previous: String, current: String },
    Error(String),
    Unavailable,
    Failed,
    Channel { channel: String, delivery: Delivery },
}

/// One delivery on a channel binding.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Typed listener; `listener` is the declared event name it was bound with.
    Typed { listener: String, data: Value },
    /// Raw bind on the exact event name.
    Raw { event: String, data: Value },
    /// Catch-all; sees every event on the channel, reserved ones included.
    Any { event: String, data: Value },
    SubscriptionSucceeded(Value),
    SubscriptionError(SubscriptionError),
    /// Initial presence roster.
    Here(Vec<Value>),
    Joining(Value),
    Leaving(Value),
}

/// A delivery path a channel can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Binding {
    Typed(String),
    Raw(String),
    Any,
    SubscriptionSucceeded,
    SubscriptionError,
    Here,
    Joining,
    Leaving,
}

impl Binding {
    /// Whether `delivery` travels on this binding.
    pub fn carries(&self, delivery: &Delivery) -> bool {
        match (self, delivery) {
            (Binding::Typed(bound), Delivery::Typed { listener, .. }) => bound == listener,
            (Binding::Raw(bound), Delivery::Raw { event, .. }) => bound == event,
            (Binding::Any, Delivery::Any { .. })
            | (Binding::SubscriptionSucceeded, Delivery::SubscriptionSucceeded(_))
            | (Binding::SubscriptionError, Delivery::SubscriptionError(_))
            | (Binding::Here, Delivery::Here(_))
            | (Binding::Joining, Delivery::Joining(_))
            | (Binding::Leaving, Delivery::Leaving(_)) => true,
            _ => false,
        }
    }
}

/// Everything a transport needs to open one connection.
#[derive(Clone)]
pub struct HandleOptions {
    pub broadcaster: String,
    pub key: String,
    pub host: String,
    pub ws_port: u16,
    pub wss_port: u16,
    pub force_tls: bool,
    pub cluster: String,
    pub disable_stats: bool,
    /// Namespace typed listeners qualify event names with.
    pub event_namespace: Option<String>,
    pub authorizer: Option<Arc<dyn ChannelAuthorizer>>,
}

impl HandleOptions {
    pub fn from_config(
        connection: &ConnectionConfig,
        authorizer: Option<Arc<dyn ChannelAuthorizer>>,
    ) -> Self {
        let port = connection.effective_port();
        Self {
            broadcaster: BROADCASTER.to_string(),
            key: connection.key.trim().to_string(),
            host: connection.host.trim().to_string(),
            ws_port: port,
            wss_port: port,
            force_tls: connection.scheme.use_tls(),
            cluster: connection.cluster_hint().unwrap_or(DEFAULT_CLUSTER).to_string(),
            disable_stats: true,
            event_namespace: Some(DEFAULT_EVENT_NAMESPACE.to_string()),
            authorizer,
        }
    }

    pub fn port(&self) -> u16 {
        if self.force_tls {
            self.wss_port
        } else {
            self.ws_port
        }
    }
}

impl std::fmt::Debug for HandleOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandleOptions")
            .field("broadcaster", &self.broadcaster)
            .field("key", &self.key)
            .field("host", &self.host)
            .field("ws_port", &self.ws_port)
            .field("wss_port", &self.wss_port)
            .field("force_tls", &self.force_tls)
            .field("cluster", &self.cluster)
            .field("disable_stats", &self.disable_stats)
            .field("event_namespace", &self.event_namespace)
            .field("authorizer", &self.authorizer.is_some())
            .finish()
    }
}

/// Factory for transport handles.
pub trait Transport {
    type Handle: TransportHandle;

    /// Open a new connection. Configuration problems fail synchronously;
    /// everything after that is reported through `sink`.
    fn create_handle(
        &mut self,
        id: HandleId,
        options: HandleOptions,
        sink: NoticeSink,
    ) -> Result<Self::Handle, ConnectError>;
}

/// One live (or connecting) transport session.
pub trait TransportHandle {
    fn id(&self) -> HandleId;

    fn socket_id(&self) -> Option<String>;

    /// Join a channel: open for public, authorized for private, authorized
    /// with a member roster for presence.
    fn join(&mut self, kind: ChannelType, channel: &str) -> Result<(), TransportError>;

    fn leave(&mut self, channel: &str);

    fn bind(&mut self, channel: &str, binding: Binding);

    fn send_event(&mut self, channel: &str, event: &str, data: Value) -> Result<(), TransportError>;

    /// Close the connection. Safe to call more than once.
    fn disconnect(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverb_tester_shared::Scheme;
    use serde_json::json;

    #[test]
    fn options_follow_connection_config() {
        let config = ConnectionConfig {
            host: " reverb.test ".to_string(),
            port: None,
            key: "app-key".to_string(),
            scheme: Scheme::Wss,
            cluster: String::new(),
        };
        let options = HandleOptions::from_config(&config, None);

        assert_eq!(options.host, "reverb.test");
        assert_eq!(options.port(), 443);
        assert!(options.force_tls);
        assert!(options.disable_stats);
        assert_eq!(options.cluster, DEFAULT_CLUSTER);
        assert_eq!(options.broadcaster, "reverb");
    }

    #[test]
    fn bindings_carry_matching_deliveries() {
        let typed = Delivery::Typed {
            listener: ".MessageSent".to_string(),
            data: json!({}),
        };
        assert!(Binding::Typed(".MessageSent".to_string()).carries(&typed));
        assert!(!Binding::Typed("Other".to_string()).carries(&typed));
        assert!(!Binding::Raw(".MessageSent".to_string()).carries(&typed));
        assert!(Binding::Here.carries(&Delivery::Here(vec![])));
    }
}
