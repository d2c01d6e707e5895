//! Connection manager: the single owner of session state.
//!
//! Everything observable (status, channel records, the event log) changes
//! here and only here. The manager is synchronous; the session runtime feeds
//! it user commands and transport notices one at a time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reverb_tester_shared::{
    AuthConfig, ChannelSubscription, ChannelType, ConnectionConfig, ConnectionStatus, LogKind,
    NewLogEntry, Preset, SubscriptionStatus, CLIENT_EVENT_PREFIX, DEFAULT_EVENT_NAMESPACE,
};
use serde_json::Value;

use super::bridge::EventBridge;
use super::connection::{
    Delivery, HandleId, HandleOptions, NoticeSink, Transport, TransportHandle, TransportNotice,
    TransportSignal,
};
use super::registry::ChannelRegistry;
use crate::auth_provider::{ChannelAuthorizer, HttpAuthorizer};
use crate::event_log::EventLog;

pub struct ConnectionManager<T: Transport> {
    transport: T,
    sink: NoticeSink,
    handle: Option<T::Handle>,
    next_handle: HandleId,

    status: ConnectionStatus,
    socket_id: Option<String>,
    connected_at: Option<DateTime<Utc>>,
    last_error: Option<String>,

    connection: ConnectionConfig,
    auth: AuthConfig,
    /// Used instead of the HTTP authorizer when set.
    authorizer: Option<Arc<dyn ChannelAuthorizer>>,

    registry: ChannelRegistry,
    bridge: EventBridge,
    log: EventLog,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, sink: NoticeSink, connection: ConnectionConfig, auth: AuthConfig) -> Self {
        Self {
            transport,
            sink,
            handle: None,
            next_handle: 1,
            status: ConnectionStatus::Disconnected,
            socket_id: None,
            connected_at: None,
            last_error: None,
            connection,
            auth,
            authorizer: None,
            registry: ChannelRegistry::new(),
            bridge: EventBridge::new(Some(DEFAULT_EVENT_NAMESPACE.to_string())),
            log: EventLog::new(),
        }
    }

    pub fn with_authorizer(mut self, authorizer: Arc<dyn ChannelAuthorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    // --- Accessors ---

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn socket_id(&self) -> Option<&str> {
        self.socket_id.as_deref()
    }

    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.connected_at
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn connection(&self) -> &ConnectionConfig {
        &self.connection
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    pub fn channels(&self) -> &[ChannelSubscription] {
        self.registry.as_slice()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Identity of the live transport handle, if any.
    pub fn live_handle(&self) -> Option<HandleId> {
        self.handle.as_ref().map(|h| h.id())
    }

    /// Append an entry to the event log.
    pub fn append(&mut self, entry: NewLogEntry) {
        self.log.append(entry);
    }

    // --- Connection lifecycle ---

    pub fn connect(&mut self) {
        if !self.status.can_connect() {
            self.append(NewLogEntry::error(format!(
                "Cannot connect: connection is {}",
                self.status
            )));
            return;
        }

        self.teardown();
        self.registry.clear();
        self.bridge.clear();

        self.status = ConnectionStatus::Connecting;
        self.socket_id = None;
        self.connected_at = None;
        self.last_error = None;
        self.append(NewLogEntry::system(format!(
            "Connecting to {}...",
            self.connection.url()
        )));

        let id = self.next_handle;
        self.next_handle += 1;
        let options = HandleOptions::from_config(&self.connection, self.authorizer_for_connection());

        match self.transport.create_handle(id, options, self.sink.clone()) {
            Ok(handle) => {
                crate::log_debug!("manager: created transport handle {}", id);
                self.handle = Some(handle);
            }
            Err(e) => {
                crate::log_error!("manager: failed to create transport handle: {}", e);
                self.status = ConnectionStatus::Error;
                self.last_error = Some(e.to_string());
                self.append(NewLogEntry::error(format!("Failed to create connection: {}", e)));
            }
        }
    }

    fn authorizer_for_connection(&self) -> Option<Arc<dyn ChannelAuthorizer>> {
        if !self.auth.is_usable() {
            return None;
        }
        match &self.authorizer {
            Some(authorizer) => Some(authorizer.clone()),
            None => Some(Arc::new(HttpAuthorizer::new(&self.auth))),
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            for channel in self.registry.iter() {
                handle.leave(&channel.full_name);
            }
        }
        self.teardown();

        self.status = ConnectionStatus::Disconnected;
        self.socket_id = None;
        self.connected_at = None;
        self.last_error = None;
        self.registry.clear();
        self.bridge.clear();
        self.append(NewLogEntry::system("Disconnected"));
    }

    /// Drop the transport without touching the log. Used when the session ends.
    pub fn shutdown(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            crate::log_debug!("manager: tearing down transport handle {}", handle.id());
            handle.disconnect();
        }
    }

    // --- Channels ---

    /// Subscribe to a channel. Returns the new record's id, or `None` when
    /// the request was rejected (the reason is logged).
    pub fn subscribe(&mut self, kind: ChannelType, name: &str, events: Vec<String>) -> Option<String> {
        if !self.status.is_connected() || self.handle.is_none() {
            self.append(NewLogEntry::error("Cannot subscribe: not connected"));
            return None;
        }

        let name = name.trim();
        if name.is_empty() {
            self.append(NewLogEntry::error("Cannot subscribe: channel name is required"));
            return None;
        }

        let full_name = kind.full_name(name);
        if self.registry.find_by_full_name(&full_name).is_some() {
            self.append(NewLogEntry::error(format!("Already subscribed to {}", full_name)));
            return None;
        }
        if kind.requires_auth() && !self.auth.is_usable() {
            self.append(NewLogEntry::error(format!(
                "Cannot subscribe to {}: authentication is not configured",
                full_name
            )));
            return None;
        }

        let events = events
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        let subscription = ChannelSubscription::new(kind, name, events);
        let id = subscription.id.clone();

        if self.registry.insert(subscription.clone()).is_err() {
            return None;
        }
        self.append(
            NewLogEntry::system(format!("Subscribing to {}...", full_name)).channel(&full_name),
        );

        let Some(handle) = self.handle.as_mut() else {
            return Some(id);
        };
        self.bridge.wire(handle, &subscription);
        if let Err(e) = handle.join(kind, &full_name) {
            crate::log_warn!("manager: join '{}' failed: {}", full_name, e);
            self.registry.mark_error(&full_name, e.to_string());
            self.append(
                NewLogEntry::error(format!("Failed to subscribe: {}", e)).channel(&full_name),
            );
        }

        Some(id)
    }

    /// Leave and forget a channel. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: &str) {
        let Some(channel) = self.registry.remove(id) else {
            return;
        };
        if let Some(handle) = self.handle.as_mut() {
            handle.leave(&channel.full_name);
        }
        self.bridge.release(&channel.full_name);
        self.append(
            NewLogEntry::new(LogKind::Unsubscribed)
                .channel(&channel.full_name)
                .message(format!("Unsubscribed from {}", channel.full_name)),
        );
    }

    /// Send a client event on a subscribed private or presence channel.
    pub fn whisper(&mut self, channel_id: &str, event: &str, data: Value) {
        let Some(channel) = self.registry.get(channel_id) else {
            self.append(NewLogEntry::error("Cannot whisper: unknown channel"));
            return;
        };
        let full_name = channel.full_name.clone();

        if !channel.r#type.requires_auth() {
            self.append(
                NewLogEntry::error(format!(
                    "Cannot whisper on {}: client events need a private or presence channel",
                    full_name
                ))
                .channel(&full_name),
            );
            return;
        }
        if channel.status != SubscriptionStatus::Subscribed {
            self.append(
                NewLogEntry::error(format!("Cannot whisper on {}: not subscribed", full_name))
                    .channel(&full_name),
            );
            return;
        }

        let event = event.trim();
        if event.is_empty() {
            self.append(NewLogEntry::error("Cannot whisper: event name is required").channel(&full_name));
            return;
        }
        let wire_event = if event.starts_with(CLIENT_EVENT_PREFIX) {
            event.to_string()
        } else {
            format!("{}{}", CLIENT_EVENT_PREFIX, event)
        };

        let Some(handle) = self.handle.as_mut() else {
            self.append(NewLogEntry::error("Cannot whisper: not connected").channel(&full_name));
            return;
        };
        match handle.send_event(&full_name, &wire_event, data.clone()) {
            Ok(()) => self.append(
                NewLogEntry::new(LogKind::Whisper)
                    .channel(&full_name)
                    .event(wire_event)
                    .payload(data)
                    .message("Whisper sent"),
            ),
            Err(e) => self.append(
                NewLogEntry::error(format!("Whisper failed: {}", e)).channel(&full_name),
            ),
        }
    }

    // --- Transport notices ---

    pub fn handle_notice(&mut self, notice: TransportNotice) {
        if self.live_handle() != Some(notice.handle) {
            crate::log_debug!(
                "manager: dropping notice from superseded handle {}: {:?}",
                notice.handle,
                notice.signal
            );
            return;
        }

        match notice.signal {
            TransportSignal::Connecting => {}
            TransportSignal::Connected { socket_id } => {
                self.status = ConnectionStatus::Connected;
                self.connected_at = Some(Utc::now());
                self.last_error = None;
                self.append(NewLogEntry::system(format!("Connected! Socket ID: {}", socket_id)));
                self.socket_id = Some(socket_id);
            }
            TransportSignal::Disconnected => {
                self.status = ConnectionStatus::Disconnected;
                self.socket_id = None;
                self.connected_at = None;
                self.last_error = None;
                self.append(NewLogEntry::system("Disconnected from server"));
            }
            TransportSignal::StateChange { current, .. } => {
                self.append(NewLogEntry::system(format!("Connection state: {}", current)));
            }
            TransportSignal::Error(message) => self.fail(message),
            TransportSignal::Unavailable => self.fail("Connection unavailable".to_string()),
            TransportSignal::Failed => self.fail("Connection failed".to_string()),
            TransportSignal::Channel { channel, delivery } => self.deliver(&channel, delivery),
        }
    }

    fn fail(&mut self, message: String) {
        self.status = ConnectionStatus::Error;
        self.socket_id = None;
        self.connected_at = None;
        self.append(NewLogEntry::error(format!("Connection error: {}", message)));
        self.last_error = Some(message);
    }

    fn deliver(&mut self, channel: &str, delivery: Delivery) {
        let Some(subscription) = self.registry.find_by_full_name(channel) else {
            crate::log_debug!("manager: delivery for untracked channel '{}'", channel);
            return;
        };

        match delivery {
            Delivery::SubscriptionSucceeded(_) => {
                if self.registry.mark_subscribed(channel) {
                    self.append(
                        NewLogEntry::new(LogKind::Subscribed)
                            .channel(channel)
                            .message(format!("Subscribed to {}", channel)),
                    );
                }
            }
            Delivery::SubscriptionError(error) => {
                let message = error.to_string();
                if self.registry.mark_error(channel, message.clone()) {
                    self.append(
                        NewLogEntry::error(format!("Subscription failed: {}", message))
                            .channel(channel)
                            .payload(error.payload()),
                    );
                }
            }
            other => {
                if let Some(entry) = self.bridge.normalize(subscription, &other) {
                    self.append(entry);
                }
            }
        }
    }

    // --- Settings ---

    fn settings_locked(&mut self) -> bool {
        let locked = matches!(
            self.status,
            ConnectionStatus::Connecting | ConnectionStatus::Connected
        );
        if locked {
            self.append(NewLogEntry::error(
                "Disconnect before changing connection settings",
            ));
        }
        locked
    }

    pub fn update_connection(&mut self, connection: ConnectionConfig) -> bool {
        if self.settings_locked() {
            return false;
        }
        self.connection = connection;
        true
    }

    pub fn update_auth(&mut self, auth: AuthConfig) -> bool {
        if self.settings_locked() {
            return false;
        }
        self.auth = auth;
        true
    }

    /// Replace both configs with a preset's.
    pub fn apply_preset(&mut self, preset: &Preset) -> bool {
        if self.settings_locked() {
            return false;
        }
        self.connection = preset.connection.clone();
        self.auth = preset.auth.clone();
        true
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl<T: Transport> Drop for ConnectionManager<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
