//! Pusher channels transport over `tokio-tungstenite`.
//!
//! One [`PusherHandle`] owns one background task speaking protocol version 7:
//! it completes the handshake, answers and issues heartbeats, sends
//! subscribe/unsubscribe frames, runs the authorizer for private and
//! presence joins, and fans every inbound channel frame out to the delivery
//! paths bound on that channel. There is no automatic reconnection; a drop
//! is reported as `disconnected` and the caller decides what to do.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::{Sink, SinkExt, StreamExt};
use reverb_tester_shared::{
    client_visible_name, format_event_name, is_reserved_event, member_info, roster_members,
    AuthError, ChannelType, ConnectError, ConnectionEstablished, ProtocolError, PusherFrame,
    SubscriptionError, TransportError, CLIENT_NAME, EVENT_CONNECTION_ESTABLISHED, EVENT_ERROR,
    EVENT_MEMBER_ADDED, EVENT_MEMBER_REMOVED, EVENT_PING, EVENT_PONG, EVENT_SUBSCRIPTION_ERROR,
    EVENT_SUBSCRIPTION_SUCCEEDED, PROTOCOL_VERSION,
};
use serde_json::Value;
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{
    Binding, Delivery, HandleId, HandleOptions, NoticeSink, Transport, TransportHandle,
    TransportNotice, TransportSignal,
};

/// Used until the server announces its own activity timeout.
const DEFAULT_ACTIVITY_TIMEOUT: Duration = Duration::from_secs(120);
const PONG_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the socket URL for `options`.
///
/// `<scheme>://<host>:<port>/app/<key>?protocol=7&client=...&version=...&flash=false`
pub fn connection_url(options: &HandleOptions) -> Result<url::Url, ConnectError> {
    if options.key.is_empty() {
        return Err(ConnectError::InvalidConfig(
            "an application key is required".to_string(),
        ));
    }
    if options.host.is_empty() {
        return Err(ConnectError::InvalidConfig("a host is required".to_string()));
    }

    let scheme = if options.force_tls { "wss" } else { "ws" };
    let raw = format!("{}://{}:{}/app/{}", scheme, options.host, options.port(), options.key);
    let mut url = url::Url::parse(&raw)
        .map_err(|e| ConnectError::InvalidConfig(format!("{}: {}", raw, e)))?;
    url.query_pairs_mut()
        .append_pair("protocol", &PROTOCOL_VERSION.to_string())
        .append_pair("client", CLIENT_NAME)
        .append_pair("version", env!("CARGO_PKG_VERSION"))
        .append_pair("flash", "false");
    Ok(url)
}

/// Creates [`PusherHandle`]s. Must be used from inside a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct PusherTransport;

impl PusherTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for PusherTransport {
    type Handle = PusherHandle;

    fn create_handle(
        &mut self,
        id: HandleId,
        options: HandleOptions,
        sink: NoticeSink,
    ) -> Result<PusherHandle, ConnectError> {
        let url = connection_url(&options)?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ConnectError::Unavailable(e.to_string()))?;

        let (commands, receiver) = unbounded();
        let shared = Arc::new(Mutex::new(Shared::default()));

        let connection = PusherConnection::new(id, url.to_string(), options, shared.clone(), sink);
        runtime.spawn(connection.run(receiver));

        Ok(PusherHandle {
            id,
            shared,
            commands,
        })
    }
}

/// State visible to both the handle and its connection task.
#[derive(Debug, Default)]
struct Shared {
    socket_id: Option<String>,
    bindings: HashMap<String, Vec<Binding>>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
enum Command {
    Join { kind: ChannelType, channel: String },
    Leave(String),
    Send(PusherFrame),
    Close,
}

/// Handle to one Pusher connection.
pub struct PusherHandle {
    id: HandleId,
    shared: Arc<Mutex<Shared>>,
    commands: UnboundedSender<Command>,
}

impl PusherHandle {
    fn send(&self, command: Command) -> Result<(), TransportError> {
        self.commands
            .unbounded_send(command)
            .map_err(|_| TransportError::Closed)
    }
}

impl TransportHandle for PusherHandle {
    fn id(&self) -> HandleId {
        self.id
    }

    fn socket_id(&self) -> Option<String> {
        lock(&self.shared).socket_id.clone()
    }

    fn join(&mut self, kind: ChannelType, channel: &str) -> Result<(), TransportError> {
        self.send(Command::Join {
            kind,
            channel: channel.to_string(),
        })
    }

    fn leave(&mut self, channel: &str) {
        lock(&self.shared).bindings.remove(channel);
        let _ = self.send(Command::Leave(channel.to_string()));
    }

    fn bind(&mut self, channel: &str, binding: Binding) {
        let mut shared = lock(&self.shared);
        let bindings = shared.bindings.entry(channel.to_string()).or_default();
        if !bindings.contains(&binding) {
            bindings.push(binding);
        }
    }

    fn send_event(&mut self, channel: &str, event: &str, data: Value) -> Result<(), TransportError> {
        if self.socket_id().is_none() {
            return Err(TransportError::NotConnected);
        }
        self.send(Command::Send(PusherFrame::client_event(channel, event, data)))
    }

    fn disconnect(&mut self) {
        let _ = self.commands.unbounded_send(Command::Close);
        self.commands.close_channel();
    }
}

impl Drop for PusherHandle {
    fn drop(&mut self) {
        self.commands.close_channel();
    }
}

/// Result of an authorizer call, fed back into the connection loop.
struct AuthOutcome {
    channel: String,
    /// Join the authorization was started for.
    generation: u64,
    result: Result<Value, AuthError>,
}

/// A channel joined on this connection. `generation` is unique per join so
/// an authorization started for an earlier join of the same name is ignored.
#[derive(Debug, Clone, Copy)]
struct Joined {
    kind: ChannelType,
    generation: u64,
}

/// What the loop should do after handling an inbound frame.
enum Step {
    Continue(Vec<PusherFrame>),
    Close,
}

struct PusherConnection {
    id: HandleId,
    url: String,
    options: HandleOptions,
    shared: Arc<Mutex<Shared>>,
    sink: NoticeSink,
    /// Channels joined on this connection.
    joined: HashMap<String, Joined>,
    next_generation: u64,
    /// Joins issued before the socket id was known.
    pending: Vec<String>,
    activity_timeout: Duration,
    state: &'static str,
}

impl PusherConnection {
    fn new(
        id: HandleId,
        url: String,
        options: HandleOptions,
        shared: Arc<Mutex<Shared>>,
        sink: NoticeSink,
    ) -> Self {
        Self {
            id,
            url,
            options,
            shared,
            sink,
            joined: HashMap::new(),
            next_generation: 1,
            pending: Vec::new(),
            activity_timeout: DEFAULT_ACTIVITY_TIMEOUT,
            state: "initialized",
        }
    }

    fn emit(&self, signal: TransportSignal) {
        let _ = self.sink.unbounded_send(TransportNotice::new(self.id, signal));
    }

    fn set_state(&mut self, next: &'static str) {
        if self.state == next {
            return;
        }
        crate::log_debug!("pusher[{}]: state {} -> {}", self.id, self.state, next);
        self.emit(TransportSignal::StateChange {
            previous: self.state.to_string(),
            current: next.to_string(),
        });
        self.state = next;
    }

    fn socket_id(&self) -> Option<String> {
        lock(&self.shared).socket_id.clone()
    }

    fn bindings_for(&self, channel: &str) -> Vec<Binding> {
        lock(&self.shared)
            .bindings
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    async fn run(mut self, mut commands: UnboundedReceiver<Command>) {
        self.set_state("connecting");
        self.emit(TransportSignal::Connecting);
        crate::log_info!("pusher[{}]: connecting to {}", self.id, self.url);

        let url = self.url.clone();
        let ws_stream = tokio::select! {
            result = connect_async(url.as_str()) => match result {
                Ok((stream, _response)) => stream,
                Err(e) => {
                    crate::log_error!("pusher[{}]: handshake with {} failed: {}", self.id, url, e);
                    self.emit(TransportSignal::Error(format!("WebSocket error: {}", e)));
                    self.set_state("unavailable");
                    self.emit(TransportSignal::Unavailable);
                    return;
                }
            },
            _ = wait_for_close(&mut commands) => {
                crate::log_info!("pusher[{}]: closed before the handshake completed", self.id);
                self.set_state("disconnected");
                self.emit(TransportSignal::Disconnected);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();
        let (auth_tx, mut auth_rx) = unbounded::<AuthOutcome>();

        let idle = tokio::time::sleep(self.activity_timeout);
        tokio::pin!(idle);
        let mut awaiting_pong = false;

        loop {
            let outgoing: Vec<PusherFrame> = tokio::select! {
                command = commands.next() => match command {
                    Some(Command::Join { kind, channel }) => {
                        self.join(kind, channel, &auth_tx).into_iter().collect()
                    }
                    Some(Command::Leave(channel)) => self.leave(&channel).into_iter().collect(),
                    Some(Command::Send(frame)) => vec![frame],
                    Some(Command::Close) | None => {
                        crate::log_info!("pusher[{}]: closing", self.id);
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                },
                message = read.next() => {
                    awaiting_pong = false;
                    idle.as_mut().reset(Instant::now() + self.activity_timeout);

                    match message {
                        Some(Ok(Message::Text(text))) => {
                            crate::log_debug!("pusher[{}]: <- {}", self.id, text.as_str());
                            match serde_json::from_str::<PusherFrame>(text.as_str()) {
                                Ok(frame) => match self.handle_frame(frame, &auth_tx) {
                                    Step::Continue(frames) => frames,
                                    Step::Close => {
                                        let _ = write.send(Message::Close(None)).await;
                                        break;
                                    }
                                },
                                Err(e) => {
                                    crate::log_warn!("pusher[{}]: unparseable frame: {}", self.id, e);
                                    Vec::new()
                                }
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            crate::log_info!("pusher[{}]: server closed the connection: {:?}", self.id, frame);
                            break;
                        }
                        Some(Ok(_)) => Vec::new(),
                        Some(Err(e)) => {
                            crate::log_error!("pusher[{}]: read error: {}", self.id, e);
                            self.emit(TransportSignal::Error(format!("WebSocket error: {}", e)));
                            break;
                        }
                        None => break,
                    }
                },
                Some(outcome) = auth_rx.next() => self.finish_authorization(outcome).into_iter().collect(),
                () = &mut idle => {
                    if awaiting_pong {
                        crate::log_warn!("pusher[{}]: no pong within {:?}, closing", self.id, PONG_TIMEOUT);
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                    awaiting_pong = true;
                    idle.as_mut().reset(Instant::now() + PONG_TIMEOUT);
                    vec![PusherFrame::ping()]
                },
            };

            let mut open = true;
            for frame in outgoing {
                if !send_frame(&mut write, self.id, &frame).await {
                    open = false;
                    break;
                }
            }
            if !open {
                self.emit(TransportSignal::Error("Failed to write to socket".to_string()));
                break;
            }
        }

        lock(&self.shared).socket_id = None;
        if self.state != "failed" {
            self.set_state("disconnected");
            self.emit(TransportSignal::Disconnected);
        }
    }

    fn handle_frame(&mut self, frame: PusherFrame, auth_tx: &UnboundedSender<AuthOutcome>) -> Step {
        match frame.event.as_str() {
            EVENT_CONNECTION_ESTABLISHED => {
                match serde_json::from_value::<ConnectionEstablished>(frame.decoded_data()) {
                    Ok(established) => {
                        if let Some(secs) = established.activity_timeout {
                            self.activity_timeout = Duration::from_secs(secs.max(1));
                        }
                        lock(&self.shared).socket_id = Some(established.socket_id.clone());
                        self.set_state("connected");
                        self.emit(TransportSignal::Connected {
                            socket_id: established.socket_id,
                        });

                        let pending = std::mem::take(&mut self.pending);
                        Step::Continue(
                            pending
                                .into_iter()
                                .filter_map(|channel| self.subscribe_or_authorize(channel, auth_tx))
                                .collect(),
                        )
                    }
                    Err(e) => {
                        self.emit(TransportSignal::Error(format!(
                            "Malformed connection_established: {}",
                            e
                        )));
                        Step::Close
                    }
                }
            }
            EVENT_PING => Step::Continue(vec![PusherFrame::pong()]),
            EVENT_PONG => Step::Continue(Vec::new()),
            EVENT_ERROR if frame.channel.is_none() => {
                let err = serde_json::from_value::<ProtocolError>(frame.decoded_data()).unwrap_or(
                    ProtocolError {
                        message: "Unknown error".to_string(),
                        code: None,
                    },
                );
                crate::log_warn!("pusher[{}]: server error: {}", self.id, err);
                self.emit(TransportSignal::Error(err.to_string()));
                if err.is_fatal() {
                    self.set_state("failed");
                    self.emit(TransportSignal::Failed);
                    Step::Close
                } else {
                    Step::Continue(Vec::new())
                }
            }
            _ => {
                match frame.channel.as_deref() {
                    Some(channel) => self.dispatch(channel, &frame),
                    None => crate::log_debug!(
                        "pusher[{}]: ignoring connection-level '{}'",
                        self.id,
                        frame.event
                    ),
                }
                Step::Continue(Vec::new())
            }
        }
    }

    fn join(
        &mut self,
        kind: ChannelType,
        channel: String,
        auth_tx: &UnboundedSender<AuthOutcome>,
    ) -> Option<PusherFrame> {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.joined.insert(channel.clone(), Joined { kind, generation });
        if self.socket_id().is_none() {
            self.pending.push(channel);
            return None;
        }
        self.subscribe_or_authorize(channel, auth_tx)
    }

    fn leave(&mut self, channel: &str) -> Option<PusherFrame> {
        self.joined.remove(channel)?;
        self.pending.retain(|c| c != channel);
        self.socket_id()?;
        Some(PusherFrame::unsubscribe(channel))
    }

    /// Public channels subscribe right away; the others first run the
    /// authorizer in its own task and resume in [`Self::finish_authorization`].
    fn subscribe_or_authorize(
        &self,
        channel: String,
        auth_tx: &UnboundedSender<AuthOutcome>,
    ) -> Option<PusherFrame> {
        let Joined { kind, generation } = *self.joined.get(&channel)?;
        if !kind.requires_auth() {
            return Some(PusherFrame::subscribe(&channel, None));
        }

        let Some(authorizer) = self.options.authorizer.clone() else {
            self.deliver(
                &channel,
                Delivery::SubscriptionError(AuthError::NotConfigured(channel.clone()).into()),
            );
            return None;
        };
        let socket_id = self.socket_id()?;
        let auth_tx = auth_tx.clone();

        tokio::spawn(async move {
            let result = authorizer.authorize(&socket_id, &channel).await;
            let _ = auth_tx.unbounded_send(AuthOutcome {
                channel,
                generation,
                result,
            });
        });
        None
    }

    fn finish_authorization(&self, outcome: AuthOutcome) -> Option<PusherFrame> {
        let current = self.joined.get(&outcome.channel).map(|j| j.generation);
        if current != Some(outcome.generation) {
            crate::log_debug!(
                "pusher[{}]: dropping authorization for '{}' from an earlier join",
                self.id,
                outcome.channel
            );
            return None;
        }
        match outcome.result {
            Ok(payload) => Some(PusherFrame::subscribe(&outcome.channel, Some(&payload))),
            Err(e) => {
                crate::log_warn!("pusher[{}]: authorization for '{}' failed: {}", self.id, outcome.channel, e);
                self.deliver(&outcome.channel, Delivery::SubscriptionError(e.into()));
                None
            }
        }
    }

    /// Fan a channel frame out to every binding that carries it.
    fn dispatch(&self, channel: &str, frame: &PusherFrame) {
        let bindings = self.bindings_for(channel);
        if bindings.is_empty() {
            crate::log_debug!("pusher[{}]: no bindings on '{}' for '{}'", self.id, channel, frame.event);
            return;
        }

        let event = client_visible_name(&frame.event);
        let data = frame.decoded_data();
        let namespace = self.options.event_namespace.as_deref();
        let mut deliveries = Vec::new();

        match event.as_str() {
            EVENT_SUBSCRIPTION_SUCCEEDED => {
                deliveries.push(Delivery::SubscriptionSucceeded(data.clone()));
                if self.joined.get(channel).map(|j| j.kind) == Some(ChannelType::Presence) {
                    deliveries.push(Delivery::Here(roster_members(&data)));
                }
            }
            EVENT_SUBSCRIPTION_ERROR => deliveries.push(Delivery::SubscriptionError(
                SubscriptionError::from_payload(data.clone()),
            )),
            EVENT_MEMBER_ADDED => deliveries.push(Delivery::Joining(member_info(&data))),
            EVENT_MEMBER_REMOVED => deliveries.push(Delivery::Leaving(member_info(&data))),
            reserved if is_reserved_event(reserved) => {}
            _ => {
                for binding in &bindings {
                    match binding {
                        Binding::Typed(listener) if format_event_name(listener, namespace) == event => {
                            deliveries.push(Delivery::Typed {
                                listener: listener.clone(),
                                data: data.clone(),
                            });
                        }
                        Binding::Raw(name) if *name == event => {
                            deliveries.push(Delivery::Raw {
                                event: name.clone(),
                                data: data.clone(),
                            });
                        }
                        _ => {}
                    }
                }
            }
        }
        deliveries.push(Delivery::Any { event, data });

        for delivery in deliveries {
            if bindings.iter().any(|b| b.carries(&delivery)) {
                self.emit(TransportSignal::Channel {
                    channel: channel.to_string(),
                    delivery,
                });
            }
        }
    }

    fn deliver(&self, channel: &str, delivery: Delivery) {
        if self.bindings_for(channel).iter().any(|b| b.carries(&delivery)) {
            self.emit(TransportSignal::Channel {
                channel: channel.to_string(),
                delivery,
            });
        }
    }
}

/// Resolves once the handle asks to close or is dropped.
async fn wait_for_close(commands: &mut UnboundedReceiver<Command>) {
    while let Some(command) = commands.next().await {
        if matches!(command, Command::Close) {
            return;
        }
    }
}

async fn send_frame<S>(write: &mut S, id: HandleId, frame: &PusherFrame) -> bool
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            crate::log_error!("pusher[{}]: serialize failed: {}", id, e);
            return true;
        }
    };
    crate::log_debug!("pusher[{}]: -> {}", id, json);
    match write.send(Message::Text(json.into())).await {
        Ok(()) => true,
        Err(e) => {
            crate::log_error!("pusher[{}]: send failed: {}", id, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_channel::mpsc::UnboundedReceiver;
    use pretty_assertions::assert_eq;
    use reverb_tester_shared::{ConnectionConfig, Scheme, DEFAULT_EVENT_NAMESPACE};
    use serde_json::json;

    fn options() -> HandleOptions {
        HandleOptions::from_config(
            &ConnectionConfig {
                host: "localhost".to_string(),
                port: Some(8080),
                key: "app-key".to_string(),
                scheme: Scheme::Ws,
                cluster: String::new(),
            },
            None,
        )
    }

    fn connection() -> (PusherConnection, UnboundedReceiver<TransportNotice>) {
        let (sink, notices) = unbounded();
        let shared = Arc::new(Mutex::new(Shared::default()));
        let connection = PusherConnection::new(7, "ws://localhost".to_string(), options(), shared, sink);
        (connection, notices)
    }

    fn bind(connection: &PusherConnection, channel: &str, bindings: Vec<Binding>) {
        lock(&connection.shared)
            .bindings
            .insert(channel.to_string(), bindings);
    }

    fn drain(notices: &mut UnboundedReceiver<TransportNotice>) -> Vec<TransportSignal> {
        let mut signals = Vec::new();
        while let Ok(Some(notice)) = notices.try_next() {
            assert_eq!(notice.handle, 7);
            signals.push(notice.signal);
        }
        signals
    }

    fn frame(event: &str, channel: &str, data: Value) -> PusherFrame {
        PusherFrame::new(event).with_channel(channel).with_data(data)
    }

    #[test]
    fn url_includes_protocol_query() {
        let url = connection_url(&options()).unwrap();
        assert_eq!(url.scheme(), "ws");
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.path(), "/app/app-key");
        let query: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(query.get("protocol").map(String::as_str), Some("7"));
        assert_eq!(query.get("client").map(String::as_str), Some(CLIENT_NAME));
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let mut options = options();
        options.key.clear();
        assert!(matches!(connection_url(&options), Err(ConnectError::InvalidConfig(_))));

        let mut options = self::options();
        options.host = "bad host".to_string();
        assert!(matches!(connection_url(&options), Err(ConnectError::InvalidConfig(_))));
    }

    #[test]
    fn event_fans_out_to_typed_raw_and_any() {
        let (connection, mut notices) = connection();
        bind(
            &connection,
            "chat.1",
            vec![
                Binding::Typed(".MessageSent".to_string()),
                Binding::Raw("MessageSent".to_string()),
                Binding::Any,
            ],
        );

        connection.dispatch("chat.1", &frame("MessageSent", "chat.1", json!("{\"body\":\"hi\"}")));

        let signals = drain(&mut notices);
        assert_eq!(signals.len(), 3);
        assert!(matches!(
            &signals[0],
            TransportSignal::Channel { delivery: Delivery::Typed { listener, data }, .. }
                if listener == ".MessageSent" && data == &json!({ "body": "hi" })
        ));
        assert!(matches!(
            &signals[1],
            TransportSignal::Channel { delivery: Delivery::Raw { event, .. }, .. } if event == "MessageSent"
        ));
        assert!(matches!(
            &signals[2],
            TransportSignal::Channel { delivery: Delivery::Any { event, .. }, .. } if event == "MessageSent"
        ));
    }

    #[test]
    fn typed_listener_uses_namespace() {
        let (connection, mut notices) = connection();
        assert_eq!(connection.options.event_namespace.as_deref(), Some(DEFAULT_EVENT_NAMESPACE));
        bind(&connection, "orders", vec![Binding::Typed("OrderShipped".to_string())]);

        connection.dispatch("orders", &frame("OrderShipped", "orders", json!({})));
        assert!(drain(&mut notices).is_empty());

        connection.dispatch("orders", &frame("App\\Events\\OrderShipped", "orders", json!({})));
        assert_eq!(drain(&mut notices).len(), 1);
    }

    #[test]
    fn presence_success_emits_ack_then_roster() {
        let (mut connection, mut notices) = connection();
        connection.joined.insert(
            "presence-room".to_string(),
            Joined {
                kind: ChannelType::Presence,
                generation: 1,
            },
        );
        bind(
            &connection,
            "presence-room",
            vec![Binding::Here, Binding::Any, Binding::SubscriptionSucceeded],
        );

        let roster = json!({ "presence": { "ids": ["1"], "hash": { "1": { "name": "ada" } }, "count": 1 } });
        connection.dispatch(
            "presence-room",
            &frame("pusher_internal:subscription_succeeded", "presence-room", json!(roster.to_string())),
        );

        let signals = drain(&mut notices);
        assert_eq!(signals.len(), 3);
        assert!(matches!(
            &signals[0],
            TransportSignal::Channel { delivery: Delivery::SubscriptionSucceeded(_), .. }
        ));
        assert!(matches!(
            &signals[1],
            TransportSignal::Channel { delivery: Delivery::Here(members), .. } if members == &vec![json!({ "name": "ada" })]
        ));
        assert!(matches!(
            &signals[2],
            TransportSignal::Channel { delivery: Delivery::Any { event, .. }, .. } if event == "pusher:subscription_succeeded"
        ));
    }

    #[test]
    fn unbound_channels_receive_nothing() {
        let (connection, mut notices) = connection();
        connection.dispatch("ghost", &frame("Anything", "ghost", json!({})));
        assert!(drain(&mut notices).is_empty());
    }

    #[test]
    fn private_join_without_authorizer_fails_the_subscription() {
        let (mut connection, mut notices) = connection();
        let (auth_tx, _auth_rx) = unbounded();
        lock(&connection.shared).socket_id = Some("1.1".to_string());
        bind(&connection, "private-orders", vec![Binding::SubscriptionError]);

        let frame = connection.join(ChannelType::Private, "private-orders".to_string(), &auth_tx);
        assert!(frame.is_none());

        let signals = drain(&mut notices);
        assert!(matches!(
            &signals[..],
            [TransportSignal::Channel {
                delivery: Delivery::SubscriptionError(SubscriptionError::Auth(AuthError::NotConfigured(_))),
                ..
            }]
        ));
    }

    #[test]
    fn authorization_from_an_earlier_join_is_dropped() {
        let (mut connection, mut notices) = connection();
        let (auth_tx, _auth_rx) = unbounded();
        lock(&connection.shared).socket_id = Some("1.1".to_string());
        bind(&connection, "private-x", vec![Binding::SubscriptionError]);

        // No authorizer is configured, so each join reports an error straight away.
        connection.join(ChannelType::Private, "private-x".to_string(), &auth_tx);
        let first = connection.joined["private-x"].generation;
        connection.leave("private-x");
        connection.join(ChannelType::Private, "private-x".to_string(), &auth_tx);
        let second = connection.joined["private-x"].generation;
        assert_ne!(first, second);
        drain(&mut notices);

        let stale_success = AuthOutcome {
            channel: "private-x".to_string(),
            generation: first,
            result: Ok(json!({ "auth": "app-key:sig" })),
        };
        assert_eq!(connection.finish_authorization(stale_success), None);

        let stale_failure = AuthOutcome {
            channel: "private-x".to_string(),
            generation: first,
            result: Err(AuthError::Network("timeout".to_string())),
        };
        assert_eq!(connection.finish_authorization(stale_failure), None);
        assert!(drain(&mut notices).is_empty());

        let current = AuthOutcome {
            channel: "private-x".to_string(),
            generation: second,
            result: Ok(json!({ "auth": "app-key:sig" })),
        };
        assert_eq!(
            connection.finish_authorization(current),
            Some(PusherFrame::subscribe("private-x", Some(&json!({ "auth": "app-key:sig" }))))
        );
    }

    #[test]
    fn joins_wait_for_the_socket_id() {
        let (mut connection, mut notices) = connection();
        let (auth_tx, _auth_rx) = unbounded();

        assert!(connection.join(ChannelType::Public, "news".to_string(), &auth_tx).is_none());
        assert_eq!(connection.pending, vec!["news".to_string()]);

        let established = PusherFrame::new(EVENT_CONNECTION_ESTABLISHED)
            .with_data(json!("{\"socket_id\":\"42.7\",\"activity_timeout\":30}"));
        let Step::Continue(frames) = connection.handle_frame(established, &auth_tx) else {
            panic!("expected the connection to stay open");
        };

        assert_eq!(frames, vec![PusherFrame::subscribe("news", None)]);
        assert_eq!(connection.activity_timeout, Duration::from_secs(30));
        let signals = drain(&mut notices);
        assert!(signals
            .iter()
            .any(|s| matches!(s, TransportSignal::Connected { socket_id } if socket_id == "42.7")));
    }

    #[test]
    fn fatal_protocol_error_closes() {
        let (mut connection, mut notices) = connection();
        let (auth_tx, _auth_rx) = unbounded();

        let error = PusherFrame::new(EVENT_ERROR)
            .with_data(json!({ "message": "Application does not exist", "code": 4001 }));
        assert!(matches!(connection.handle_frame(error, &auth_tx), Step::Close));

        let signals = drain(&mut notices);
        assert!(signals.iter().any(|s| matches!(s, TransportSignal::Failed)));
        assert_eq!(connection.state, "failed");
    }
}
