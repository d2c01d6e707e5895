//! Session runtime.
//!
//! A single tokio task owns the [`ConnectionManager`] and the preset store.
//! User commands arrive through a cloneable [`SessionHandle`]; transport
//! notices arrive through the manager's notice sink. Each is applied in turn,
//! and after every step the task publishes a fresh [`SessionSnapshot`] on a
//! `watch` channel for the UI to render.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::StreamExt;
use reverb_tester_shared::{
    AuthConfig, ChannelSubscription, ChannelType, ConnectionConfig, ConnectionStatus,
    EventLogEntry, NewLogEntry, Preset,
};
use serde_json::Value;
use tokio::sync::watch;

use crate::auth_provider::ChannelAuthorizer;
use crate::config::AppConfig;
use crate::presets::PresetStore;
use crate::ws::{ConnectionManager, PusherTransport, Transport, TransportNotice};

#[derive(Debug, Clone)]
pub enum SessionCommand {
    Connect,
    Disconnect,
    Subscribe {
        kind: ChannelType,
        name: String,
        events: Vec<String>,
    },
    Unsubscribe(String),
    Whisper {
        channel_id: String,
        event: String,
        data: Value,
    },
    ClearLog,
    UpdateConnection(ConnectionConfig),
    UpdateAuth(AuthConfig),
    SavePreset(String),
    LoadPreset(String),
    DeletePreset(String),
}

/// Everything the UI renders, as of the last applied step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub status: ConnectionStatus,
    pub socket_id: Option<String>,
    pub connected_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub connection: ConnectionConfig,
    pub auth: AuthConfig,
    pub channels: Vec<ChannelSubscription>,
    pub log: Vec<EventLogEntry>,
    pub presets: Vec<Preset>,
}

/// Cloneable front door to a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    fn send(&self, command: SessionCommand) {
        if self.commands.unbounded_send(command).is_err() {
            crate::log_warn!("session: runtime has stopped, command dropped");
        }
    }

    pub fn connect(&self) {
        self.send(SessionCommand::Connect);
    }

    pub fn disconnect(&self) {
        self.send(SessionCommand::Disconnect);
    }

    pub fn subscribe(&self, kind: ChannelType, name: impl Into<String>, events: Vec<String>) {
        self.send(SessionCommand::Subscribe {
            kind,
            name: name.into(),
            events,
        });
    }

    pub fn unsubscribe(&self, id: impl Into<String>) {
        self.send(SessionCommand::Unsubscribe(id.into()));
    }

    pub fn whisper(&self, channel_id: impl Into<String>, event: impl Into<String>, data: Value) {
        self.send(SessionCommand::Whisper {
            channel_id: channel_id.into(),
            event: event.into(),
            data,
        });
    }

    pub fn clear_log(&self) {
        self.send(SessionCommand::ClearLog);
    }

    pub fn update_connection(&self, connection: ConnectionConfig) {
        self.send(SessionCommand::UpdateConnection(connection));
    }

    pub fn update_auth(&self, auth: AuthConfig) {
        self.send(SessionCommand::UpdateAuth(auth));
    }

    pub fn save_preset(&self, name: impl Into<String>) {
        self.send(SessionCommand::SavePreset(name.into()));
    }

    pub fn load_preset(&self, id: impl Into<String>) {
        self.send(SessionCommand::LoadPreset(id.into()));
    }

    pub fn delete_preset(&self, id: impl Into<String>) {
        self.send(SessionCommand::DeletePreset(id.into()));
    }
}

/// Start a session over the Pusher transport. Must be called inside a tokio runtime.
pub fn spawn_session(config: &AppConfig) -> (SessionHandle, watch::Receiver<SessionSnapshot>) {
    SessionBuilder::new(PusherTransport::new())
        .connection(config.connection.clone())
        .auth(config.auth.clone())
        .presets(PresetStore::open(config.storage()))
        .spawn()
}

/// Configures a session runtime over any transport.
pub struct SessionBuilder<T> {
    transport: T,
    connection: ConnectionConfig,
    auth: AuthConfig,
    presets: PresetStore,
    authorizer: Option<Arc<dyn ChannelAuthorizer>>,
}

impl<T> SessionBuilder<T>
where
    T: Transport + Send + 'static,
    T::Handle: Send + 'static,
{
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            connection: ConnectionConfig::default(),
            auth: AuthConfig::default(),
            presets: PresetStore::in_memory(),
            authorizer: None,
        }
    }

    pub fn connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    pub fn presets(mut self, presets: PresetStore) -> Self {
        self.presets = presets;
        self
    }

    /// Authorize private and presence joins with `authorizer` instead of HTTP.
    pub fn authorizer(mut self, authorizer: Arc<dyn ChannelAuthorizer>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn spawn(self) -> (SessionHandle, watch::Receiver<SessionSnapshot>) {
        let (commands_tx, commands_rx) = unbounded();
        let (notices_tx, notices_rx) = unbounded();

        let mut manager = ConnectionManager::new(self.transport, notices_tx, self.connection, self.auth);
        if let Some(authorizer) = self.authorizer {
            manager = manager.with_authorizer(authorizer);
        }

        let runtime = SessionRuntime {
            manager,
            presets: self.presets,
        };
        let (snapshots_tx, snapshots_rx) = watch::channel(runtime.snapshot());
        tokio::spawn(runtime.run(commands_rx, notices_rx, snapshots_tx));

        (
            SessionHandle {
                commands: commands_tx,
            },
            snapshots_rx,
        )
    }
}

struct SessionRuntime<T: Transport> {
    manager: ConnectionManager<T>,
    presets: PresetStore,
}

impl<T: Transport> SessionRuntime<T> {
    async fn run(
        mut self,
        mut commands: UnboundedReceiver<SessionCommand>,
        mut notices: UnboundedReceiver<TransportNotice>,
        snapshots: watch::Sender<SessionSnapshot>,
    ) {
        crate::log_info!("session: runtime started");
        loop {
            tokio::select! {
                command = commands.next() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
                Some(notice) = notices.next() => self.manager.handle_notice(notice),
            }
            snapshots.send_replace(self.snapshot());
        }

        self.manager.shutdown();
        crate::log_info!("session: all handles dropped, runtime stopped");
    }

    fn apply(&mut self, command: SessionCommand) {
        crate::log_debug!("session: {:?}", command);
        match command {
            SessionCommand::Connect => self.manager.connect(),
            SessionCommand::Disconnect => self.manager.disconnect(),
            SessionCommand::Subscribe { kind, name, events } => {
                self.manager.subscribe(kind, &name, events);
            }
            SessionCommand::Unsubscribe(id) => self.manager.unsubscribe(&id),
            SessionCommand::Whisper {
                channel_id,
                event,
                data,
            } => self.manager.whisper(&channel_id, &event, data),
            SessionCommand::ClearLog => self.manager.clear_log(),
            SessionCommand::UpdateConnection(connection) => {
                self.manager.update_connection(connection);
            }
            SessionCommand::UpdateAuth(auth) => {
                self.manager.update_auth(auth);
            }
            SessionCommand::SavePreset(name) => {
                let connection = self.manager.connection().clone();
                let auth = self.manager.auth().clone();
                if let Err(e) = self.presets.save(&name, connection, auth) {
                    self.manager
                        .append(NewLogEntry::error(format!("Cannot save preset: {}", e)));
                }
            }
            SessionCommand::LoadPreset(id) => match self.presets.get(&id) {
                Some(preset) => {
                    self.manager.apply_preset(preset);
                }
                None => self
                    .manager
                    .append(NewLogEntry::error(format!("Cannot load preset: no preset with id {}", id))),
            },
            SessionCommand::DeletePreset(id) => {
                if let Err(e) = self.presets.delete(&id) {
                    self.manager
                        .append(NewLogEntry::error(format!("Cannot delete preset: {}", e)));
                }
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.manager.status(),
            socket_id: self.manager.socket_id().map(str::to_string),
            connected_at: self.manager.connected_at(),
            last_error: self.manager.last_error().map(str::to_string),
            connection: self.manager.connection().clone(),
            auth: self.manager.auth().clone(),
            channels: self.manager.channels().to_vec(),
            log: self.manager.log().entries().to_vec(),
            presets: self.presets.list().to_vec(),
        }
    }
}
