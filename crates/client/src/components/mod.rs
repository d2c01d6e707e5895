//! Desktop UI components.
//!
//! Components read the session snapshot and send commands; the connection
//! and auth forms edit local drafts that are pushed to the session on every
//! change so keystrokes never race the snapshot round trip.

pub mod auth_form;
pub mod channel_subscriber;
pub mod connection_form;
pub mod connection_status;
pub mod event_log;
pub mod json_viewer;
pub mod preset_manager;
pub mod subscribed_channels;
pub mod ui;
pub mod whisper_form;

pub use auth_form::AuthForm;
pub use channel_subscriber::ChannelSubscriber;
pub use connection_form::ConnectionForm;
pub use connection_status::{ConnectButton, ConnectionStatusBar};
pub use event_log::EventLog;
pub use json_viewer::JsonViewer;
pub use preset_manager::PresetManager;
pub use subscribed_channels::SubscribedChannels;
pub use whisper_form::WhisperForm;

use dioxus::prelude::*;
use reverb_tester_shared::{AuthConfig, ConnectionConfig};

/// Editable copies of the connection and auth settings.
#[derive(Clone, Copy)]
pub struct FormDrafts {
    pub connection: Signal<ConnectionConfig>,
    pub auth: Signal<AuthConfig>,
}

pub fn use_form_drafts_provider(connection: ConnectionConfig, auth: AuthConfig) -> FormDrafts {
    let connection = use_signal(|| connection);
    let auth = use_signal(|| auth);
    use_context_provider(|| FormDrafts { connection, auth })
}

pub fn use_form_drafts() -> FormDrafts {
    use_context::<FormDrafts>()
}
