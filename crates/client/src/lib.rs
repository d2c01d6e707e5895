//! Reverb Tester client
//!
//! Session engine for exercising a Laravel Reverb (Pusher protocol) server:
//! connect, subscribe to public/private/presence channels, watch every event
//! that arrives, and keep named connection presets. The Dioxus desktop UI
//! lives behind the `desktop` feature.

pub mod auth_provider;
pub mod config;
pub mod event_log;
pub mod format;
pub mod logging;
pub mod presets;
pub mod session;
pub mod storage;
pub mod ws;

#[cfg(feature = "desktop")]
pub mod components;

pub use auth_provider::{ChannelAuthorizer, HttpAuthorizer};
pub use config::AppConfig;
pub use presets::PresetStore;
pub use session::{spawn_session, SessionBuilder, SessionHandle, SessionSnapshot};
pub use storage::Storage;
