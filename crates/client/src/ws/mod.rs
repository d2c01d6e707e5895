//! Realtime session engine.
//!
//! ```text
//!   UI / SessionHandle
//!          │ commands
//!          ▼
//! ┌──────────────────────────┐    notices    ┌──────────────────┐
//! │    ConnectionManager     │◄──────────────│  TransportHandle │
//! │ registry · bridge · log  │──────────────►│  (PusherHandle)  │
//! └──────────────────────────┘ join/bind/... └──────────────────┘
//!          │ snapshots
//!          ▼
//!        watch
//! ```
//!
//! The manager owns all state and is driven by exactly one task (see
//! [`crate::session`]). Transports report back through a notice sink, and
//! every notice carries the id of the handle that sent it; the manager
//! ignores notices from handles it has already replaced.

mod bridge;
mod connection;
#[cfg(feature = "desktop")]
mod hooks;
mod manager;
mod registry;

pub use bridge::{EventBridge, UNREGISTERED_EVENT};
pub use connection::{
    Binding, Delivery, HandleId, HandleOptions, NoticeSink, PusherHandle, PusherTransport,
    Transport, TransportHandle, TransportNotice, TransportSignal,
};
pub use manager::ConnectionManager;
pub use registry::ChannelRegistry;

#[cfg(feature = "desktop")]
pub use hooks::{use_session, use_session_root, use_snapshot, SessionContext};
