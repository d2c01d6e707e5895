//! Session hooks for Dioxus components.
//!
//! Components never talk to the session runtime directly: they read the
//! latest [`SessionSnapshot`] from a signal and send commands through the
//! [`SessionHandle`] in context.

use dioxus::prelude::*;

use crate::config::AppConfig;
use crate::session::{spawn_session, SessionHandle, SessionSnapshot};

#[derive(Clone)]
pub struct SessionContext {
    pub handle: SessionHandle,
    pub snapshot: Signal<SessionSnapshot>,
}

/// Start the session runtime and provide it to descendants.
///
/// Call once, from the root component.
pub fn use_session_root(config: AppConfig) -> SessionContext {
    let (handle, receiver) = use_hook(move || spawn_session(&config));
    let mut snapshot = use_signal(|| receiver.borrow().clone());

    use_future(move || {
        let mut receiver = receiver.clone();
        async move {
            while receiver.changed().await.is_ok() {
                let next = receiver.borrow_and_update().clone();
                snapshot.set(next);
            }
        }
    });

    use_context_provider(|| SessionContext { handle, snapshot })
}

/// Command handle for the running session.
pub fn use_session() -> SessionHandle {
    use_context::<SessionContext>().handle
}

/// Latest session snapshot (reactive).
pub fn use_snapshot() -> Signal<SessionSnapshot> {
    use_context::<SessionContext>().snapshot
}
