use std::time::Duration;

use chrono::Utc;
use dioxus::prelude::*;
use reverb_tester_shared::ConnectionStatus;

use super::ui::{Badge, BadgeTone, Button, ButtonVariant};
use crate::format::format_uptime;
use crate::ws::{use_session, use_snapshot};

#[component]
pub fn ConnectButton() -> Element {
    let session = use_session();
    let status = use_snapshot().read().status;

    let (label, variant) = match status {
        ConnectionStatus::Connected => ("Disconnect", ButtonVariant::Danger),
        ConnectionStatus::Connecting => ("Disconnect", ButtonVariant::Outline),
        _ => ("Connect", ButtonVariant::Primary),
    };

    rsx! {
        Button {
            class: "min-w-[140px]",
            variant,
            disabled: status == ConnectionStatus::Connecting,
            onclick: move |_| {
                if status.can_connect() {
                    session.connect();
                } else {
                    session.disconnect();
                }
            },
            "{label}"
        }
    }
}

#[component]
pub fn ConnectionStatusBar() -> Element {
    let snapshot = use_snapshot();
    let mut now = use_signal(Utc::now);

    use_future(move || async move {
        loop {
            tokio::time::sleep(Duration::from_secs(1)).await;
            now.set(Utc::now());
        }
    });

    let current = snapshot.read();
    let (tone, label) = match current.status {
        ConnectionStatus::Disconnected => (BadgeTone::Neutral, "Disconnected"),
        ConnectionStatus::Connecting => (BadgeTone::Warning, "Connecting..."),
        ConnectionStatus::Connected => (BadgeTone::Success, "Connected"),
        ConnectionStatus::Error => (BadgeTone::Danger, "Error"),
    };
    let uptime = match (current.status, current.connected_at) {
        (ConnectionStatus::Connected, Some(since)) => Some(format_uptime(*now.read() - since)),
        _ => None,
    };
    let socket_id = current.socket_id.clone().filter(|_| current.status.is_connected());
    let error = current
        .last_error
        .clone()
        .filter(|_| current.status == ConnectionStatus::Error);

    rsx! {
        div { class: "flex items-center gap-4 rounded-lg border border-slate-200 bg-white px-4 py-2 text-sm",
            Badge { tone, "{label}" }
            if let Some(socket_id) = socket_id {
                div { class: "h-4 w-px bg-slate-200" }
                div { class: "text-slate-500",
                    "Socket ID: "
                    code { class: "rounded bg-slate-100 px-1 py-0.5 font-mono text-xs", "{socket_id}" }
                }
            }
            if let Some(uptime) = uptime {
                div { class: "h-4 w-px bg-slate-200" }
                div { class: "text-slate-500",
                    "Uptime: "
                    span { class: "font-mono text-xs", "{uptime}" }
                }
            }
            if let Some(error) = error {
                div { class: "h-4 w-px bg-slate-200" }
                div { class: "truncate text-red-600", "{error}" }
            }
        }
    }
}
