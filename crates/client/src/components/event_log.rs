use dioxus::prelude::*;
use reverb_tester_shared::{EventLogEntry, LogKind};

use super::ui::{Badge, BadgeTone, Button, ButtonSize, ButtonVariant, Card};
use super::JsonViewer;
use crate::format::format_timestamp;
use crate::ws::{use_session, use_snapshot};

#[component]
pub fn EventLog() -> Element {
    let session = use_session();
    let snapshot = use_snapshot();
    let entries = snapshot.read().log.clone();
    let count = entries.len();

    let actions = rsx! {
        Button {
            variant: ButtonVariant::Ghost,
            size: ButtonSize::Sm,
            disabled: count == 0,
            onclick: move |_| session.clear_log(),
            "Clear"
        }
    };

    rsx! {
        Card {
            title: "Event Log ({count})",
            icon: "📜",
            class: "h-full",
            actions,
            if entries.is_empty() {
                div { class: "flex h-full flex-col items-center justify-center py-12 text-center text-sm text-slate-500",
                    p { "No events yet" }
                    p { class: "text-xs", "Connect and subscribe to a channel to see events here" }
                }
            } else {
                div { class: "h-full space-y-2 overflow-y-auto pr-1",
                    for entry in entries.into_iter().rev() {
                        LogRow { key: "{entry.id}", entry }
                    }
                }
            }
        }
    }
}

#[component]
fn LogRow(entry: EventLogEntry) -> Element {
    let (row_class, tone) = kind_style(entry.kind);

    rsx! {
        div { class: "rounded-md border-l-4 p-2 text-sm {row_class}",
            div { class: "flex flex-wrap items-center gap-2",
                span { class: "font-mono text-xs text-slate-400", "{format_timestamp(&entry.timestamp)}" }
                Badge { tone, "{entry.kind.label()}" }
                if let Some(channel) = entry.channel.clone() {
                    Badge { tone: BadgeTone::Outline, "{channel}" }
                }
                if let Some(event) = entry.event.clone() {
                    code { class: "text-xs text-slate-700", "{event}" }
                }
            }
            if let Some(message) = entry.message.clone() {
                p { class: "mt-1 text-slate-700", "{message}" }
            }
            if let Some(payload) = entry.payload.clone() {
                div { class: "mt-1", JsonViewer { value: payload } }
            }
        }
    }
}

fn kind_style(kind: LogKind) -> (&'static str, BadgeTone) {
    match kind {
        LogKind::System => ("border-slate-300 bg-slate-50", BadgeTone::Neutral),
        LogKind::Subscribed => ("border-green-400 bg-green-50", BadgeTone::Success),
        LogKind::Unsubscribed => ("border-amber-400 bg-amber-50", BadgeTone::Warning),
        LogKind::Event => ("border-blue-400 bg-blue-50", BadgeTone::Outline),
        LogKind::Error => ("border-red-400 bg-red-50", BadgeTone::Danger),
        LogKind::Whisper => ("border-purple-400 bg-purple-50", BadgeTone::Outline),
    }
}
