use dioxus::prelude::*;
use reverb_tester_shared::{ChannelSubscription, SubscriptionStatus};

use super::ui::{Badge, BadgeTone, Button, ButtonSize, ButtonVariant, Card};
use super::WhisperForm;
use crate::ws::{use_session, use_snapshot};

#[component]
pub fn SubscribedChannels() -> Element {
    let snapshot = use_snapshot();
    let channels = snapshot.read().channels.clone();

    rsx! {
        Card { title: "Subscribed Channels ({channels.len()})", icon: "📋",
            if channels.is_empty() {
                p { class: "py-4 text-center text-sm text-slate-500", "No channels subscribed" }
            } else {
                div { class: "max-h-80 space-y-2 overflow-y-auto",
                    for channel in channels {
                        ChannelRow { key: "{channel.id}", channel }
                    }
                }
            }
        }
    }
}

#[component]
fn ChannelRow(channel: ChannelSubscription) -> Element {
    let session = use_session();
    let mut whispering = use_signal(|| false);

    let dot = match channel.status {
        SubscriptionStatus::Subscribing => "bg-amber-400 animate-pulse",
        SubscriptionStatus::Subscribed => "bg-green-500",
        SubscriptionStatus::Error => "bg-red-500",
    };
    let can_whisper =
        channel.r#type.requires_auth() && channel.status == SubscriptionStatus::Subscribed;
    let id = channel.id.clone();

    rsx! {
        div { class: "rounded-md border border-slate-200 p-2",
            div { class: "flex items-start justify-between gap-2",
                div { class: "min-w-0 flex-1",
                    div { class: "flex items-center gap-2",
                        span { class: "h-2 w-2 shrink-0 rounded-full {dot}" }
                        code { class: "truncate text-sm font-medium", "{channel.full_name}" }
                        Badge { tone: BadgeTone::Outline, "{channel.r#type.label()}" }
                    }
                    if !channel.events.is_empty() {
                        div { class: "mt-1 flex flex-wrap gap-1",
                            for event in channel.events.iter() {
                                Badge { key: "{event}", "{event}" }
                            }
                        }
                    }
                    if let Some(error) = channel.error_message.clone() {
                        p { class: "mt-1 text-xs text-red-600", "{error}" }
                    }
                }
                div { class: "flex gap-1",
                    if can_whisper {
                        Button {
                            variant: ButtonVariant::Ghost,
                            size: ButtonSize::Icon,
                            title: "Whisper",
                            onclick: move |_| {
                                let next = !*whispering.read();
                                whispering.set(next);
                            },
                            "✉"
                        }
                    }
                    Button {
                        variant: ButtonVariant::Ghost,
                        size: ButtonSize::Icon,
                        title: "Unsubscribe",
                        onclick: move |_| session.unsubscribe(id.clone()),
                        "✕"
                    }
                }
            }
            if can_whisper && *whispering.read() {
                WhisperForm { channel_id: channel.id.clone() }
            }
        }
    }
}
