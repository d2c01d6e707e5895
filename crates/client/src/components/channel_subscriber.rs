use dioxus::prelude::*;
use reverb_tester_shared::ChannelType;

use super::ui::{Button, Card, Field, TextInput};
use crate::format::parse_event_list;
use crate::ws::{use_session, use_snapshot};

#[component]
pub fn ChannelSubscriber() -> Element {
    let session = use_session();
    let snapshot = use_snapshot();
    let mut channel_type = use_signal(|| ChannelType::Public);
    let mut channel_name = use_signal(String::new);
    let mut event_names = use_signal(String::new);

    let connected = snapshot.read().status.is_connected();
    let auth_enabled = snapshot.read().auth.enabled;
    let selected = *channel_type.read();
    let needs_auth = selected.requires_auth() && !auth_enabled;
    let name = channel_name.read().trim().to_string();

    let subscribe = move |_| {
        let name = channel_name.read().trim().to_string();
        if name.is_empty() {
            return;
        }
        let events = parse_event_list(&event_names.read());
        session.subscribe(*channel_type.read(), name, events);
        channel_name.set(String::new());
        event_names.set(String::new());
    };

    rsx! {
        Card { title: "Subscribe to Channel", icon: "📡",
            div { class: "flex rounded-md bg-slate-100 p-1",
                for kind in ChannelType::ALL {
                    button {
                        key: "{kind.label()}",
                        r#type: "button",
                        class: if kind == selected {
                            "flex-1 rounded px-3 py-1 text-sm font-medium bg-white shadow-sm text-slate-900"
                        } else {
                            "flex-1 rounded px-3 py-1 text-sm text-slate-500 hover:text-slate-900 disabled:opacity-40"
                        },
                        disabled: kind.requires_auth() && !auth_enabled,
                        onclick: move |_| channel_type.set(kind),
                        "{kind.label()}"
                    }
                }
            }

            if needs_auth {
                p { class: "text-sm text-slate-500",
                    "Enable authentication to subscribe to {selected.label().to_lowercase()} channels."
                }
            } else {
                Field { label: "Channel Name",
                    TextInput {
                        value: channel_name.read().clone(),
                        placeholder: "chat.1",
                        disabled: !connected,
                        oninput: move |e: FormEvent| channel_name.set(e.value()),
                    }
                }
                Field {
                    label: "Event Name(s)",
                    hint: "(comma-separated, prefix with . for custom events)",
                    TextInput {
                        value: event_names.read().clone(),
                        placeholder: ".MessageSent, .UserTyping",
                        disabled: !connected,
                        oninput: move |e: FormEvent| event_names.set(e.value()),
                    }
                }
            }

            if !name.is_empty() {
                p { class: "text-xs text-slate-500",
                    "Full channel name: "
                    code { class: "rounded bg-slate-100 px-1 py-0.5", "{selected.full_name(&name)}" }
                }
            }

            Button {
                class: "w-full",
                disabled: !connected || name.is_empty() || needs_auth,
                onclick: subscribe,
                "＋ Subscribe"
            }
        }
    }
}
