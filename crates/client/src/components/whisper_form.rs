use dioxus::prelude::*;
use serde_json::Value;

use super::ui::{Button, ButtonSize, TextInput};
use crate::ws::use_session;

/// Send a `client-` event on a subscribed private or presence channel.
#[component]
pub fn WhisperForm(channel_id: String) -> Element {
    let session = use_session();
    let mut event = use_signal(String::new);
    let mut data = use_signal(|| "{}".to_string());
    let mut parse_error = use_signal(|| None::<String>);

    let send = move |_| {
        let name = event.read().trim().to_string();
        if name.is_empty() {
            return;
        }
        match serde_json::from_str::<Value>(&data.read()) {
            Ok(payload) => {
                parse_error.set(None);
                session.whisper(channel_id.clone(), name, payload);
                event.set(String::new());
            }
            Err(err) => parse_error.set(Some(format!("Invalid JSON: {err}"))),
        }
    };

    rsx! {
        div { class: "mt-2 space-y-2 rounded-md border border-dashed border-slate-300 p-2",
            div { class: "flex items-center gap-2",
                span { class: "text-xs font-mono text-slate-400", "client-" }
                TextInput {
                    value: event.read().clone(),
                    placeholder: "typing",
                    oninput: move |e: FormEvent| event.set(e.value()),
                }
            }
            textarea {
                class: "w-full rounded-md border border-slate-300 px-2 py-1 font-mono text-xs",
                rows: "3",
                value: "{data}",
                oninput: move |e| data.set(e.value()),
            }
            if let Some(error) = parse_error.read().clone() {
                p { class: "text-xs text-red-600", "{error}" }
            }
            Button {
                size: ButtonSize::Sm,
                disabled: event.read().trim().is_empty(),
                onclick: send,
                "Whisper"
            }
        }
    }
}
