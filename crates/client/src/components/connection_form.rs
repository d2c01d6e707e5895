use dioxus::prelude::*;
use reverb_tester_shared::{ConnectionConfig, Scheme};

use super::ui::{Card, Field, TextInput};
use super::use_form_drafts;
use crate::ws::{use_session, use_snapshot};

#[component]
pub fn ConnectionForm() -> Element {
    let session = use_session();
    let snapshot = use_snapshot();
    let mut draft = use_form_drafts().connection;

    let locked = !snapshot.read().status.can_connect();

    let update = use_callback(move |next: ConnectionConfig| {
        draft.set(next.clone());
        session.update_connection(next);
    });
    let edit = move |apply: fn(&mut ConnectionConfig, String)| {
        move |e: FormEvent| {
            let mut next = draft.read().clone();
            apply(&mut next, e.value());
            update.call(next);
        }
    };

    let current = draft.read().clone();
    let port = current.port.map(|p| p.to_string()).unwrap_or_default();

    rsx! {
        Card { title: "Server Configuration", icon: "🖥",
            div { class: "grid grid-cols-2 gap-3",
                Field { label: "Host",
                    TextInput {
                        value: current.host.clone(),
                        placeholder: "localhost or your-domain.com",
                        disabled: locked,
                        oninput: edit(|c, v| c.host = v),
                    }
                }
                Field { label: "Port", hint: "(optional)",
                    TextInput {
                        r#type: "number",
                        value: port,
                        placeholder: "Default (80/443)",
                        disabled: locked,
                        oninput: edit(|c, v| c.port = v.trim().parse().ok()),
                    }
                }
            }
            Field { label: "App Key",
                TextInput {
                    value: current.key.clone(),
                    placeholder: "your-reverb-app-key",
                    disabled: locked,
                    oninput: edit(|c, v| c.key = v),
                }
            }
            div { class: "grid grid-cols-2 gap-3",
                Field { label: "Scheme",
                    select {
                        class: "w-full h-9 rounded-md border border-slate-300 bg-white px-2 text-sm disabled:bg-slate-100",
                        disabled: locked,
                        value: current.scheme.as_str(),
                        onchange: edit(|c, v| {
                            if let Ok(scheme) = v.parse::<Scheme>() {
                                c.scheme = scheme;
                            }
                        }),
                        option { value: "ws", "ws://" }
                        option { value: "wss", "wss://" }
                    }
                }
                Field { label: "Cluster", hint: "(optional)",
                    TextInput {
                        value: current.cluster.clone(),
                        placeholder: "mt1",
                        disabled: locked,
                        oninput: edit(|c, v| c.cluster = v),
                    }
                }
            }
            p { class: "pt-1 text-xs text-slate-500",
                "Connection URL: "
                code { class: "rounded bg-slate-100 px-1 py-0.5", "{current.url()}" }
            }
        }
    }
}
