use dioxus::prelude::*;
use reverb_tester_shared::AuthConfig;

use super::ui::{Card, Field, TextInput};
use super::use_form_drafts;
use crate::ws::{use_session, use_snapshot};

#[component]
pub fn AuthForm() -> Element {
    let session = use_session();
    let snapshot = use_snapshot();
    let mut draft = use_form_drafts().auth;

    let locked = !snapshot.read().status.can_connect();

    let update = use_callback(move |next: AuthConfig| {
        draft.set(next.clone());
        session.update_auth(next);
    });
    let edit = move |apply: fn(&mut AuthConfig, String)| {
        move |e: FormEvent| {
            let mut next = draft.read().clone();
            apply(&mut next, e.value());
            update.call(next);
        }
    };

    let current = draft.read().clone();

    rsx! {
        Card {
            title: "Authentication",
            icon: "🔑",
            actions: rsx! {
                input {
                    r#type: "checkbox",
                    class: "h-4 w-4 cursor-pointer accent-slate-900",
                    checked: current.enabled,
                    disabled: locked,
                    onchange: move |e: FormEvent| {
                        let mut next = draft.read().clone();
                        next.enabled = e.checked();
                        update.call(next);
                    },
                }
            },
            if current.enabled {
                Field { label: "Auth Endpoint", hint: "(full URL)",
                    TextInput {
                        value: current.endpoint.clone(),
                        placeholder: "https://api.example.com/broadcasting/auth",
                        disabled: locked,
                        oninput: edit(|a, v| a.endpoint = v),
                    }
                }
                Field { label: "Bearer Token",
                    TextInput {
                        r#type: "password",
                        value: current.bearer_token.clone(),
                        placeholder: "your-sanctum-token",
                        disabled: locked,
                        oninput: edit(|a, v| a.bearer_token = v),
                    }
                }
                Field { label: "CSRF Token", hint: "(optional)",
                    TextInput {
                        value: current.csrf_token.clone(),
                        placeholder: "csrf-token",
                        disabled: locked,
                        oninput: edit(|a, v| a.csrf_token = v),
                    }
                }
            } else {
                p { class: "text-sm text-slate-500",
                    "Enable authentication to subscribe to private and presence channels."
                }
            }
        }
    }
}
