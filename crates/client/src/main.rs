//! Reverb Tester - desktop entry point
//!
//! Connects to a Laravel Reverb (or any Pusher protocol) server and shows
//! everything that happens on the socket.

#![allow(non_snake_case)]

use dioxus::prelude::*;
use reverb_tester_client::components::{
    use_form_drafts_provider, AuthForm, ChannelSubscriber, ConnectButton, ConnectionForm,
    ConnectionStatusBar, EventLog, PresetManager, SubscribedChannels,
};
use reverb_tester_client::logging::init_tracing;
use reverb_tester_client::ws::use_session_root;
use reverb_tester_client::AppConfig;

const TAILWIND_CSS: Asset = asset!("/assets/tailwind.css");

fn main() {
    init_tracing("reverb_tester_client=debug");
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let session = use_session_root(AppConfig::from_env());
    let (connection, auth) = {
        let snapshot = session.snapshot.peek();
        (snapshot.connection.clone(), snapshot.auth.clone())
    };
    use_form_drafts_provider(connection, auth);

    rsx! {
        document::Link { rel: "stylesheet", href: TAILWIND_CSS }

        div { class: "min-h-screen bg-slate-50 text-slate-900",
            header { class: "border-b border-slate-200 bg-white",
                div { class: "mx-auto flex max-w-7xl items-center justify-between px-6 py-4",
                    div {
                        h1 { class: "text-xl font-bold", "Reverb Tester" }
                        p { class: "text-sm text-slate-500",
                            "Test Laravel Reverb WebSocket connections and events"
                        }
                    }
                    PresetManager {}
                }
            }

            main { class: "mx-auto max-w-7xl space-y-4 px-6 py-6",
                div { class: "flex items-center gap-4",
                    ConnectButton {}
                    div { class: "flex-1", ConnectionStatusBar {} }
                }
                div { class: "grid grid-cols-1 gap-4 lg:grid-cols-2",
                    div { class: "space-y-4",
                        ConnectionForm {}
                        AuthForm {}
                        ChannelSubscriber {}
                        SubscribedChannels {}
                    }
                    div { class: "lg:sticky lg:top-4 lg:h-[calc(100vh-8rem)]",
                        EventLog {}
                    }
                }
            }
        }
    }
}
