use dioxus::prelude::*;

use super::ui::{Button, ButtonSize, ButtonVariant};
use super::use_form_drafts;
use crate::ws::{use_session, use_snapshot};

/// Save the current settings under a name, or load/delete a saved preset.
#[component]
pub fn PresetManager() -> Element {
    let session = use_session();
    let snapshot = use_snapshot();
    let mut drafts = use_form_drafts();
    let mut name = use_signal(String::new);
    let mut selected = use_signal(String::new);

    let presets = snapshot.read().presets.clone();
    let locked = !snapshot.read().status.can_connect();

    let save = {
        let session = session.clone();
        move |_| {
            let value = name.read().trim().to_string();
            if value.is_empty() {
                return;
            }
            session.save_preset(value);
            name.set(String::new());
        }
    };

    let load = {
        let session = session.clone();
        move |_| {
            let id = selected.read().clone();
            let current = snapshot.read();
            if let Some(preset) = current.presets.iter().find(|p| p.id == id) {
                drafts.connection.set(preset.connection.clone());
                drafts.auth.set(preset.auth.clone());
                session.load_preset(id);
            }
        }
    };

    let delete = move |_| {
        let id = selected.read().clone();
        if !id.is_empty() {
            session.delete_preset(id);
            selected.set(String::new());
        }
    };

    let has_selection = presets.iter().any(|p| p.id == *selected.read());

    rsx! {
        div { class: "flex items-center gap-2",
            input {
                class: "h-8 w-40 rounded-md border border-slate-300 px-2 text-xs",
                placeholder: "Preset name",
                value: "{name}",
                oninput: move |e| name.set(e.value()),
            }
            Button {
                size: ButtonSize::Sm,
                variant: ButtonVariant::Outline,
                disabled: name.read().trim().is_empty(),
                onclick: save,
                "Save"
            }
            select {
                class: "h-8 rounded-md border border-slate-300 bg-white px-2 text-xs",
                value: "{selected}",
                onchange: move |e| selected.set(e.value()),
                option { value: "", "Presets ({presets.len()})" }
                for preset in presets.iter() {
                    option { key: "{preset.id}", value: "{preset.id}", "{preset.name}" }
                }
            }
            Button {
                size: ButtonSize::Sm,
                variant: ButtonVariant::Outline,
                disabled: !has_selection || locked,
                title: "Load preset",
                onclick: load,
                "Load"
            }
            Button {
                size: ButtonSize::Sm,
                variant: ButtonVariant::Ghost,
                disabled: !has_selection,
                title: "Delete preset",
                onclick: delete,
                "Delete"
            }
        }
    }
}
