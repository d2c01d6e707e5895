use dioxus::prelude::*;
use serde_json::Value;

use crate::format::format_json;

/// Collapsible JSON tree with a copy button.
#[component]
pub fn JsonViewer(value: Value) -> Element {
    let mut copied = use_signal(|| false);
    let text = format_json(&value);

    let copy = move |_| {
        let literal = serde_json::to_string(&text).unwrap_or_default();
        document::eval(&format!("navigator.clipboard.writeText({literal});"));
        copied.set(true);
    };

    rsx! {
        div { class: "group relative rounded-md bg-slate-50 p-2 font-mono text-xs",
            button {
                r#type: "button",
                class: "absolute right-1 top-1 rounded px-1.5 py-0.5 text-[10px] text-slate-500 opacity-0 hover:bg-slate-200 group-hover:opacity-100",
                onclick: copy,
                if *copied.read() { "Copied" } else { "Copy" }
            }
            JsonNode { value, label: None, depth: 0 }
        }
    }
}

#[component]
fn JsonNode(value: Value, #[props(!optional)] label: Option<String>, depth: usize) -> Element {
    let mut expanded = use_signal(move || depth < 2);

    let key = rsx! {
        if let Some(label) = label.clone() {
            span { class: "text-purple-700", "\"{label}\"" }
            span { class: "text-slate-500", ": " }
        }
    };

    let (open, close, children): (&str, &str, Vec<(Option<String>, Value)>) = match &value {
        Value::Object(map) => (
            "{",
            "}",
            map.iter().map(|(k, v)| (Some(k.clone()), v.clone())).collect(),
        ),
        Value::Array(items) => ("[", "]", items.iter().map(|v| (None, v.clone())).collect()),
        scalar => {
            let (class, text) = scalar_style(scalar);
            return rsx! {
                div { class: "whitespace-pre-wrap break-all",
                    {key}
                    span { class, "{text}" }
                }
            };
        }
    };

    if children.is_empty() {
        return rsx! {
            div { {key} span { class: "text-slate-500", "{open}{close}" } }
        };
    }

    let count = children.len();
    let summary = if value.is_array() {
        format!("{count} item{}", if count == 1 { "" } else { "s" })
    } else {
        format!("{count} key{}", if count == 1 { "" } else { "s" })
    };

    rsx! {
        div {
            div {
                class: "cursor-pointer select-none hover:bg-slate-100",
                onclick: move |_| {
                    let next = !*expanded.read();
                    expanded.set(next);
                },
                span { class: "inline-block w-3 text-slate-400", if *expanded.read() { "▾" } else { "▸" } }
                {key}
                span { class: "text-slate-500", "{open}" }
                if !*expanded.read() {
                    span { class: "text-slate-400", " {summary} " }
                    span { class: "text-slate-500", "{close}" }
                }
            }
            if *expanded.read() {
                div { class: "ml-3 border-l border-slate-200 pl-2",
                    for (index, (label, child)) in children.into_iter().enumerate() {
                        JsonNode {
                            key: "{index}",
                            value: child,
                            label,
                            depth: depth + 1,
                        }
                    }
                }
                span { class: "text-slate-500", "{close}" }
            }
        }
    }
}

fn scalar_style(value: &Value) -> (&'static str, String) {
    match value {
        Value::String(s) => ("text-green-700", format!("\"{s}\"")),
        Value::Number(n) => ("text-blue-700", n.to_string()),
        Value::Bool(b) => ("text-amber-700", b.to_string()),
        _ => ("text-slate-400", "null".to_string()),
    }
}
