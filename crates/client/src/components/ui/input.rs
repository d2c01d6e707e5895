use dioxus::prelude::*;

#[derive(Props, Clone, PartialEq)]
pub struct TextInputProps {
    pub value: String,
    #[props(optional)]
    pub placeholder: Option<String>,
    #[props(optional)]
    pub r#type: Option<String>,
    #[props(optional)]
    pub disabled: Option<bool>,
    pub oninput: EventHandler<FormEvent>,
}

#[component]
pub fn TextInput(props: TextInputProps) -> Element {
    rsx! {
        input {
            class: "w-full h-9 rounded-md border border-slate-300 bg-white px-3 text-sm text-slate-900 placeholder-slate-400 focus:outline-none focus:ring-2 focus:ring-slate-400 disabled:bg-slate-100 disabled:text-slate-500",
            r#type: props.r#type.unwrap_or_else(|| "text".to_string()),
            value: props.value,
            placeholder: props.placeholder.unwrap_or_default(),
            disabled: props.disabled.unwrap_or(false),
            oninput: move |e| props.oninput.call(e),
        }
    }
}

/// Label plus control, with an optional muted hint after the label.
#[component]
pub fn Field(label: String, #[props(optional)] hint: Option<String>, children: Element) -> Element {
    rsx! {
        label { class: "block space-y-1.5",
            span { class: "text-xs font-medium text-slate-700",
                "{label}"
                if let Some(hint) = hint {
                    span { class: "ml-1 font-normal text-slate-400", "{hint}" }
                }
            }
            {children}
        }
    }
}
