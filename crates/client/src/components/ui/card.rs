use dioxus::prelude::*;

/// Titled panel. `actions` renders at the right end of the header.
#[component]
pub fn Card(
    title: String,
    #[props(optional)] icon: Option<String>,
    #[props(optional)] actions: Option<Element>,
    #[props(optional)] class: Option<String>,
    children: Element,
) -> Element {
    let class = format!(
        "flex flex-col rounded-lg border border-slate-200 bg-white shadow-sm {}",
        class.unwrap_or_default()
    );

    rsx! {
        section { class,
            header { class: "flex items-center gap-2 px-4 pt-4 pb-3 text-sm font-semibold text-slate-900",
                if let Some(icon) = icon {
                    span { class: "text-base", "{icon}" }
                }
                span { class: "flex-1", "{title}" }
                {actions}
            }
            div { class: "flex-1 min-h-0 px-4 pb-4 space-y-4", {children} }
        }
    }
}
