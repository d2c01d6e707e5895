use dioxus::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum BadgeTone {
    #[default]
    Neutral,
    Outline,
    Success,
    Warning,
    Danger,
}

#[component]
pub fn Badge(#[props(optional)] tone: Option<BadgeTone>, children: Element) -> Element {
    let tone_class = match tone.unwrap_or_default() {
        BadgeTone::Neutral => "bg-slate-100 text-slate-700",
        BadgeTone::Outline => "border border-slate-300 text-slate-700",
        BadgeTone::Success => "bg-green-100 text-green-800",
        BadgeTone::Warning => "bg-amber-100 text-amber-800",
        BadgeTone::Danger => "bg-red-100 text-red-800",
    };

    rsx! {
        span { class: "inline-flex items-center rounded-full px-2 py-0.5 text-xs font-medium {tone_class}",
            {children}
        }
    }
}
