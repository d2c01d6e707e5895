use dioxus::prelude::*;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Outline,
    Ghost,
    Danger,
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonSize {
    Sm,
    #[default]
    Md,
    Icon,
}

#[derive(Props, Clone, PartialEq)]
pub struct ButtonProps {
    #[props(optional)]
    pub class: Option<String>,
    #[props(optional)]
    pub variant: Option<ButtonVariant>,
    #[props(optional)]
    pub size: Option<ButtonSize>,
    #[props(optional)]
    pub title: Option<String>,
    #[props(optional)]
    pub disabled: Option<bool>,
    #[props(optional)]
    pub onclick: Option<EventHandler<MouseEvent>>,
    pub children: Element,
}

#[component]
pub fn Button(props: ButtonProps) -> Element {
    let disabled = props.disabled.unwrap_or(false);

    let base = "inline-flex items-center justify-center gap-2 rounded-md font-medium transition-colors focus:outline-none focus:ring-2 focus:ring-offset-1 focus:ring-slate-400 disabled:opacity-50 disabled:pointer-events-none";

    let variant_class = match props.variant.unwrap_or_default() {
        ButtonVariant::Primary => "bg-slate-900 text-white hover:bg-slate-700",
        ButtonVariant::Outline => "border border-slate-300 bg-white text-slate-900 hover:bg-slate-100",
        ButtonVariant::Ghost => "bg-transparent text-slate-600 hover:bg-slate-100 hover:text-slate-900",
        ButtonVariant::Danger => "bg-red-600 text-white hover:bg-red-500",
    };

    let size_class = match props.size.unwrap_or_default() {
        ButtonSize::Sm => "h-8 px-3 text-xs",
        ButtonSize::Md => "h-9 px-4 text-sm",
        ButtonSize::Icon => "h-7 w-7 text-xs",
    };

    let class = match props.class {
        Some(extra) if !extra.is_empty() => format!("{} {} {} {}", base, variant_class, size_class, extra),
        _ => format!("{} {} {}", base, variant_class, size_class),
    };

    rsx! {
        button {
            class,
            r#type: "button",
            title: props.title,
            disabled,
            onclick: move |evt| {
                if disabled {
                    return;
                }
                if let Some(handler) = &props.onclick {
                    handler.call(evt);
                }
            },
            {props.children}
        }
    }
}
