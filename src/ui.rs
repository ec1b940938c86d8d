use crate::config::Preferences;
use crate::theme::theme_definition;
use crate::types::ThemeMode;
use crate::views::shared::{Toast, ToastKind};
use crate::views::{ChatView, DashboardView, KbsView, SettingsView, VisionView};
use dioxus::prelude::*;

const STUDIO_CSS: Asset = asset!("/assets/ragstudio.css");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppTab {
    Overview,
    KnowledgeBases,
    Chat,
    Vision,
    Settings,
}

#[component]
pub fn App() -> Element {
    let prefs = use_signal(Preferences::load);
    let theme = use_signal(move || prefs.peek().theme);
    let active_tab = use_signal(|| AppTab::Overview);
    let selected_kb = use_signal(|| Option::<String>::None);
    let chat_kb = use_signal(|| Option::<String>::None);
    let toasts = use_signal(Vec::<Toast>::new);

    rsx! {
        ThemeStyles { theme }
        ToastHost { toasts }
        AppHeader { active_tab }
        TabPanels {
            active_tab,
            selected_kb,
            chat_kb,
            toasts,
            theme,
            prefs,
        }
    }
}

#[component]
fn ThemeStyles(theme: Signal<ThemeMode>) -> Element {
    let definition = theme_definition(theme());
    rsx! {
        document::Link { rel: "stylesheet", href: STUDIO_CSS }
        style { dangerous_inner_html: "{definition.css}" }
    }
}

#[component]
fn AppHeader(active_tab: Signal<AppTab>) -> Element {
    rsx! {
        div { class: "header",
            div { class: "header-content",
                span { class: "header-wordmark", "RAG Studio" }
                TabNavigation { active_tab }
            }
        }
    }
}

#[component]
fn TabPanels(
    active_tab: Signal<AppTab>,
    selected_kb: Signal<Option<String>>,
    chat_kb: Signal<Option<String>>,
    toasts: Signal<Vec<Toast>>,
    theme: Signal<ThemeMode>,
    prefs: Signal<Preferences>,
) -> Element {
    rsx! {
        div { class: "tab-panels",
            TabPanel {
                active_tab,
                tab: AppTab::Overview,
                children: rsx!( DashboardView { toasts, selected_kb, active_tab } ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::KnowledgeBases,
                children: rsx!( KbsView { toasts, selected_kb, chat_kb, active_tab } ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::Chat,
                children: rsx!( ChatView { toasts, chat_kb, prefs } ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::Vision,
                children: rsx!( VisionView { toasts } ),
            }
            TabPanel {
                active_tab,
                tab: AppTab::Settings,
                children: rsx!( SettingsView { theme, prefs } ),
            }
        }
    }
}

#[component]
fn TabPanel(active_tab: Signal<AppTab>, tab: AppTab, children: Element) -> Element {
    let is_active = active_tab() == tab;
    let class_suffix = if is_active { "active" } else { "" };
    rsx! {
        div {
            class: format_args!("tab-panel {}", class_suffix),
            aria_hidden: (!is_active).to_string(),
            {children}
        }
    }
}

#[component]
fn TabNavigation(active_tab: Signal<AppTab>) -> Element {
    rsx! {
        div { class: "tabs",
            TabButton { active_tab, tab: AppTab::Overview, label: "Overview" }
            TabButton { active_tab, tab: AppTab::KnowledgeBases, label: "Knowledge Bases" }
            TabButton { active_tab, tab: AppTab::Chat, label: "Chat" }
            TabButton { active_tab, tab: AppTab::Vision, label: "Vision" }
            TabButton { active_tab, tab: AppTab::Settings, label: "Settings" }
        }
    }
}

#[component]
fn TabButton(active_tab: Signal<AppTab>, tab: AppTab, label: &'static str) -> Element {
    let mut active_tab = active_tab;
    let class = if active_tab() == tab {
        "tab active"
    } else {
        "tab"
    };
    rsx! {
        h1 {
            class: class,
            onclick: move |_| active_tab.set(tab),
            "{label}"
        }
    }
}

#[component]
fn ToastHost(toasts: Signal<Vec<Toast>>) -> Element {
    let items = toasts();
    rsx! {
        div { class: "toast-stack",
            for toast in items.iter().cloned() {
                div {
                    key: "{toast.id}",
                    class: format_args!(
                        "toast {}",
                        match toast.kind { ToastKind::Success => "success", ToastKind::Error => "error" }
                    ),
                    div { class: "toast-body",
                        span { class: "toast-title", "{toast.title}" }
                        span { class: "toast-detail", "{toast.detail}" }
                    }
                    button {
                        class: "toast-close btn-ghost",
                        r#type: "button",
                        aria_label: "close",
                        onclick: {
                            let id = toast.id;
                            move |_| toasts.with_mut(|items| items.retain(|item| item.id != id))
                        },
                        dangerous_inner_html: "&times;"
                    }
                }
            }
        }
    }
}
