use crate::config::Preferences;
use crate::types::ThemeMode;
use dioxus::prelude::*;

#[component]
pub fn SettingsView(theme: Signal<ThemeMode>, prefs: Signal<Preferences>) -> Element {
    let mut persist = move |update: Preferences| {
        prefs.set(update);
        theme.set(update.theme);
        if let Err(err) = update.save() {
            tracing::warn!(%err, "failed to persist preferences");
        }
    };

    let current = prefs();

    rsx! {
        div { class: "main-container",
            div { class: "page-header",
                div {
                    h2 { class: "page-title", "Settings" }
                    p { class: "text-muted", "Client preferences. Backend keys and models live in the backend's .env." }
                }
            }
            div { class: "settings-section",
                h3 { class: "section-title", "Default Top-K" }
                p { class: "text-muted", "How many retrieved snippets a query asks for. The chat page can override per turn." }
                div { class: "topk-slider",
                    input {
                        r#type: "range",
                        min: "2",
                        max: "12",
                        value: "{current.default_top_k}",
                        oninput: move |ev| {
                            if let Ok(value) = ev.value().parse::<u32>() {
                                persist(Preferences {
                                    default_top_k: value,
                                    ..prefs()
                                });
                            }
                        },
                    }
                    span { class: "topk-value", "{current.default_top_k}" }
                }
            }
            div { class: "settings-section",
                h3 { class: "section-title", "Display" }
                div { class: "theme-toggle",
                    button {
                        class: format_args!(
                            "theme-option {}",
                            if matches!(current.theme, ThemeMode::Dark) { "active" } else { "" }
                        ),
                        r#type: "button",
                        onclick: move |_| persist(Preferences { theme: ThemeMode::Dark, ..prefs() }),
                        "Dark"
                    }
                    button {
                        class: format_args!(
                            "theme-option {}",
                            if matches!(current.theme, ThemeMode::Light) { "active" } else { "" }
                        ),
                        r#type: "button",
                        onclick: move |_| persist(Preferences { theme: ThemeMode::Light, ..prefs() }),
                        "Light"
                    }
                }
            }
        }
    }
}
