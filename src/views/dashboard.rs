use crate::api::{fetch_health, fetch_kbs};
use crate::types::{Health, KnowledgeBase};
use crate::ui::AppTab;
use crate::views::shared::{Toast, format_created_date, toast_error};
use dioxus::prelude::*;

#[component]
pub fn DashboardView(
    toasts: Signal<Vec<Toast>>,
    selected_kb: Signal<Option<String>>,
    active_tab: Signal<AppTab>,
) -> Element {
    let mut kbs = use_signal(Vec::<KnowledgeBase>::new);
    let mut health = use_signal(|| Option::<Health>::None);
    let mut loading = use_signal(|| true);

    use_future(move || async move {
        let (kbs_result, health_result) = futures::join!(fetch_kbs(), fetch_health());
        match kbs_result {
            Ok(list) => kbs.set(list),
            Err(err) => toast_error(toasts, "Failed to load knowledge bases", err.to_string()),
        }
        // an unreachable backend just shows as offline
        health.set(health_result.ok());
        loading.set(false);
    });

    let kbs_snapshot = kbs();
    let health_snapshot = health();
    let (health_class, health_label) = match health_snapshot.as_ref() {
        Some(status) if status.ok => ("health-badge online", "Backend online"),
        Some(_) => ("health-badge offline", "Backend degraded"),
        None => ("health-badge offline", "Backend offline"),
    };

    rsx! {
        div { class: "main-container",
            div { class: "page-header",
                div {
                    h2 { class: "page-title", "Overview" }
                    p { class: "text-muted", "Knowledge bases, chat and image understanding in one place." }
                }
                span { class: "{health_class}", "{health_label}" }
            }

            div { class: "stat-grid",
                StatTile { label: "Knowledge bases", value: kbs_snapshot.len().to_string() }
                StatTile { label: "RAG chat", value: "Streaming".to_string() }
                StatTile { label: "Image understanding", value: "Vision".to_string() }
            }

            div { class: "card section-card",
                div { class: "section-head",
                    div {
                        span { class: "section-title", "Recent knowledge bases" }
                        p { class: "text-muted", "Jump straight into uploading or chatting." }
                    }
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| active_tab.set(AppTab::Chat),
                        "Open chat"
                    }
                }
                if loading() {
                    p { class: "text-muted", "Loading…" }
                } else if kbs_snapshot.is_empty() {
                    p { class: "text-muted", "No knowledge bases yet. Create one under Knowledge Bases." }
                } else {
                    div { class: "recent-grid",
                        for kb in kbs_snapshot.iter().take(6).cloned() {
                            div {
                                key: "{kb.kb_id}",
                                class: "recent-card",
                                role: "button",
                                tabindex: "0",
                                onclick: {
                                    let kb_id = kb.kb_id.clone();
                                    move |_| {
                                        selected_kb.set(Some(kb_id.clone()));
                                        active_tab.set(AppTab::KnowledgeBases);
                                    }
                                },
                                span { class: "recent-card-name", "{kb.name}" }
                                span { class: "text-muted", "KB ID: {kb.kb_id} · {format_created_date(kb.created_at)}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn StatTile(label: &'static str, value: String) -> Element {
    rsx! {
        div { class: "card stat-tile",
            span { class: "text-muted", "{label}" }
            span { class: "stat-value", "{value}" }
        }
    }
}
