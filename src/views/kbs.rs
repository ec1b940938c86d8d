use crate::api::{create_kb, delete_kb, fetch_kbs};
use crate::types::KnowledgeBase;
use crate::ui::AppTab;
use crate::views::kb_detail::KbDetailView;
use crate::views::shared::{Toast, format_created_date, toast_error, toast_success};
use dioxus::events::Key;
use dioxus::prelude::*;

#[component]
pub fn KbsView(
    toasts: Signal<Vec<Toast>>,
    selected_kb: Signal<Option<String>>,
    chat_kb: Signal<Option<String>>,
    active_tab: Signal<AppTab>,
) -> Element {
    let mut kbs = use_signal(Vec::<KnowledgeBase>::new);
    let mut show_create = use_signal(|| false);
    let mut name = use_signal(String::new);
    let mut confirm_delete = use_signal(|| Option::<KnowledgeBase>::None);

    let refresh = move || {
        spawn(async move {
            match fetch_kbs().await {
                Ok(list) => kbs.set(list),
                Err(err) => toast_error(toasts, "Failed to load knowledge bases", err.to_string()),
            }
        });
    };

    use_effect(move || {
        refresh();
    });

    let mut submit_create = move || {
        let kb_name = name().trim().to_string();
        if kb_name.is_empty() {
            toast_error(toasts, "Name required", "Give the knowledge base a name");
            return;
        }
        spawn(async move {
            match create_kb(&kb_name).await {
                Ok(kb) => {
                    toast_success(toasts, "Created", kb.name);
                    name.set(String::new());
                    show_create.set(false);
                    refresh();
                }
                Err(err) => toast_error(toasts, "Create failed", err.to_string()),
            }
        });
    };

    // Hooks above run unconditionally; only the render output branches.
    if let Some(kb_id) = selected_kb() {
        return rsx! {
            KbDetailView { kb_id, toasts, selected_kb, chat_kb, active_tab }
        };
    }

    let confirm_snapshot = confirm_delete();
    let kbs_snapshot = kbs();

    rsx! {
        div { class: "main-container",
            div { class: "page-header",
                div {
                    h2 { class: "page-title", "Knowledge Bases" }
                    p { class: "text-muted", "Create, upload, index and manage." }
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| show_create.set(true),
                    "New"
                }
            }

            if kbs_snapshot.is_empty() {
                div { class: "card empty-card",
                    p { class: "empty-title", "No knowledge bases yet" }
                    p { class: "text-muted", "Use New to create your first one." }
                }
            } else {
                div { class: "kb-grid",
                    for kb in kbs_snapshot.iter().cloned() {
                        div { key: "{kb.kb_id}", class: "card kb-card",
                            div { class: "kb-card-head",
                                div { class: "kb-card-meta",
                                    span { class: "kb-card-name", "{kb.name}" }
                                    span { class: "text-muted", "ID: {kb.kb_id} · {format_created_date(kb.created_at)}" }
                                }
                                div { class: "kb-card-actions",
                                    button {
                                        class: "btn",
                                        r#type: "button",
                                        onclick: {
                                            let kb_id = kb.kb_id.clone();
                                            move |_| selected_kb.set(Some(kb_id.clone()))
                                        },
                                        "Open"
                                    }
                                    button {
                                        class: "btn btn-danger",
                                        r#type: "button",
                                        onclick: {
                                            let kb = kb.clone();
                                            move |_| confirm_delete.set(Some(kb.clone()))
                                        },
                                        "Delete"
                                    }
                                }
                            }
                            p { class: "text-muted kb-card-blurb",
                                "Open the detail page to upload documents, rebuild the index and inspect stats."
                            }
                        }
                    }
                }
            }

            if show_create() {
                div { class: "overlay", role: "dialog", aria_modal: "true",
                    onclick: move |_| show_create.set(false),
                    div { class: "overlay-panel",
                        onclick: move |evt| evt.stop_propagation(),
                        header { class: "overlay-header",
                            h2 { "New knowledge base" }
                            button {
                                class: "btn-ghost overlay-close",
                                r#type: "button",
                                onclick: move |_| show_create.set(false),
                                aria_label: "Close",
                                dangerous_inner_html: "&times;"
                            }
                        }
                        p { class: "text-muted", "Pick a name you will recognize later." }
                        input {
                            r#type: "text",
                            placeholder: "e.g. Product docs / Legal terms / Research notes",
                            value: "{name}",
                            oninput: move |ev| name.set(ev.value()),
                            onkeydown: move |ev| {
                                if ev.key() == Key::Enter {
                                    ev.prevent_default();
                                    submit_create();
                                }
                            },
                            autofocus: true,
                        }
                        button {
                            class: "btn btn-primary overlay-submit",
                            r#type: "button",
                            onclick: move |_| submit_create(),
                            "Create"
                        }
                    }
                }
            }

            if let Some(kb) = confirm_snapshot {
                div { class: "overlay", role: "dialog", aria_modal: "true",
                    onclick: move |_| confirm_delete.set(None),
                    div { class: "overlay-panel",
                        onclick: move |evt| evt.stop_propagation(),
                        header { class: "overlay-header",
                            h2 { "Delete knowledge base" }
                        }
                        p { "Delete \"{kb.name}\"? Its documents and index go with it." }
                        div { class: "overlay-actions",
                            button {
                                class: "btn",
                                r#type: "button",
                                onclick: move |_| confirm_delete.set(None),
                                "Cancel"
                            }
                            button {
                                class: "btn btn-danger",
                                r#type: "button",
                                onclick: {
                                    let kb = kb.clone();
                                    move |_| {
                                        let kb = kb.clone();
                                        confirm_delete.set(None);
                                        spawn(async move {
                                            match delete_kb(&kb.kb_id).await {
                                                Ok(()) => {
                                                    toast_success(toasts, "Deleted", kb.name.clone());
                                                    refresh();
                                                }
                                                Err(err) => toast_error(
                                                    toasts,
                                                    "Delete failed",
                                                    err.to_string(),
                                                ),
                                            }
                                        });
                                    }
                                },
                                "Delete"
                            }
                        }
                    }
                }
            }
        }
    }
}
