use crate::api::{delete_doc, fetch_docs, fetch_stats, rebuild_index, upload_document};
use crate::config::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::types::{DocEntry, KbStats};
use crate::ui::AppTab;
use crate::views::shared::{
    Toast, display_file_name, format_size, toast_error, toast_success,
};
use dioxus::events::FormEvent;
use dioxus::html::FileEngine;
use dioxus::prelude::*;
use std::sync::Arc;

const UPLOAD_ACCEPT: &str = ".pdf,.docx,.txt,.md,.csv";

fn mime_label(doc: &DocEntry) -> String {
    doc.mime.clone().unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn KbDetailView(
    kb_id: String,
    toasts: Signal<Vec<Toast>>,
    selected_kb: Signal<Option<String>>,
    chat_kb: Signal<Option<String>>,
    active_tab: Signal<AppTab>,
) -> Element {
    let mut docs = use_signal(Vec::<DocEntry>::new);
    let mut stats = use_signal(KbStats::default);
    let mut busy = use_signal(|| false);
    let chunk_size = use_signal(|| DEFAULT_CHUNK_SIZE);
    let overlap = use_signal(|| DEFAULT_CHUNK_OVERLAP);
    let mut confirm_doc = use_signal(|| Option::<DocEntry>::None);

    let refresh = {
        let kb_id = kb_id.clone();
        move || {
            let kb_id = kb_id.clone();
            spawn(async move {
                let (docs_result, stats_result) =
                    futures::join!(fetch_docs(&kb_id), fetch_stats(&kb_id));
                match docs_result {
                    Ok(list) => docs.set(list),
                    Err(err) => toast_error(toasts, "Failed to load documents", err.to_string()),
                }
                if let Ok(counts) = stats_result {
                    stats.set(counts);
                }
            });
        }
    };

    {
        let refresh = refresh.clone();
        use_effect(move || {
            refresh();
        });
    }

    let mut upload_files = {
        let kb_id = kb_id.clone();
        let refresh = refresh.clone();
        move |engine: Arc<dyn FileEngine>| {
            let kb_id = kb_id.clone();
            let refresh = refresh.clone();
            let size = chunk_size();
            let over = overlap();
            busy.set(true);
            spawn(async move {
                for picked in engine.files() {
                    let filename = display_file_name(&picked);
                    let Some(bytes) = engine.read_file(&picked).await else {
                        toast_error(toasts, "Upload failed", format!("Could not read {filename}"));
                        continue;
                    };
                    match upload_document(&kb_id, &filename, bytes, size, over).await {
                        Ok(report) => toast_success(
                            toasts,
                            "Uploaded and indexed",
                            format!("{} · {} chunks", report.filename, report.chunks),
                        ),
                        Err(err) => toast_error(toasts, "Upload failed", err.to_string()),
                    }
                }
                busy.set(false);
                refresh();
            });
        }
    };

    let rebuild = {
        let kb_id = kb_id.clone();
        let refresh = refresh.clone();
        move |_| {
            let kb_id = kb_id.clone();
            let refresh = refresh.clone();
            busy.set(true);
            spawn(async move {
                match rebuild_index(&kb_id).await {
                    Ok(report) => toast_success(
                        toasts,
                        "Index rebuilt",
                        format!("chunks: {}", report.chunks),
                    ),
                    Err(err) => toast_error(toasts, "Rebuild failed", err.to_string()),
                }
                busy.set(false);
                refresh();
            });
        }
    };

    let open_chat = {
        let kb_id = kb_id.clone();
        move |_| {
            chat_kb.set(Some(kb_id.clone()));
            active_tab.set(AppTab::Chat);
        }
    };

    let stats_snapshot = stats();
    let docs_snapshot = docs();
    let confirm_snapshot = confirm_doc();

    rsx! {
        div { class: "main-container",
            div { class: "page-header",
                div {
                    h2 { class: "page-title", "Knowledge base" }
                    p { class: "text-muted",
                        "KB ID: {kb_id} · docs {stats_snapshot.docs} · chunks {stats_snapshot.chunks}"
                    }
                }
                div { class: "page-header-actions",
                    button {
                        class: "btn",
                        r#type: "button",
                        onclick: move |_| selected_kb.set(None),
                        "Back"
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: open_chat,
                        "Open chat"
                    }
                    button {
                        class: "btn",
                        r#type: "button",
                        disabled: busy(),
                        onclick: rebuild,
                        "Rebuild index"
                    }
                }
            }

            div { class: "card section-card",
                div { class: "section-head",
                    div {
                        span { class: "section-title", "Upload & chunking" }
                        p { class: "text-muted", "chunk size 700–1200 and overlap 80–160 work well" }
                    }
                    div { class: "chunking-controls",
                        label { class: "control-label", "chunk"
                            input {
                                r#type: "number",
                                value: "{chunk_size}",
                                oninput: {
                                    let mut chunk_size = chunk_size;
                                    move |ev: FormEvent| {
                                        if let Ok(value) = ev.value().parse::<u32>() {
                                            chunk_size.set(value);
                                        }
                                    }
                                },
                            }
                        }
                        label { class: "control-label", "overlap"
                            input {
                                r#type: "number",
                                value: "{overlap}",
                                oninput: {
                                    let mut overlap = overlap;
                                    move |ev: FormEvent| {
                                        if let Ok(value) = ev.value().parse::<u32>() {
                                            overlap.set(value);
                                        }
                                    }
                                },
                            }
                        }
                        if busy() {
                            span { class: "text-muted", "Working…" }
                        }
                    }
                }
                div { class: "upload-zone",
                    p { class: "upload-title", "Pick files to upload and index" }
                    p { class: "text-muted", "PDF / DOCX / TXT / MD / CSV" }
                    input {
                        r#type: "file",
                        multiple: true,
                        accept: UPLOAD_ACCEPT,
                        disabled: busy(),
                        onchange: move |ev| {
                            if let Some(engine) = ev.files() {
                                upload_files(engine);
                            }
                        },
                    }
                }
            }

            div { class: "card section-card",
                span { class: "section-title", "Documents" }
                p { class: "text-muted", "Deleting a document triggers an index rebuild." }
                if docs_snapshot.is_empty() {
                    div { class: "doc-empty",
                        p { class: "text-muted", "No documents yet. Upload some files first." }
                    }
                } else {
                    div { class: "doc-table",
                        div { class: "doc-table-header",
                            span { class: "doc-col-title", "File" }
                            span { class: "doc-col-mime", "Type" }
                            span { class: "doc-col-size", "Size" }
                            span { class: "doc-col-actions", "" }
                        }
                        div { class: "doc-table-body",
                            for doc in docs_snapshot.iter().cloned() {
                                div { key: "{doc.doc_id}", class: "doc-row",
                                    span { class: "doc-row-title",
                                        "{doc.filename}"
                                        span { class: "doc-row-id", "doc_id: {doc.doc_id}" }
                                    }
                                    span { class: "doc-col-mime", "{mime_label(&doc)}" }
                                    span { class: "doc-col-size", "{format_size(doc.size_bytes)}" }
                                    span { class: "doc-col-actions",
                                        button {
                                            class: "btn btn-danger",
                                            r#type: "button",
                                            disabled: busy(),
                                            onclick: {
                                                let doc = doc.clone();
                                                move |_| confirm_doc.set(Some(doc.clone()))
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

            if let Some(doc) = confirm_snapshot {
                div { class: "overlay", role: "dialog", aria_modal: "true",
                    onclick: move |_| confirm_doc.set(None),
                    div { class: "overlay-panel",
                        onclick: move |evt| evt.stop_propagation(),
                        header { class: "overlay-header",
                            h2 { "Delete document" }
                        }
                        p { "Delete \"{doc.filename}\"? The index is rebuilt afterwards." }
                        div { class: "overlay-actions",
                            button {
                                class: "btn",
                                r#type: "button",
                                onclick: move |_| confirm_doc.set(None),
                                "Cancel"
                            }
                            button {
                                class: "btn btn-danger",
                                r#type: "button",
                                onclick: {
                                    let doc = doc.clone();
                                    let kb_id = kb_id.clone();
                                    let refresh = refresh.clone();
                                    move |_| {
                                        let doc = doc.clone();
                                        let kb_id = kb_id.clone();
                                        let refresh = refresh.clone();
                                        confirm_doc.set(None);
                                        busy.set(true);
                                        spawn(async move {
                                            match delete_doc(&kb_id, &doc.doc_id).await {
                                                Ok(()) => {
                                                    toast_success(toasts, "Deleted", doc.filename.clone());
                                                }
                                                Err(err) => toast_error(
                                                    toasts,
                                                    "Delete failed",
                                                    err.to_string(),
                                                ),
                                            }
                                            busy.set(false);
                                            refresh();
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
