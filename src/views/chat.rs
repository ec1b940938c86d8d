use crate::api::{CancelHandle, ChatEvent, ChatStreamRequest, fetch_kbs, stream_chat};
use crate::config::Preferences;
use crate::types::{ChatMessage, KnowledgeBase, Role, SourceCitation};
use crate::views::shared::{Toast, format_score, markdown_to_html, toast_error};
use dioxus::events::Key;
use dioxus::prelude::*;

/// Turns of history sent with each question; older turns are dropped.
const HISTORY_LIMIT: usize = 14;

const GREETING: &str =
    "Hi! Pick a knowledge base and ask away. Retrieved sources appear on the right.";

fn history_for_backend(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    let start = messages.len().saturating_sub(HISTORY_LIMIT);
    messages[start..].to_vec()
}

fn is_streaming_message(stream: Option<usize>, index: usize) -> bool {
    matches!(stream, Some(idx) if idx == index)
}

fn is_pending_assistant(msg: &ChatMessage, stream: Option<usize>, index: usize) -> bool {
    matches!(msg.role, Role::Assistant)
        && is_streaming_message(stream, index)
        && msg.content.is_empty()
}

#[component]
pub fn ChatView(
    toasts: Signal<Vec<Toast>>,
    chat_kb: Signal<Option<String>>,
    prefs: Signal<Preferences>,
) -> Element {
    let mut kbs = use_signal(Vec::<KnowledgeBase>::new);
    let mut kb_id = use_signal(String::new);
    let mut top_k = use_signal(move || prefs.peek().default_top_k);
    let messages = use_signal(|| {
        vec![ChatMessage {
            role: Role::Assistant,
            content: GREETING.to_string(),
        }]
    });
    let mut input = use_signal(String::new);
    let sending = use_signal(|| false);
    let streaming_index = use_signal(|| Option::<usize>::None);
    let sources = use_signal(Vec::<SourceCitation>::new);
    let active_stream = use_signal(|| Option::<CancelHandle>::None);

    use_future(move || async move {
        match fetch_kbs().await {
            Ok(list) => {
                let first_id = list.first().map(|kb| kb.kb_id.clone());
                if kb_id.peek().is_empty() {
                    if let Some(id) = first_id {
                        kb_id.set(id);
                    }
                }
                kbs.set(list);
            }
            Err(err) => toast_error(toasts, "Failed to load knowledge bases", err.to_string()),
        }
    });

    // Jumping here from a KB detail page preselects that KB.
    use_effect(move || {
        if let Some(id) = chat_kb() {
            kb_id.set(id);
        }
    });

    let mut send_message = {
        let mut messages = messages;
        let mut sources = sources;
        let mut streaming_index = streaming_index;
        let mut active_stream = active_stream;
        let mut sending_signal = sending;
        let mut input_signal = input;
        move |text: String| {
            let trimmed = text.trim();
            if trimmed.is_empty() || sending_signal() {
                return;
            }
            let kb = kb_id();
            if kb.is_empty() {
                toast_error(
                    toasts,
                    "No knowledge base selected",
                    "Create one under Knowledge Bases first",
                );
                return;
            }

            // A superseded stream must not keep writing into the message list.
            if let Some(prev) = active_stream.take() {
                prev.cancel();
            }

            let history = history_for_backend(&messages());
            messages.with_mut(|msgs| {
                msgs.push(ChatMessage {
                    role: Role::User,
                    content: trimmed.to_string(),
                });
            });
            input_signal.set(String::new());
            sources.set(Vec::new());
            sending_signal.set(true);

            let mut inserted_index = 0;
            messages.with_mut(|msgs| {
                inserted_index = msgs.len();
                msgs.push(ChatMessage {
                    role: Role::Assistant,
                    content: String::new(),
                });
            });
            streaming_index.set(Some(inserted_index));

            let cancel = CancelHandle::default();
            active_stream.set(Some(cancel.clone()));

            let request = ChatStreamRequest {
                kb_id: kb,
                message: trimmed.to_string(),
                history,
                top_k: top_k(),
            };
            spawn(async move {
                let mut reply = String::new();
                let result = stream_chat(&request, cancel.clone(), |event| match event {
                    ChatEvent::Delta(piece) => {
                        reply.push_str(&piece);
                        let snapshot = reply.clone();
                        messages.with_mut(|msgs| {
                            if let Some(slot) = msgs.get_mut(inserted_index) {
                                slot.content = snapshot;
                            }
                        });
                    }
                    ChatEvent::Sources(list) => sources.set(list),
                })
                .await;

                if cancel.is_cancelled() {
                    // the newer send owns the UI state now
                    return;
                }
                if let Err(err) = result {
                    toast_error(toasts, "Chat failed", err.to_string());
                }
                streaming_index.set(None);
                sending_signal.set(false);
                active_stream.set(None);
            });
        }
    };

    let kbs_snapshot = kbs();
    let messages_snapshot = messages();
    let sources_snapshot = sources();
    let current_stream = streaming_index();

    rsx! {
        div { class: "main-container chat-layout",
            div { class: "chat-column",
                div { class: "chat-toolbar",
                    span { class: "chat-toolbar-title", "Chat" }
                    div { class: "chat-toolbar-controls",
                        select {
                            value: "{kb_id}",
                            onchange: move |ev| kb_id.set(ev.value()),
                            for kb in kbs_snapshot.iter() {
                                option { value: "{kb.kb_id}", "{kb.name}" }
                            }
                        }
                        input {
                            class: "topk-input",
                            r#type: "number",
                            title: "Top-K",
                            min: "1",
                            max: "20",
                            value: "{top_k}",
                            oninput: move |ev| {
                                if let Ok(value) = ev.value().parse::<u32>() {
                                    top_k.set(value.clamp(1, 20));
                                }
                            },
                        }
                    }
                }
                div { id: "chat-list", class: "chat-list",
                    for (i, msg) in messages_snapshot.iter().enumerate() {
                        div { class: format_args!("message-row {}", match msg.role { Role::User => "user", Role::Assistant => "assistant" }),
                            div { class: "message-stack",
                                if is_pending_assistant(msg, current_stream, i) {
                                    div { class: "shimmer-line",
                                        span { class: "shimmer-text", "Thinking…" }
                                    }
                                } else {
                                    div { class: format_args!(
                                            "bubble {}",
                                            match msg.role { Role::User => "user", Role::Assistant => "assistant" },
                                        ),
                                        if matches!(msg.role, Role::Assistant) {
                                            AssistantBubble {
                                                content: msg.content.clone(),
                                                show_copy: match current_stream { Some(idx) => idx != i, None => true },
                                                is_streaming: is_streaming_message(current_stream, i),
                                            }
                                        } else { "{msg.content}" }
                                    }
                                }
                            }
                        }
                    }
                }
                form { class: "composer",
                    div { class: "composer-inner",
                        textarea {
                            rows: "1",
                            placeholder: "Ask about the selected knowledge base…",
                            value: "{input}",
                            oninput: move |ev| input.set(ev.value()),
                            onkeydown: move |ev| {
                                if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                    ev.prevent_default();
                                    let text = input();
                                    send_message(text);
                                }
                            },
                            disabled: sending(),
                            autofocus: true,
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            disabled: sending() || input().trim().is_empty(),
                            onclick: move |_| {
                                let text = input();
                                send_message(text);
                            },
                            "Send"
                        }
                    }
                    p { class: "composer-hint",
                        "Cited passages show up as [S1] [S2] … in the answer."
                    }
                }
            }
            div { class: "sources-column",
                div { class: "sources-header",
                    span { class: "sources-title", "Sources" }
                    span { class: "text-muted", "Retrieved context for the last answer." }
                }
                div { class: "sources-list",
                    if sources_snapshot.is_empty() {
                        p { class: "text-muted", "No sources yet. They appear after you send a question." }
                    } else {
                        for source in sources_snapshot.iter() {
                            SourceCard { source: source.clone() }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn AssistantBubble(content: String, show_copy: bool, is_streaming: bool) -> Element {
    let content_html = markdown_to_html(&content);
    let copy_payload = content.clone();
    let on_copy = move |_| {
        let raw = copy_payload.clone();
        spawn(async move {
            #[cfg(any(feature = "desktop", feature = "mobile"))]
            {
                if let Ok(mut cb) = arboard::Clipboard::new() {
                    let _ = cb.set_text(raw);
                }
            }
            #[cfg(not(any(feature = "desktop", feature = "mobile")))]
            let _ = raw;
        });
    };

    rsx! {
        if show_copy && !content.is_empty() {
            div { class: "bubble-controls",
                button { class: "action-btn", title: "Copy markdown", onclick: on_copy, "Copy" }
            }
        }
        if is_streaming && content.is_empty() {
            div { class: "md", div { class: "shimmer-text", "Thinking…" } }
        } else {
            div { class: "md", dangerous_inner_html: "{content_html}" }
        }
    }
}

#[component]
fn SourceCard(source: SourceCitation) -> Element {
    rsx! {
        div { class: "source-card",
            div { class: "source-card-head",
                span { class: "source-tag", "{source.tag}" }
                span { class: "source-score", "{format_score(source.score)}" }
            }
            div { class: "source-filename", "{source.filename}" }
            div { class: "source-excerpt", "{source.text}" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HISTORY_LIMIT, history_for_backend, is_pending_assistant};
    use crate::types::{ChatMessage, Role};

    fn msg(role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn history_keeps_last_fourteen_turns() {
        let messages: Vec<ChatMessage> = (0..20)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                msg(role, &format!("turn {i}"))
            })
            .collect();
        let history = history_for_backend(&messages);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].content, "turn 6");
        assert_eq!(history.last().unwrap().content, "turn 19");
    }

    #[test]
    fn short_history_is_kept_whole() {
        let messages = vec![msg(Role::User, "hello")];
        assert_eq!(history_for_backend(&messages).len(), 1);
    }

    #[test]
    fn pending_detection_requires_open_empty_assistant() {
        let open = msg(Role::Assistant, "");
        assert!(is_pending_assistant(&open, Some(0), 0));
        assert!(!is_pending_assistant(&open, Some(1), 0));
        assert!(!is_pending_assistant(&msg(Role::Assistant, "text"), Some(0), 0));
        assert!(!is_pending_assistant(&msg(Role::User, ""), Some(0), 0));
    }
}
