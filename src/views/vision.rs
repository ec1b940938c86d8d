use crate::api::analyze_image;
use crate::views::shared::{Toast, display_file_name, markdown_to_html, toast_error, toast_success};
use dioxus::prelude::*;

const DEFAULT_PROMPT: &str = "Describe this image and extract the key information.";

#[component]
pub fn VisionView(toasts: Signal<Vec<Toast>>) -> Element {
    let mut picked = use_signal(|| Option::<(String, Vec<u8>)>::None);
    let mut prompt = use_signal(|| DEFAULT_PROMPT.to_string());
    let mut result = use_signal(String::new);
    let mut busy = use_signal(|| false);

    let run = move |_| {
        let Some((filename, bytes)) = picked() else {
            toast_error(toasts, "Pick an image first", "png/jpg/jpeg/webp");
            return;
        };
        let question = prompt();
        busy.set(true);
        result.set(String::new());
        spawn(async move {
            match analyze_image(&question, &filename, bytes).await {
                Ok(answer) => {
                    result.set(answer.text);
                    toast_success(toasts, "Done", "Image analyzed");
                }
                Err(err) => toast_error(toasts, "Analysis failed", err.to_string()),
            }
            busy.set(false);
        });
    };

    let picked_snapshot = picked();
    let result_snapshot = result();
    let picked_label = picked_snapshot
        .as_ref()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| "Pick an image".to_string());

    rsx! {
        div { class: "main-container vision-layout",
            div { class: "card section-card vision-input",
                span { class: "section-title", "Input" }
                div { class: "upload-zone",
                    p { class: "upload-title", "{picked_label}" }
                    p { class: "text-muted", "png/jpg/jpeg/webp" }
                    input {
                        r#type: "file",
                        accept: "image/*",
                        disabled: busy(),
                        onchange: move |ev| {
                            if let Some(engine) = ev.files() {
                                spawn(async move {
                                    if let Some(path) = engine.files().first().cloned() {
                                        let filename = display_file_name(&path);
                                        match engine.read_file(&path).await {
                                            Some(bytes) => picked.set(Some((filename, bytes))),
                                            None => toast_error(
                                                toasts,
                                                "Could not read image",
                                                filename,
                                            ),
                                        }
                                    }
                                });
                            }
                        },
                    }
                }
                label { class: "control-label", "Prompt" }
                textarea {
                    class: "vision-prompt",
                    value: "{prompt}",
                    oninput: move |ev| prompt.set(ev.value()),
                }
                button {
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: busy(),
                    onclick: run,
                    if busy() { "Analyzing…" } else { "Analyze" }
                }
            }
            div { class: "card section-card vision-output",
                span { class: "section-title", "Output" }
                p { class: "text-muted", "The model's text answer, rendered as markdown." }
                div { class: "vision-result",
                    if result_snapshot.is_empty() {
                        p { class: "text-muted", "No result yet. Pick an image and hit Analyze." }
                    } else {
                        div { class: "md", dangerous_inner_html: "{markdown_to_html(&result_snapshot)}" }
                    }
                }
            }
        }
    }
}
