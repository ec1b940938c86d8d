use crate::types::{
    DocEntry, Health, IngestReport, KbStats, KnowledgeBase, RebuildReport, VisionAnswer,
};
use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::env;

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

// ============================================
// Error Types
// ============================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Failure reported by the backend (non-2xx status or `ok: false` envelope).
    #[error("{message}")]
    Api { message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    /// The response body stream broke mid-way.
    #[error("stream error: {0}")]
    Stream(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

// ============================================
// Response Envelope
// ============================================

// Every backend endpoint shares the `{ok, data?, error?}` envelope. It is
// decoded exactly once, here, into ApiResult<T>.

fn envelope_ok_default() -> bool {
    true
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default = "envelope_ok_default")]
    ok: bool,
    data: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract the backend's error message from a response body, falling back to
/// a bare `HTTP <status>` when the body carries no usable envelope.
pub fn error_message(body: &str, status: u16) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: Option<ErrorBody>,
    }

    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResult<T> {
    if !status.is_success() {
        return Err(ApiError::Api {
            message: error_message(body, status.as_u16()),
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(body)?;
    if !envelope.ok {
        let message = envelope
            .error
            .and_then(|error| error.message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(ApiError::Api { message });
    }

    match envelope.data {
        Some(data) => Ok(data),
        // Older endpoints reply with the payload at the top level.
        None => serde_json::from_str(body).map_err(ApiError::from),
    }
}

// ============================================
// Client
// ============================================

static API: Lazy<ApiClient> = Lazy::new(ApiClient::from_env);

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn from_env() -> Self {
        let base_url = env::var("RAGSTUDIO_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body).inspect_err(|err| {
            tracing::warn!(path, %err, "GET failed");
        })
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> ApiResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        decode_envelope(status, &text).inspect_err(|err| {
            tracing::warn!(path, %err, "POST failed");
        })
    }

    async fn post_multipart<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body).inspect_err(|err| {
            tracing::warn!(path, %err, "upload failed");
        })
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.client.delete(self.url(path)).send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope::<serde_json::Value>(status, &body)
            .inspect_err(|err| {
                tracing::warn!(path, %err, "DELETE failed");
            })
            .map(|_| ())
    }
}

pub(crate) fn api() -> &'static ApiClient {
    &API
}

// ============================================
// Public API Functions
// ============================================

pub async fn fetch_health() -> ApiResult<Health> {
    api().get_json("/health").await
}

pub async fn fetch_kbs() -> ApiResult<Vec<KnowledgeBase>> {
    api().get_json("/kbs").await
}

pub async fn create_kb(name: &str) -> ApiResult<KnowledgeBase> {
    api()
        .post_json("/kbs", &serde_json::json!({ "name": name }))
        .await
}

pub async fn delete_kb(kb_id: &str) -> ApiResult<()> {
    api().delete(&format!("/kbs/{kb_id}")).await
}

pub async fn fetch_docs(kb_id: &str) -> ApiResult<Vec<DocEntry>> {
    api().get_json(&format!("/kbs/{kb_id}/docs")).await
}

pub async fn delete_doc(kb_id: &str, doc_id: &str) -> ApiResult<()> {
    api().delete(&format!("/kbs/{kb_id}/docs/{doc_id}")).await
}

pub async fn fetch_stats(kb_id: &str) -> ApiResult<KbStats> {
    api().get_json(&format!("/kbs/{kb_id}/stats")).await
}

pub async fn rebuild_index(kb_id: &str) -> ApiResult<RebuildReport> {
    api()
        .post_json(&format!("/kbs/{kb_id}/rebuild"), &serde_json::json!({}))
        .await
}

/// Upload a document for ingestion. `chunk_size`/`chunk_overlap` tune the
/// backend's splitter.
pub async fn upload_document(
    kb_id: &str,
    filename: &str,
    bytes: Vec<u8>,
    chunk_size: u32,
    chunk_overlap: u32,
) -> ApiResult<IngestReport> {
    let form = Form::new()
        .part("file", Part::bytes(bytes).file_name(filename.to_string()))
        .text("chunk_size", chunk_size.to_string())
        .text("chunk_overlap", chunk_overlap.to_string());
    api()
        .post_multipart(&format!("/kbs/{kb_id}/upload"), form)
        .await
}

pub async fn analyze_image(
    prompt: &str,
    filename: &str,
    bytes: Vec<u8>,
) -> ApiResult<VisionAnswer> {
    let form = Form::new()
        .text("prompt", prompt.to_string())
        .part("image", Part::bytes(bytes).file_name(filename.to_string()));
    api().post_multipart("/vision/analyze", form).await
}

#[cfg(test)]
mod tests {
    use super::{decode_envelope, error_message};
    use crate::types::{KbStats, KnowledgeBase};
    use reqwest::StatusCode;

    #[test]
    fn decodes_data_field() {
        let body = r#"{"ok":true,"data":{"kb_id":"abc123","name":"Docs","created_at":1700000000}}"#;
        let kb: KnowledgeBase = decode_envelope(StatusCode::OK, body).expect("decode");
        assert_eq!(kb.kb_id, "abc123");
        assert_eq!(kb.name, "Docs");
    }

    #[test]
    fn falls_back_to_top_level_payload() {
        let body = r#"{"docs":3,"chunks":42}"#;
        let stats: KbStats = decode_envelope(StatusCode::OK, body).expect("decode");
        assert_eq!(stats.docs, 3);
        assert_eq!(stats.chunks, 42);
    }

    #[test]
    fn surfaces_envelope_error_on_ok_false() {
        let body = r#"{"ok":false,"error":{"code":"VALIDATION","message":"KB name is required"}}"#;
        let err = decode_envelope::<KbStats>(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.to_string(), "KB name is required");
    }

    #[test]
    fn surfaces_status_on_bare_failure() {
        let err = decode_envelope::<KbStats>(StatusCode::INTERNAL_SERVER_ERROR, "boom").unwrap_err();
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn error_message_prefers_envelope() {
        let body = r#"{"ok":false,"error":{"message":"kb not found"}}"#;
        assert_eq!(error_message(body, 500), "kb not found");
        assert_eq!(error_message("not json", 502), "HTTP 502");
        assert_eq!(error_message(r#"{"ok":false}"#, 400), "HTTP 400");
    }
}
