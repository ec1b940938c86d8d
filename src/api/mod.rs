/// Transport layer for the RAG Studio backend.
///
/// Every request goes through the shared `{ok, data, error}` envelope decode
/// in `client`; the chat endpoint additionally streams its reply as
/// server-sent events, consumed incrementally by `stream`.
///
/// # Architecture
///
/// - `client` - typed wrappers for the REST endpoints (KBs, docs, vision)
/// - `stream` - SSE frame reassembly and the chat stream consumer
mod client;
mod stream;

// Re-export main types
pub use client::{
    ApiError, ApiResult, analyze_image, create_kb, delete_doc, delete_kb, error_message,
    fetch_docs, fetch_health, fetch_kbs, fetch_stats, rebuild_index, upload_document,
};
pub use stream::{
    CancelHandle, ChatEvent, ChatStreamRequest, FrameBuffer, SseFrame, consume_sse, decode_event,
    stream_chat,
};
