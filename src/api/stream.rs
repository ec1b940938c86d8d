//! Incremental consumer for the `/api/chat/stream` response.
//!
//! The backend frames its reply as server-sent events, `event: <name>` plus
//! `data: <json>` blocks separated by a blank line. Frames arrive split across
//! arbitrary network reads, so raw bytes are buffered and only complete frames
//! are decoded. Frames without a `data:` line (heartbeats) and unknown event
//! names are skipped.

use super::client::{ApiError, ApiResult, api, error_message};
use crate::types::{ChatMessage, SourceCitation};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// One `event:`/`data:` block as read off the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub data: Option<String>,
}

/// A decoded chat stream event.
#[derive(Clone, Debug, PartialEq)]
pub enum ChatEvent {
    /// Incremental assistant text to append.
    Delta(String),
    /// The complete citation list for this turn; replaces any prior list.
    Sources(Vec<SourceCitation>),
}

/// Cancellation flag shared between the chat view and an in-flight stream.
/// Cancelling stops event dispatch; the superseding request owns the UI from
/// then on.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================
// Frame reassembly
// ============================================

/// Accumulates raw response bytes and yields complete frames.
///
/// The buffer is byte-level: a multi-byte UTF-8 character split across reads
/// stays buffered until its frame completes, and frame boundaries are ASCII,
/// so decoding a complete frame never lands inside a character.
#[derive(Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Split off every fully separated frame, keeping the trailing remainder
    /// (possibly a partial frame) for the next read.
    pub fn drain_frames(&mut self) -> Vec<SseFrame> {
        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(pos) = find_separator(&self.buf[start..]) {
            let text = String::from_utf8_lossy(&self.buf[start..start + pos]);
            frames.push(parse_frame(&text));
            start += pos + 2;
        }
        if start > 0 {
            self.buf.drain(..start);
        }
        frames
    }
}

fn find_separator(haystack: &[u8]) -> Option<usize> {
    haystack.windows(2).position(|window| window == b"\n\n")
}

fn parse_frame(text: &str) -> SseFrame {
    let mut frame = SseFrame::default();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("event:") {
            frame.event = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("data:") {
            frame.data = Some(rest.trim().to_string());
        }
    }
    frame
}

// ============================================
// Event decoding
// ============================================

#[derive(Deserialize)]
struct DeltaPayload {
    #[serde(default)]
    delta: String,
}

#[derive(Deserialize)]
struct SourcesPayload {
    #[serde(default)]
    sources: Vec<SourceCitation>,
}

/// Decode one frame into a chat event.
///
/// Returns `Ok(None)` for frames with no `data:` line and for unknown event
/// names (the payload is not even parsed for those, so forward-compatible
/// events can carry anything). A JSON parse failure on a known event is fatal.
pub fn decode_event(frame: &SseFrame) -> ApiResult<Option<ChatEvent>> {
    let Some(data) = frame.data.as_deref() else {
        return Ok(None);
    };
    match frame.event.as_deref() {
        Some("delta") => {
            let payload: DeltaPayload = serde_json::from_str(data)?;
            Ok(Some(ChatEvent::Delta(payload.delta)))
        }
        Some("sources") => {
            let payload: SourcesPayload = serde_json::from_str(data)?;
            Ok(Some(ChatEvent::Sources(payload.sources)))
        }
        _ => Ok(None),
    }
}

// ============================================
// Consumption
// ============================================

/// Drive an SSE byte stream to completion, dispatching each decoded event.
///
/// Single-shot: the internal buffer dies with the call, and a truncated
/// trailing frame at end of stream is dropped silently.
pub async fn consume_sse<S, B, E>(
    stream: S,
    cancel: &CancelHandle,
    mut on_event: impl FnMut(ChatEvent),
) -> ApiResult<()>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut frames = FrameBuffer::new();
    futures::pin_mut!(stream);
    while let Some(item) = stream.next().await {
        if cancel.is_cancelled() {
            return Ok(());
        }
        match item {
            Ok(chunk) => {
                frames.push(chunk.as_ref());
                for frame in frames.drain_frames() {
                    if let Some(event) = decode_event(&frame)? {
                        on_event(event);
                    }
                }
            }
            Err(err) => return Err(ApiError::Stream(err.to_string())),
        }
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ChatStreamRequest {
    pub kb_id: String,
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub top_k: u32,
}

/// POST a chat turn and consume its SSE response.
///
/// A non-2xx status fails once with the envelope's error message (or
/// `HTTP <status>`) without touching the body stream.
pub async fn stream_chat(
    request: &ChatStreamRequest,
    cancel: CancelHandle,
    on_event: impl FnMut(ChatEvent),
) -> ApiResult<()> {
    let client = api();
    let response = client
        .http()
        .post(client.url("/chat/stream"))
        .header("accept", "text/event-stream")
        .json(request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status.as_u16());
        tracing::warn!(status = status.as_u16(), %message, "chat stream rejected");
        return Err(ApiError::Api { message });
    }

    consume_sse(response.bytes_stream(), &cancel, on_event).await
}

#[cfg(test)]
mod tests {
    use super::{ChatEvent, FrameBuffer, decode_event, parse_frame};

    #[test]
    fn parses_frame_lines() {
        let frame = parse_frame("event: delta\ndata: {\"delta\":\"hi\"}");
        assert_eq!(frame.event.as_deref(), Some("delta"));
        assert_eq!(frame.data.as_deref(), Some("{\"delta\":\"hi\"}"));

        // last occurrence wins, blank and CR-terminated lines tolerated
        let frame = parse_frame("event: a\r\n\nevent: b\ndata: 1\ndata: 2");
        assert_eq!(frame.event.as_deref(), Some("b"));
        assert_eq!(frame.data.as_deref(), Some("2"));
    }

    #[test]
    fn buffers_partial_frames_across_pushes() {
        let mut buffer = FrameBuffer::new();
        buffer.push(b"event: delta\nda");
        assert!(buffer.drain_frames().is_empty());
        buffer.push(b"ta: {\"delta\":\"x\"}\n");
        assert!(buffer.drain_frames().is_empty());
        buffer.push(b"\nevent: ping\ndata: {}\n\n");
        let frames = buffer.drain_frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event.as_deref(), Some("delta"));
        assert_eq!(frames[1].event.as_deref(), Some("ping"));
    }

    #[test]
    fn mid_utf8_split_survives() {
        let raw = "event: delta\ndata: {\"delta\":\"héllo\"}\n\n".as_bytes();
        // split inside the two-byte 'é'
        let split = raw.iter().position(|&b| b == 0xc3).unwrap() + 1;
        let mut buffer = FrameBuffer::new();
        buffer.push(&raw[..split]);
        assert!(buffer.drain_frames().is_empty());
        buffer.push(&raw[split..]);
        let frames = buffer.drain_frames();
        assert_eq!(frames.len(), 1);
        match decode_event(&frames[0]).expect("decode") {
            Some(ChatEvent::Delta(text)) => assert_eq!(text, "héllo"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn frame_without_data_is_dropped() {
        let frame = parse_frame("event: delta");
        assert!(decode_event(&frame).expect("decode").is_none());
    }

    #[test]
    fn unknown_event_is_ignored_without_parsing() {
        let frame = parse_frame("event: ping\ndata: not json at all");
        assert!(decode_event(&frame).expect("decode").is_none());

        let frame = parse_frame("event: meta\ndata: {\"top_k\":6}");
        assert!(decode_event(&frame).expect("decode").is_none());

        // data with no event name at all is not dispatchable either
        let frame = parse_frame("data: {\"delta\":\"x\"}");
        assert!(decode_event(&frame).expect("decode").is_none());
    }

    #[test]
    fn missing_payload_fields_default() {
        let frame = parse_frame("event: delta\ndata: {}");
        assert_eq!(
            decode_event(&frame).expect("decode"),
            Some(ChatEvent::Delta(String::new()))
        );

        let frame = parse_frame("event: sources\ndata: {}");
        assert_eq!(
            decode_event(&frame).expect("decode"),
            Some(ChatEvent::Sources(Vec::new()))
        );
    }

    #[test]
    fn bad_json_on_known_event_is_fatal() {
        let frame = parse_frame("event: delta\ndata: {broken");
        assert!(decode_event(&frame).is_err());
    }
}
