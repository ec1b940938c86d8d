//! Integration tests for the chat stream consumer
//!
//! Drives `consume_sse` with synthetic byte streams to pin down the framing
//! contract: chunk-boundary independence, event dispatch, heartbeat
//! tolerance, and failure behavior.

use futures::stream;
use ragstudio::api::{ApiError, CancelHandle, ChatEvent, consume_sse, error_message};
use ragstudio::types::SourceCitation;
use std::convert::Infallible;

async fn run_chunks(chunks: Vec<Vec<u8>>) -> Result<Vec<ChatEvent>, ApiError> {
    let source = stream::iter(chunks.into_iter().map(Ok::<_, Infallible>));
    let mut events = Vec::new();
    consume_sse(source, &CancelHandle::default(), |event| events.push(event)).await?;
    Ok(events)
}

fn deltas_to_text(events: &[ChatEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            ChatEvent::Delta(piece) => Some(piece.as_str()),
            _ => None,
        })
        .collect()
}

const FULL_STREAM: &str = concat!(
    "event: meta\ndata: {\"ok\":true,\"top_k\":6,\"sources\":1}\n\n",
    "event: delta\ndata: {\"delta\":\"Hi\"}\n\n",
    "event: delta\ndata: {\"delta\":\" thère\"}\n\n",
    "event: ping\ndata: whatever\n\n",
    "event: heartbeat\n\n",
    "event: final\ndata: {\"ok\":true,\"content\":\"Hi thère\"}\n\n",
    "event: sources\ndata: {\"sources\":[{\"tag\":\"S1\",\"score\":0.82,\"filename\":\"a.pdf\",\"text\":\"excerpt\"}]}\n\n",
);

#[tokio::test]
async fn dispatches_deltas_in_order() {
    let events = run_chunks(vec![
        b"event: delta\ndata: {\"delta\":\"Hi\"}\n\n".to_vec(),
        b"event: delta\ndata: {\"delta\":\" there\"}\n\n".to_vec(),
    ])
    .await
    .expect("stream");

    assert_eq!(
        events,
        vec![
            ChatEvent::Delta("Hi".to_string()),
            ChatEvent::Delta(" there".to_string()),
        ]
    );
    assert_eq!(deltas_to_text(&events), "Hi there");
}

#[tokio::test]
async fn chunk_boundaries_do_not_change_the_event_sequence() {
    let raw = FULL_STREAM.as_bytes();
    let expected = run_chunks(vec![raw.to_vec()]).await.expect("whole stream");
    assert_eq!(deltas_to_text(&expected), "Hi thère");

    // every two-way split, including mid-UTF-8 and mid-frame
    for split in 1..raw.len() {
        let events = run_chunks(vec![raw[..split].to_vec(), raw[split..].to_vec()])
            .await
            .expect("split stream");
        assert_eq!(events, expected, "split at byte {split}");
    }

    // one byte per read
    let bytewise = run_chunks(raw.iter().map(|b| vec![*b]).collect())
        .await
        .expect("bytewise stream");
    assert_eq!(bytewise, expected);
}

#[tokio::test]
async fn sources_event_carries_the_citation_list() {
    let events = run_chunks(vec![FULL_STREAM.as_bytes().to_vec()])
        .await
        .expect("stream");

    let sources: Vec<&Vec<SourceCitation>> = events
        .iter()
        .filter_map(|event| match event {
            ChatEvent::Sources(list) => Some(list),
            _ => None,
        })
        .collect();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].len(), 1);
    assert_eq!(sources[0][0].tag, "S1");
    assert_eq!(sources[0][0].filename, "a.pdf");
    assert!((sources[0][0].score - 0.82).abs() < 1e-9);
}

#[tokio::test]
async fn later_sources_replace_earlier_ones() {
    let events = run_chunks(vec![
        b"event: sources\ndata: {\"sources\":[{\"tag\":\"S1\",\"score\":0.9,\"filename\":\"a.pdf\",\"text\":\"a\"}]}\n\n".to_vec(),
        b"event: sources\ndata: {\"sources\":[{\"tag\":\"S2\",\"score\":0.5,\"filename\":\"b.pdf\",\"text\":\"b\"}]}\n\n".to_vec(),
    ])
    .await
    .expect("stream");

    // the consumer reports both; the UI keeps only the latest
    let mut current: Vec<SourceCitation> = Vec::new();
    for event in events {
        if let ChatEvent::Sources(list) = event {
            current = list;
        }
    }
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].tag, "S2");
}

#[tokio::test]
async fn frames_without_data_are_silent() {
    let events = run_chunks(vec![b"event: delta\n\nevent: heartbeat\n\n".to_vec()])
        .await
        .expect("stream");
    assert!(events.is_empty());
}

#[tokio::test]
async fn trailing_partial_frame_is_dropped() {
    let events = run_chunks(vec![
        b"event: delta\ndata: {\"delta\":\"done\"}\n\nevent: delta\ndata: {\"del".to_vec(),
    ])
    .await
    .expect("stream");
    assert_eq!(events, vec![ChatEvent::Delta("done".to_string())]);
}

#[tokio::test]
async fn unknown_events_are_ignored_even_with_junk_payloads() {
    let events = run_chunks(vec![b"event: ping\ndata: ]]]not json[[[\n\n".to_vec()])
        .await
        .expect("stream");
    assert!(events.is_empty());
}

#[tokio::test]
async fn bad_json_on_a_known_event_is_fatal() {
    let result = run_chunks(vec![b"event: delta\ndata: {broken\n\n".to_vec()]).await;
    assert!(matches!(result, Err(ApiError::Json(_))));
}

#[tokio::test]
async fn mid_stream_io_failure_surfaces_as_stream_error() {
    let source = stream::iter(vec![
        Ok(b"event: delta\ndata: {\"delta\":\"partial\"}\n\n".to_vec()),
        Err(std::io::Error::other("connection reset")),
    ]);
    let mut events = Vec::new();
    let result = consume_sse(source, &CancelHandle::default(), |event| events.push(event)).await;

    assert_eq!(events, vec![ChatEvent::Delta("partial".to_string())]);
    match result {
        Err(ApiError::Stream(message)) => assert!(message.contains("connection reset")),
        other => panic!("expected stream error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancellation_stops_dispatch() {
    let cancel = CancelHandle::default();
    cancel.cancel();
    let source = stream::iter(vec![Ok::<_, Infallible>(
        b"event: delta\ndata: {\"delta\":\"late\"}\n\n".to_vec(),
    )]);
    let mut events = Vec::new();
    consume_sse(source, &cancel, |event| events.push(event))
        .await
        .expect("cancelled stream still ends cleanly");
    assert!(events.is_empty());
}

#[tokio::test]
async fn cancelling_mid_stream_skips_the_rest() {
    let cancel = CancelHandle::default();
    let source = stream::iter(vec![
        Ok::<_, Infallible>(b"event: delta\ndata: {\"delta\":\"first\"}\n\n".to_vec()),
        Ok(b"event: delta\ndata: {\"delta\":\"second\"}\n\n".to_vec()),
    ]);
    let canceller = cancel.clone();
    let mut events = Vec::new();
    consume_sse(source, &cancel, |event| {
        events.push(event);
        canceller.cancel();
    })
    .await
    .expect("stream");
    // only the chunk that was already in flight got dispatched
    assert_eq!(events.len(), 1);
}

#[test]
fn pre_stream_errors_prefer_the_envelope_message() {
    let body = r#"{"ok":false,"error":{"message":"kb not found"}}"#;
    assert_eq!(error_message(body, 500), "kb not found");
    assert_eq!(error_message("<html>oops</html>", 500), "HTTP 500");
}
