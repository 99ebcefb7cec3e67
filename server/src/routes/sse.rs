use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use bytes::Bytes;
use futures::stream::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use crate::config::SSE_KEEPALIVE_SECS;
use crate::controller::LookupEvent;
use crate::state::AppState;

pub async fn lookup_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        // Subscribe before reading the snapshot so nothing published in between is missed.
        let rx = state.controller.subscribe();
        let (seq, data) = state.controller.snapshot_json().await;
        if let Some(payload) = event_payload(data.as_ref()) {
            yield Ok(Event::default().id(seq.to_string()).event("snapshot").data(payload));
        }

        let mut stream = BroadcastStream::new(rx);
        while let Some(result) = stream.next().await {
            match result {
                Ok(event) => {
                    let (event_type, seq, data) = match event {
                        LookupEvent::Snapshot { seq, json } => ("snapshot", seq, json),
                        LookupEvent::Notification { seq, json } => ("notification", seq, json),
                    };
                    let Some(payload) = event_payload(data.as_ref()) else {
                        warn!(
                            seq,
                            event = event_type,
                            "event payload is not valid utf-8; dropping SSE event"
                        );
                        continue;
                    };
                    yield Ok(Event::default()
                        .id(seq.to_string())
                        .event(event_type)
                        .data(payload));
                }
                Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(
                        skipped_events = skipped,
                        "SSE client lagged behind broadcast buffer; replaying snapshot"
                    );
                    let (seq, data) = state.controller.snapshot_json().await;
                    if let Some(payload) = event_payload(data.as_ref()) {
                        yield Ok(Event::default()
                            .id(seq.to_string())
                            .event("snapshot")
                            .data(payload));
                    }
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(SSE_KEEPALIVE_SECS))
            .text("keep-alive"),
    )
}

fn event_payload(bytes: &Bytes) -> Option<&str> {
    if bytes.is_empty() {
        return None;
    }
    std::str::from_utf8(bytes.as_ref()).ok()
}
