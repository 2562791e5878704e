//! Turns a StreamHub subscription into an SSE response.
//!
//! The `type` field of each pushed value becomes the SSE event name, so
//! browsers can `addEventListener("notification", ...)`.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

pub fn into_sse(
    rx: broadcast::Receiver<serde_json::Value>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(rx).map(|result| {
        let event = match result {
            Ok(value) => {
                let name = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("message")
                    .to_string();
                Event::default().event(name).data(value.to_string())
            }
            // Slow client; tell it to refetch instead of silently dropping
            Err(BroadcastStreamRecvError::Lagged(skipped)) => Event::default()
                .event("lagged")
                .data(format!("{{\"skipped\":{}}}", skipped)),
        };
        Ok::<_, Infallible>(event)
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
