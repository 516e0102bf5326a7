//! SSE adapters for generation streams and the status stream.
//!
//! Generation streams carry one `data:` event per segment. The status stream
//! carries one `data:` event per status message and a `: ping` comment when
//! the bus has been idle for its keep-alive interval.

use axum::http::header;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures_util::stream::{Stream, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use voxgate_core::{StatusBus, StatusFrame, StreamHandle};

/// Stream the events of a running session to the client.
///
/// Dropping the response body (client disconnect) cancels the session, which
/// then stops before its next segment.
pub fn generation_stream(
    handle: StreamHandle,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>> + Send + 'static> {
    let StreamHandle {
        events,
        cancel,
        task,
    } = handle;
    // The session task reports its own outcome.
    drop(task);

    let guard = cancel.drop_guard();
    let stream = ReceiverStream::new(events).map(move |event| {
        let _guard = &guard;
        Event::default().json_data(&event)
    });

    Sse::new(stream)
}

/// Subscribe to the status bus and stream it as SSE.
pub fn status_stream(bus: &StatusBus) -> Response {
    let stream = bus.stream().map(|frame| match frame {
        StatusFrame::Message(status) => Event::default().json_data(&status),
        StatusFrame::KeepAlive => Ok(Event::default().comment("ping")),
    });

    (
        [
            (header::CACHE_CONTROL, "no-cache"),
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(stream),
    )
        .into_response()
}
