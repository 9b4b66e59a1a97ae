//! Server-Sent Events (SSE) endpoint for change notifications.
//!
//! Endpoint: GET /api/events
//!
//! Viewers keep this stream open instead of polling /api/version.
//!
//! # Example
//!
//! ```text
//! data: {"ping":true,"timestamp":"2026-01-01T00:00:30Z"}
//!
//! id: 7
//! data: {"version":7,"timestamp":"2026-01-01T00:00:41Z"}
//! ```

use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    response::{
        IntoResponse,
        sse::{Event, Sse},
    },
    routing::get,
};
use futures::stream::{Stream, StreamExt};
use mdeasy_core::Waiter;

use crate::events::viewer_events;
use crate::state::AppState;

/// Header a reconnecting `EventSource` sends with the last id it received.
const LAST_EVENT_ID: &str = "last-event-id";

/// GET /api/events - Subscribe to change notifications.
///
/// A change event carries the new generation as both its id and its data.
/// After each idle heartbeat interval a `{"ping":true}` event is sent. A
/// client reconnecting with `Last-Event-ID` resumes from that generation and
/// receives any change it missed immediately.
async fn subscribe_events(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let bus = state.bus();
    let resume_from = headers
        .get(LAST_EVENT_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());

    let waiter = match resume_from {
        Some(generation) => bus.subscribe_from(generation),
        None => bus.subscribe(),
    };

    tracing::info!(
        last_seen = waiter.last_seen(),
        generation = bus.current(),
        watchers = bus.waiter_count(),
        "Viewer subscribed to change events"
    );

    let stream = event_stream(&state, waiter);

    (
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Sse::new(stream),
    )
}

/// SSE stream for one viewer; ends only when the server shuts down.
fn event_stream(
    state: &AppState,
    waiter: Waiter,
) -> impl Stream<Item = Result<Event, Infallible>> + use<> {
    viewer_events(waiter, state.config().heartbeat_interval)
        .map(|event| Ok(event.to_sse()))
        .take_until(state.closed())
}

/// Build SSE event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/events", get(subscribe_events))
}
