//! Change events for connected viewers.
//!
//! Each connected viewer holds a [`Waiter`] on the notification bus. The
//! stream built here turns the waiter's outcomes into events:
//!
//! - `Changed(g)` becomes a change event carrying the new generation
//! - `TimedOut` becomes a keep-alive ping, then the waiter waits again
//!
//! The stream never ends by itself. It is dropped when the client
//! disconnects, which detaches the waiter.

use std::time::Duration;

use axum::response::sse::Event;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use mdeasy_core::{Generation, Outcome, Waiter};
use serde::Serialize;

/// An event sent to viewers on the change stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewerEvent {
    /// The document set changed; refetch.
    Changed(ChangeEvent),
    /// Keep-alive for idle connections.
    Ping(PingEvent),
}

/// Event data for a document-set change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    /// Generation after the change.
    pub version: Generation,
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
}

/// Keep-alive event data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PingEvent {
    /// Always `true`.
    pub ping: bool,
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,
}

impl ViewerEvent {
    /// Change event for `version`.
    pub fn changed(version: Generation) -> Self {
        Self::Changed(ChangeEvent {
            version,
            timestamp: Utc::now(),
        })
    }

    /// Keep-alive event.
    pub fn ping() -> Self {
        Self::Ping(PingEvent {
            ping: true,
            timestamp: Utc::now(),
        })
    }

    /// Encode as a data-only SSE event; change events carry the generation
    /// as their id so reconnecting clients can resume.
    pub fn to_sse(&self) -> Event {
        let data = serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize viewer event");
            String::from("{}")
        });

        let event = Event::default().data(data);
        match self {
            Self::Changed(change) => event.id(change.version.to_string()),
            Self::Ping(_) => event,
        }
    }
}

/// Detaches and logs when the viewer goes away.
struct Observer {
    waiter: Waiter,
}

impl Drop for Observer {
    fn drop(&mut self) {
        tracing::info!(
            last_seen = self.waiter.last_seen(),
            "Viewer disconnected from change events"
        );
    }
}

/// Endless stream of change and keep-alive events for one viewer.
pub fn viewer_events(waiter: Waiter, heartbeat: Duration) -> impl Stream<Item = ViewerEvent> {
    stream::unfold(Observer { waiter }, move |mut observer| async move {
        let event = match observer.waiter.next(heartbeat).await {
            Outcome::Changed(generation) => {
                tracing::debug!(generation, "Sending change event");
                ViewerEvent::changed(generation)
            }
            Outcome::TimedOut => ViewerEvent::ping(),
        };
        Some((event, observer))
    })
}
