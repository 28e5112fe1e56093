//! Tracking sink — accumulates server events pending transmission.
//!
//! One sink is created per request and handed to the dispatch code, which
//! appends to it. The caller reads (or drains) it at the end of the request
//! to build the Conversions API payload.

use parking_lot::Mutex;
use tracing::info;

use crate::types::ServerEvent;

/// Destination for events that take the server-side path.
pub trait TrackingSink: Send + Sync {
    fn track(&self, event: ServerEvent);

    /// Events tracked so far, in tracking order.
    fn tracked_events(&self) -> Vec<ServerEvent>;
}

/// Append-only, request-scoped sink.
#[derive(Default)]
pub struct RequestSink {
    events: Mutex<Vec<ServerEvent>>,
}

impl RequestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Take every tracked event, leaving the sink empty.
    pub fn drain(&self) -> Vec<ServerEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl TrackingSink for RequestSink {
    fn track(&self, event: ServerEvent) {
        info!(
            event_id = %event.event_id(),
            event_name = event.event_name(),
            integration = event.integration().unwrap_or("none"),
            "server event tracked"
        );
        self.events.lock().push(event);
    }

    fn tracked_events(&self) -> Vec<ServerEvent> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_preserves_order() {
        let sink = RequestSink::new();
        assert!(sink.is_empty());

        sink.track(ServerEvent::new("Lead"));
        sink.track(ServerEvent::new("CompleteRegistration"));

        let events = sink.tracked_events();
        assert_eq!(sink.len(), 2);
        assert_eq!(events[0].event_name(), "Lead");
        assert_eq!(events[1].event_name(), "CompleteRegistration");
    }

    #[test]
    fn test_drain_and_clear() {
        let sink = RequestSink::new();
        sink.track(ServerEvent::new("Lead"));

        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());

        sink.track(ServerEvent::new("Lead"));
        sink.clear();
        assert!(sink.tracked_events().is_empty());
    }
}
