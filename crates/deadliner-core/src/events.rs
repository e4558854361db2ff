//! Events and the observer registry.
//!
//! Every externally visible state change produces an [`Event`]. Front ends
//! subscribe callbacks on the [`EventBus`] instead of polling; emission is
//! synchronous, fire-and-forget, in registration order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Notifications pushed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The warning timer fired: the enforced deadline is 30 minutes away.
    DeadlineApproaching {
        task_id: i64,
        message: String,
        at: DateTime<Utc>,
    },
    /// The enforced deadline passed without completion.
    DeadlineMissed {
        task_id: i64,
        message: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: i64,
        task_name: String,
        at: DateTime<Utc>,
    },
    /// A submitted typing speed beat every prior score.
    TypingRecord {
        wpm: u32,
        at: DateTime<Utc>,
    },
}

/// Discriminant used to key subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DeadlineApproaching,
    DeadlineMissed,
    TaskCompleted,
    TypingRecord,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::DeadlineApproaching { .. } => EventKind::DeadlineApproaching,
            Event::DeadlineMissed { .. } => EventKind::DeadlineMissed,
            Event::TaskCompleted { .. } => EventKind::TaskCompleted,
            Event::TypingRecord { .. } => EventKind::TypingRecord,
        }
    }
}

type Handler = Box<dyn Fn(&Event) + Send>;

/// Registry of callbacks keyed by event kind.
///
/// Handlers for a kind run synchronously in the order they were
/// registered. Emission never fails and returns nothing to the emitter.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<EventKind, Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one event kind.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&Event) + Send + 'static,
    {
        self.handlers.entry(kind).or_default().push(Box::new(handler));
    }

    /// Invoke every handler registered for the event's kind.
    pub fn emit(&self, event: &Event) {
        if let Some(handlers) = self.handlers.get(&event.kind()) {
            for handler in handlers {
                handler(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn completed(name: &str) -> Event {
        Event::TaskCompleted {
            task_id: 1,
            task_name: name.to_string(),
            at: Utc::now(),
        }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(EventKind::TaskCompleted, move |_| {
                seen.lock().unwrap().push(tag);
            });
        }
        bus.emit(&completed("report"));
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn handlers_only_see_their_kind() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let counter = Arc::clone(&count);
        bus.subscribe(EventKind::TypingRecord, move |_| {
            *counter.lock().unwrap() += 1;
        });
        bus.emit(&completed("report"));
        assert_eq!(*count.lock().unwrap(), 0);
        bus.emit(&Event::TypingRecord {
            wpm: 70,
            at: Utc::now(),
        });
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn emit_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        bus.emit(&completed("report"));
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let json = serde_json::to_string(&completed("report")).unwrap();
        assert!(json.contains("\"type\":\"TaskCompleted\""));
    }
}
