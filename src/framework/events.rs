//! # Event Bus
//!
//! Hierarchical publish/subscribe over `.`-delimited topics.
//!
//! Listener patterns may use two wildcards:
//! - `*` matches exactly one segment (`a.*` hears `a.b`, not `a` or `a.b.c`)
//! - `**` matches zero or more segments (`a.**` hears `a`, `a.b` and `a.b.c`)
//!
//! Dispatch is synchronous and in registration order. The listener table is
//! not locked while handlers run, so a handler may subscribe or emit.

use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// A dispatched event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub topic: String,
    pub payload: Value,
}

pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Returned by [`EventBus::on`]; pass it to [`EventBus::off`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    pattern: Vec<String>,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<Vec<Listener>>,
    next_id: AtomicU64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, pattern: &str, handler: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push(Listener {
            id,
            pattern: pattern.split('.').map(str::to_owned).collect(),
            handler: Arc::new(handler),
        });
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|listener| listener.id != id);
        listeners.len() != before
    }

    /// Dispatches to every matching listener and returns how many were called.
    pub fn emit(&self, topic: &str, payload: Value) -> usize {
        let segments: Vec<&str> = topic.split('.').collect();
        let handlers: Vec<Handler> = self
            .listeners
            .read()
            .iter()
            .filter(|listener| matches(&listener.pattern, &segments))
            .map(|listener| listener.handler.clone())
            .collect();

        let event = Event {
            topic: topic.to_string(),
            payload,
        };
        trace!(topic, listeners = handlers.len(), "Emit");
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

fn matches(pattern: &[String], topic: &[&str]) -> bool {
    match (pattern.split_first(), topic.split_first()) {
        (None, None) => true,
        (Some((head, rest)), _) if head == "**" => {
            matches(rest, topic) || (!topic.is_empty() && matches(pattern, &topic[1..]))
        }
        (Some((head, rest)), Some((segment, remaining))) => {
            (head == "*" || head == segment) && matches(rest, remaining)
        }
        _ => false,
    }
}
