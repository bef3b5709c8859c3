use crate::events::{EngineEvent, EventKind};

/// Error type listeners may surface; it is logged, never propagated.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Event handler callback. Runs synchronously at the publish site.
pub type Handler = Box<dyn FnMut(&EngineEvent) -> Result<(), ListenerError> + Send>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    /// None subscribes to every event kind.
    filter: Option<EventKind>,
    handler: Handler,
}

/// Typed publish/subscribe fan-out, one instance per engine.
///
/// Handlers are invoked in subscription order. A handler returning an
/// error is logged and does not stop the remaining handlers, nor does it
/// reach the publishing operation — state mutations have already
/// committed by the time listeners run.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to a single event kind.
    pub fn subscribe(&mut self, kind: EventKind, handler: Handler) -> SubscriptionId {
        self.push(Some(kind), handler)
    }

    /// Subscribe a handler to every event.
    pub fn subscribe_all(&mut self, handler: Handler) -> SubscriptionId {
        self.push(None, handler)
    }

    fn push(&mut self, filter: Option<EventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            filter,
            handler,
        });
        id
    }

    /// Remove a subscription. Returns false if the id was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Deliver an event to every matching handler in subscription order.
    pub fn publish(&mut self, event: &EngineEvent) {
        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.filter.is_none_or(|f| f == kind)
                && let Err(e) = (sub.handler)(event)
            {
                tracing::error!(event = %kind, error = %e, "event listener failed");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}
