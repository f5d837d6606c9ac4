//! Subscription table for agent runtime notifications.
//!
//! Several executions may listen to the same event kind at once; each owns
//! only the ids it registered. Ids are never reused, so a stale id can never
//! remove somebody else's subscription.

use super::{AgentEvent, EventKind};


/// Callback invoked with each delivered event.
pub type EventCallback = Box<dyn FnMut(&AgentEvent)>;


/// Identifies one registered callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);


struct Subscription {
    id: SubscriptionId,
    kind: EventKind,
    callback: EventCallback,
}


#[derive(Default)]
pub struct EventBus {
    subscriptions: Vec<Subscription>,
    next_id: u64,
}


impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, callback: EventCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, callback });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() < before
    }

    /// Deliver `event` to every callback registered for its kind, in
    /// registration order. Returns how many callbacks ran.
    pub fn emit(&mut self, event: &AgentEvent) -> usize {
        let kind = event.kind();
        let mut delivered = 0;
        for sub in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
            (sub.callback)(event);
            delivered += 1;
        }
        delivered
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Number of live subscriptions for one kind.
    pub fn count_for(&self, kind: EventKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }
}


impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counter(hits: &Rc<Cell<u32>>) -> EventCallback {
        let hits = Rc::clone(hits);
        Box::new(move |_: &AgentEvent| hits.set(hits.get() + 1))
    }

    #[test]
    fn delivers_only_matching_kind() {
        let mut bus = EventBus::new();
        let reached = Rc::new(Cell::new(0));
        let stopped = Rc::new(Cell::new(0));
        bus.subscribe(EventKind::GoalReached, counter(&reached));
        bus.subscribe(EventKind::PathStopped, counter(&stopped));

        assert_eq!(bus.emit(&AgentEvent::GoalReached), 1);
        assert_eq!(reached.get(), 1);
        assert_eq!(stopped.get(), 0);
    }

    #[test]
    fn coexisting_subscribers_on_same_kind() {
        let mut bus = EventBus::new();
        let a = Rc::new(Cell::new(0));
        let b = Rc::new(Cell::new(0));
        let id_a = bus.subscribe(EventKind::GoalUpdated, counter(&a));
        bus.subscribe(EventKind::GoalUpdated, counter(&b));

        bus.emit(&AgentEvent::GoalUpdated);
        assert!(bus.unsubscribe(id_a));
        bus.emit(&AgentEvent::GoalUpdated);

        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(bus.count_for(EventKind::GoalUpdated), 1);
    }

    #[test]
    fn unsubscribe_twice_is_false() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(EventKind::PathUpdate, Box::new(|_: &AgentEvent| {}));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut bus = EventBus::new();
        let first = bus.subscribe(EventKind::GoalReached, Box::new(|_: &AgentEvent| {}));
        bus.unsubscribe(first);
        let second = bus.subscribe(EventKind::GoalReached, Box::new(|_: &AgentEvent| {}));
        assert_ne!(first, second);
        assert!(!bus.unsubscribe(first));
        assert_eq!(bus.len(), 1);
    }
}
