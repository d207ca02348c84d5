//! # void_event - Emitter-owned Signals
//!
//! Synchronous observer primitive used by gameplay containers:
//! - Each emitter owns its `Signal`s, so dropping the emitter drops every
//!   subscription it holds
//! - Subscriptions are released explicitly through their `SubscriberId`
//! - Priority-based delivery order
//!
//! Delivery is immediate and runs on the caller's thread. There is no queue.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handler priority
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Normal
    }
}

/// Handler function type
pub type Handler<T> = Box<dyn Fn(&T) + Send + Sync>;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

impl SubscriberId {
    fn next() -> Self {
        // Unique across every signal, so an id can never release a handler
        // on the wrong emitter.
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A list of callbacks owned by the object that emits them
pub struct Signal<T: ?Sized> {
    handlers: Vec<(SubscriberId, Priority, Handler<T>)>,
}

impl<T: ?Sized> Signal<T> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Subscribe a handler
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_with_priority(handler, Priority::Normal)
    }

    /// Subscribe with priority
    pub fn subscribe_with_priority<F>(&mut self, handler: F, priority: Priority) -> SubscriberId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = SubscriberId::next();
        self.handlers.push((id, priority, Box::new(handler)));

        // Higher priority first; equal priorities keep subscription order
        self.handlers.sort_by(|a, b| b.1.cmp(&a.1));

        id
    }

    /// Unsubscribe. Returns false if the id was not subscribed here.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub_id, _, _)| *sub_id != id);
        self.handlers.len() != before
    }

    /// Drop every subscription
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Deliver a value to every handler
    pub fn emit(&self, value: &T) {
        for (_, _, handler) in &self.handlers {
            handler(value);
        }
    }

    /// Number of subscribers
    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Check if nobody is listening
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T: ?Sized> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

/// Prelude
pub mod prelude {
    pub use crate::{Handler, Priority, Signal, SubscriberId};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;

    struct TestEvent(i32);

    #[test]
    fn test_signal_emit() {
        let mut signal: Signal<TestEvent> = Signal::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        signal.subscribe(move |e: &TestEvent| {
            counter_clone.fetch_add(e.0 as u32, Ordering::SeqCst);
        });

        signal.emit(&TestEvent(2));
        signal.emit(&TestEvent(3));

        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_unsubscribe() {
        let mut signal: Signal<TestEvent> = Signal::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let id = signal.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        assert!(signal.is_empty());

        signal.emit(&TestEvent(1));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ids_are_unique_across_signals() {
        let mut a: Signal<TestEvent> = Signal::new();
        let mut b: Signal<TestEvent> = Signal::new();

        let id_a = a.subscribe(|_| {});
        b.subscribe(|_| {});

        assert!(!b.unsubscribe(id_a));
        assert_eq!(b.subscriber_count(), 1);
    }

    #[test]
    fn test_priority() {
        let mut signal: Signal<TestEvent> = Signal::new();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let order1 = order.clone();
        let order2 = order.clone();

        signal.subscribe_with_priority(
            move |e: &TestEvent| {
                order1.lock().push(("low", e.0));
            },
            Priority::Low,
        );

        signal.subscribe_with_priority(
            move |e: &TestEvent| {
                order2.lock().push(("high", e.0));
            },
            Priority::High,
        );

        signal.emit(&TestEvent(42));

        let received = order.lock();
        assert_eq!(received[0].0, "high");
        assert_eq!(received[1].0, "low");
    }

    #[test]
    fn test_unsized_payload() {
        let mut signal: Signal<str> = Signal::new();
        let seen = Arc::new(parking_lot::Mutex::new(String::new()));
        let seen_clone = seen.clone();

        signal.subscribe(move |s: &str| seen_clone.lock().push_str(s));
        signal.emit("potion");

        assert_eq!(seen.lock().as_str(), "potion");
    }
}
