//! Subscription lists for engine events.
//!
//! Both engines publish their state changes to any number of subscribers
//! instead of exposing single overwritable callbacks. A subscriber is added
//! with `subscribe()` and removed with the returned [`SubscriptionId`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__subscription_{}", self.0)
    }
}

/// A subscriber callback.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered list of subscribers for events of type `E`.
pub struct Listeners<E> {
    entries: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E> Listeners<E> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a subscriber, returning its id.
    pub fn subscribe(&mut self, listener: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.entries.push((id, Arc::new(listener)));
        id
    }

    /// Remove a subscriber. Returns false if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clone the current subscribers so they can be called without holding
    /// whatever lock guards this list.
    pub fn snapshot(&self) -> Vec<Listener<E>> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    /// Deliver an event to every subscriber in subscription order.
    pub fn emit(&self, event: &E) {
        for (_, listener) in &self.entries {
            listener(event);
        }
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_emit_in_subscription_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::<u32>::new();

        let first = Arc::clone(&seen);
        listeners.subscribe(move |e| first.lock().unwrap().push(("first", *e)));
        let second = Arc::clone(&seen);
        listeners.subscribe(move |e| second.lock().unwrap().push(("second", *e)));

        listeners.emit(&7);
        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut listeners = Listeners::<()>::new();
        let id = listeners.subscribe(|_| {});
        assert_eq!(listeners.len(), 1);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert!(listeners.is_empty());
    }
}
