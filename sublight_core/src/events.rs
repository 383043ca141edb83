//! Typed observer lists.
//!
//! The original engine broadcast state changes through dynamic delegates.
//! Here each event kind gets an explicit subscriber list, invoked
//! synchronously and in subscription order right after the triggering
//! mutation, so downstream bookkeeping observes every transition exactly
//! once and in a deterministic order.

/// Subscribers for one event kind.
pub struct Observers<E> {
    subscribers: Vec<Box<dyn FnMut(&E)>>,
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }
}

impl<E> Observers<E> {
    pub fn subscribe(&mut self, observer: impl FnMut(&E) + 'static) {
        self.subscribers.push(Box::new(observer));
    }

    pub fn emit(&mut self, event: &E) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }
}

impl<E> core::fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
