//! Session-invalidation events emitted by the interceptor.
//!
//! SYSTEM CONTEXT
//! ==============
//! The interceptor never touches storage or navigation. On a `401` it emits a
//! [`SessionInvalidated`] event here, and the app root (or a test) subscribes
//! and performs teardown and the redirect to `/login`.

#[cfg(test)]
#[path = "events_test.rs"]
mod events_test;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidationReason {
    /// A session-bound request came back `401`.
    Unauthorized,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInvalidated {
    pub reason: InvalidationReason,
    /// API path of the request that triggered the event.
    pub path: String,
}

/// Handle returned by [`InvalidationHub::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&SessionInvalidated)>;

/// Fan-out of invalidation events. Clones share subscribers.
#[derive(Clone, Default)]
pub struct InvalidationHub {
    listeners: Rc<RefCell<Vec<(SubscriptionId, Listener)>>>,
    next_id: Rc<Cell<u64>>,
}

impl InvalidationHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionInvalidated) + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(sub, _)| *sub != id);
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver `event` to every current subscriber.
    ///
    /// Listeners are snapshotted first, so they may subscribe or unsubscribe
    /// while being notified.
    pub fn emit(&self, event: &SessionInvalidated) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        log::warn!(
            "session invalidated: reason={:?} path={} subscribers={}",
            event.reason,
            event.path,
            listeners.len()
        );
        for listener in listeners {
            listener(event);
        }
    }
}

impl std::fmt::Debug for InvalidationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationHub")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
