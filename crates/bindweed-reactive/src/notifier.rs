#![forbid(unsafe_code)]

//! Publish/subscribe channel for a single notification kind.
//!
//! # Design
//!
//! [`Notifier<E>`] is a shared handle (`Rc<RefCell<..>>`) over a list of
//! subscriber callbacks. [`publish`](Notifier::publish) delivers the
//! event synchronously, in subscription order, to a **snapshot** of the
//! subscriber set taken at the start of the call: a handler that
//! subscribes during delivery is not invoked in that pass, and a
//! [`Subscription`] dropped during delivery still receives that pass.
//!
//! Handlers are stored as `Weak` references; the strong reference lives
//! in the `Subscription` guard handed back by `subscribe`. Dead entries
//! are pruned lazily at the start of each publish.
//!
//! # Invariants
//!
//! 1. Delivery order is subscription order.
//! 2. The subscriber set for one publish pass is fixed when the pass
//!    starts.
//! 3. Re-entrant `publish` (a handler publishing on the same notifier)
//!    is permitted; no recursion limit is imposed here. Cycle-breaking
//!    is the caller's job (the binding engine uses a re-entrancy flag).
//! 4. After a `Subscription` is dropped, its handler runs at most once
//!    more (if a pass was already in flight), never again afterwards.
//!
//! # Failure Modes
//!
//! - **Leaked guard**: a `Subscription` stored forever keeps its handler
//!   alive forever. Scope guards to the lifetime that needs the events.
//! - **Borrowing inside handlers**: handlers run while no internal
//!   borrow is held, so they may freely subscribe, unsubscribe, or
//!   publish. Borrows of *caller* state are the caller's concern.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Handler storage: strong `Rc` in the guard, `Weak` in the notifier.
type HandlerRc<E> = Rc<dyn Fn(&E)>;
type HandlerWeak<E> = Weak<dyn Fn(&E)>;

struct NotifierInner<E> {
    handlers: Vec<HandlerWeak<E>>,
}

/// A synchronous publish/subscribe channel for events of type `E`.
///
/// Cloning a `Notifier` produces a new handle to the **same** channel:
/// both handles share the subscriber set.
pub struct Notifier<E> {
    inner: Rc<RefCell<NotifierInner<E>>>,
}

// Manual Clone: shares the same Rc.
impl<E> Clone for Notifier<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscriber_count", &self.inner.borrow().handlers.len())
            .finish()
    }
}

impl<E> Notifier<E> {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(NotifierInner {
                handlers: Vec::new(),
            })),
        }
    }

    /// Whether both handles refer to the same channel.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of registered subscribers, including dropped ones not yet
    /// pruned by a publish.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

impl<E: 'static> Notifier<E> {
    /// Subscribe to events. The handler is invoked with a reference to
    /// each published event until the returned [`Subscription`] guard is
    /// dropped.
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Subscription {
        let strong: HandlerRc<E> = Rc::new(handler);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().handlers.push(weak);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Deliver `event` to a snapshot of the current subscribers, in
    /// subscription order, pruning dead entries first.
    ///
    /// Delivery is synchronous; this returns after every handler in the
    /// snapshot has run.
    pub fn publish(&self, event: &E) {
        // Upgrade the snapshot inside the borrow, call handlers outside
        // of it so they can subscribe/unsubscribe/publish re-entrantly.
        let snapshot: Vec<HandlerRc<E>> = {
            let mut inner = self.inner.borrow_mut();
            inner.handlers.retain(|w| w.strong_count() > 0);
            inner.handlers.iter().filter_map(Weak::upgrade).collect()
        };
        for handler in &snapshot {
            handler(event);
        }
    }
}

/// RAII guard for a subscribed handler.
///
/// Dropping the guard drops the only strong reference to the handler;
/// the notifier's `Weak` entry then fails to upgrade and is pruned on
/// the next publish.
pub struct Subscription {
    /// Type-erased strong reference keeping the handler `Rc` alive.
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
