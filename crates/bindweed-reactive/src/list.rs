#![forbid(unsafe_code)]

//! Ordered, shared-handle sequence with granular change notification.
//!
//! # Design
//!
//! [`ObservableList<T>`] owns an ordered sequence behind a shared handle
//! (`Rc<RefCell<..>>`; cloning the list clones the handle, not the
//! contents). Every public mutation performs the structural change
//! first, then publishes exactly one [`ListChange`] describing it, then
//! returns. Element order is semantically meaningful: it is the order a
//! bound or rendered view displays.
//!
//! # Invariants
//!
//! 1. One mutation, one notification, published after the change is
//!    already observable through the handle.
//! 2. Replaying the published `ListChange` stream over an empty vector
//!    reproduces the list's contents at every point.
//! 3. A failed operation ([`IndexOutOfBounds`]) mutates nothing and
//!    publishes nothing.
//! 4. [`remove_item`](ObservableList::remove_item) on an absent value is
//!    a no-op: no mutation, no notification.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `IndexOutOfBounds` | index past the end | operation rejected, no event |
//! | Handler panic | subscriber bug | propagates to the mutating caller |
//! | Re-entrant mutation | handler mutates the same list | permitted; runs after the triggering mutation completed |

use std::cell::RefCell;
use std::rc::Rc;

use crate::notifier::{Notifier, Subscription};

/// A discrete, minimal description of one mutation to an
/// [`ObservableList`]. Carries enough to apply an equivalent mutation
/// elsewhere without re-deriving it by diffing full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListChange<T> {
    /// `value` was inserted at `index`; later elements shifted right.
    Added { index: usize, value: T },
    /// `value` was removed from `index`; later elements shifted left.
    Removed { index: usize, value: T },
    /// The element at `index` changed from `old` to `new`.
    Replaced { index: usize, old: T, new: T },
    /// The whole contents were replaced by `items` (empty for a clear).
    Reset { items: Vec<T> },
}

/// A list operation referenced an index past the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    pub index: usize,
    pub len: usize,
}

impl std::fmt::Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index {} out of bounds for list of length {}",
            self.index, self.len
        )
    }
}

impl std::error::Error for IndexOutOfBounds {}

/// An ordered, mutable sequence that reports every structural change as
/// a discrete event.
///
/// Cloning produces a second handle to the **same** sequence; all
/// handles see the same contents and share the same subscriber set.
pub struct ObservableList<T> {
    items: Rc<RefCell<Vec<T>>>,
    changes: Notifier<ListChange<T>>,
}

// Manual Clone: shares the same storage and channel.
impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
            changes: self.changes.clone(),
        }
    }
}

impl<T> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &*self.items.borrow())
            .finish()
    }
}

impl<T> ObservableList<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Rc::new(RefCell::new(Vec::new())),
            changes: Notifier::new(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the list holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Whether both handles refer to the same sequence.
    #[must_use]
    pub fn same_list(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    /// Number of registered subscribers, including dropped ones not yet
    /// pruned by a publish.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.changes.subscriber_count()
    }
}

impl<T: Clone + PartialEq + 'static> ObservableList<T> {
    /// Append `value` at the end.
    pub fn push(&self, value: T) {
        let index = {
            let mut items = self.items.borrow_mut();
            items.push(value.clone());
            items.len() - 1
        };
        self.changes.publish(&ListChange::Added { index, value });
    }

    /// Insert `value` at `index` (`index == len` appends).
    pub fn insert(&self, index: usize, value: T) -> Result<(), IndexOutOfBounds> {
        {
            let mut items = self.items.borrow_mut();
            if index > items.len() {
                return Err(IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, value.clone());
        }
        self.changes.publish(&ListChange::Added { index, value });
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove(&self, index: usize) -> Result<T, IndexOutOfBounds> {
        let value = {
            let mut items = self.items.borrow_mut();
            if index >= items.len() {
                return Err(IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            items.remove(index)
        };
        self.changes.publish(&ListChange::Removed {
            index,
            value: value.clone(),
        });
        Ok(value)
    }

    /// Remove the first element equal to `item`. Returns whether
    /// anything was removed; an absent value is a silent no-op.
    pub fn remove_item(&self, item: &T) -> bool {
        match self.index_of(item) {
            // Index came from the list under the same borrow discipline,
            // so the remove cannot fail.
            Some(index) => self.remove(index).is_ok(),
            None => false,
        }
    }

    /// Replace the element at `index`, returning the previous value.
    pub fn replace(&self, index: usize, value: T) -> Result<T, IndexOutOfBounds> {
        let old = {
            let mut items = self.items.borrow_mut();
            if index >= items.len() {
                return Err(IndexOutOfBounds {
                    index,
                    len: items.len(),
                });
            }
            std::mem::replace(&mut items[index], value.clone())
        };
        self.changes.publish(&ListChange::Replaced {
            index,
            old: old.clone(),
            new: value,
        });
        Ok(old)
    }

    /// Replace the whole contents, publishing a single
    /// [`ListChange::Reset`] carrying the new contents.
    pub fn reset(&self, items: Vec<T>) {
        *self.items.borrow_mut() = items.clone();
        self.changes.publish(&ListChange::Reset { items });
    }

    /// Remove all elements. Publishes `Reset` with empty contents.
    pub fn clear(&self) {
        self.reset(Vec::new());
    }

    /// Clone of the element at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    /// Index of the first element equal to `item`.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.items.borrow().iter().position(|v| v == item)
    }

    /// Whether any element equals `item`.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.index_of(item).is_some()
    }

    /// Snapshot of the current contents.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    /// Subscribe to change notifications. Every mutation publishes one
    /// [`ListChange`] after the mutation is already visible.
    pub fn subscribe(&self, handler: impl Fn(&ListChange<T>) + 'static) -> Subscription {
        self.changes.subscribe(handler)
    }
}

impl<T: Clone + PartialEq + 'static> From<Vec<T>> for ObservableList<T> {
    fn from(items: Vec<T>) -> Self {
        let list = Self::new();
        *list.items.borrow_mut() = items;
        list
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
