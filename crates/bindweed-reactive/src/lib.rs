#![forbid(unsafe_code)]

//! Reactive primitives for bindweed.
//!
//! # Role in bindweed
//! `bindweed-reactive` is the notification layer. It owns the two
//! primitives everything else composes:
//!
//! - [`Notifier`]: a single-kind publish/subscribe channel with
//!   synchronous, snapshot-ordered delivery.
//! - [`ObservableList`]: an ordered, shared-handle sequence that
//!   publishes one [`ListChange`] per mutation.
//!
//! # How it fits in the system
//! The binding engine (`bindweed-sync`) subscribes to these primitives
//! and translates their events onto the opposite endpoint; the model
//! layer (`bindweed-model`) embeds `ObservableList` as its sequence
//! value and `Notifier` as the scalar change channel. Nothing in this
//! crate knows about values, shapes, or bindings.
//!
//! Single-threaded by design: handles are `Rc`-based and delivery is
//! synchronous on the caller's stack. There is no queueing and no
//! background work.

pub mod list;
pub mod notifier;

pub use list::{IndexOutOfBounds, ListChange, ObservableList};
pub use notifier::{Notifier, Subscription};
