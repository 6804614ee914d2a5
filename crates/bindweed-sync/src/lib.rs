#![forbid(unsafe_code)]

//! Live bindings and reflective field enumeration.
//!
//! # Role in bindweed
//!
//! This crate is the engine layer: it connects two reflective objects
//! so that attribute changes on one are mirrored onto the other
//! ([`Binding`]), and it flattens an arbitrary object graph into
//! paginated, keyboard-addressable editing fields
//! ([`FieldEnumerator`]).
//!
//! Everything here is single-threaded and synchronous. Propagation
//! happens on the mutating caller's stack; the only shared state is
//! `Rc`-held handles from `bindweed-reactive` and `bindweed-model`.
//!
//! # How it fits in the system
//!
//! A host (widget tree, editor window) owns `Binding` values and a
//! `FieldEnumerator`. Application objects implement
//! [`Reflect`](bindweed_model::Reflect) and expose
//! [`ObservableList`](bindweed_reactive::ObservableList) attributes;
//! they never see the engine.

pub mod binding;
pub mod fields;

pub use binding::{BindError, Binding, BindingMode, Side};
pub use fields::{DEFAULT_PAGE_SIZE, Field, FieldEnumerator, FieldSet};
