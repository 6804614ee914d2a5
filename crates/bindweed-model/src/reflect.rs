#![forbid(unsafe_code)]

//! Uniform, name-based attribute access for application objects.
//!
//! # Design
//!
//! [`Reflect`] is the seam between the binding engine and application
//! state. An implementor names its attributes, declares their shapes,
//! and serves reads and writes as [`Value`]s; it never learns what is
//! bound to it. [`ObjectHandle`] is the shared, clonable handle the
//! engine and editors hold (`Rc<RefCell<dyn Reflect>>` underneath), so
//! many consumers can address one object without ownership games.
//!
//! # Invariants
//!
//! 1. [`Reflect::shape_of`] answers `Some` for exactly the names in
//!    [`Reflect::attribute_names`].
//! 2. A successful [`Reflect::set`] is observable through the next
//!    [`Reflect::get`] before any change notification fires.
//! 3. Implementors that expose [`Reflect::changes`] publish one
//!    [`PropertyChange`] per successful, observable `set`, carrying the
//!    attribute name with the old and new values.
//! 4. A failed `set` ([`AccessError`]) mutates nothing and publishes
//!    nothing.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `UnknownAttribute` | name not in `attribute_names` | read/write rejected |
//! | `ReadOnly` | attribute has no setter | write rejected |
//! | `Incompatible` | value shape does not fit the attribute | write rejected |
//! | Re-borrow panic | a change handler calls back into the same object | panics; handlers must not re-enter the publishing object |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bindweed_reactive::{Notifier, ObservableList};

use crate::shape::Shape;
use crate::value::{MapHandle, Value};

/// One observed attribute mutation, published by [`Reflect`]
/// implementors that expose a change channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub property: &'static str,
    pub old: Value,
    pub new: Value,
}

/// Why an attribute read or write was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessError {
    /// No attribute with this name.
    UnknownAttribute { attribute: String },
    /// The attribute can be read but not written.
    ReadOnly { attribute: String },
    /// The written value's shape does not fit the attribute.
    Incompatible {
        attribute: String,
        expected: Shape,
        got: Option<Shape>,
    },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::UnknownAttribute { attribute } => {
                write!(f, "unknown attribute `{attribute}`")
            }
            AccessError::ReadOnly { attribute } => {
                write!(f, "attribute `{attribute}` is read-only")
            }
            AccessError::Incompatible {
                attribute,
                expected,
                got,
            } => match got {
                Some(got) => write!(
                    f,
                    "attribute `{attribute}` expects {expected}, got {got}"
                ),
                None => write!(f, "attribute `{attribute}` expects {expected}, got null"),
            },
        }
    }
}

impl std::error::Error for AccessError {}

/// Name-based attribute access.
///
/// Implement this once per bindable application type. The engine only
/// ever talks to objects through this trait (held in an
/// [`ObjectHandle`]); nothing here knows about bindings or editors.
pub trait Reflect {
    /// Stable name of the concrete type, for labels and diagnostics.
    fn type_name(&self) -> &'static str;

    /// Names of every addressable attribute, in declaration order.
    fn attribute_names(&self) -> Vec<&'static str>;

    /// Declared shape of `name`, or `None` for unknown names.
    fn shape_of(&self, name: &str) -> Option<Shape>;

    /// Current value of `name`.
    fn get(&self, name: &str) -> Result<Value, AccessError>;

    /// Write `value` to `name`. Implementors exposing a change channel
    /// publish one [`PropertyChange`] per successful set, after the new
    /// value is observable.
    fn set(&mut self, name: &str, value: Value) -> Result<(), AccessError>;

    /// Channel publishing one event per successful `set`, or `None` if
    /// this type does not notify. The returned notifier is a handle to
    /// the implementor's own channel, not a fresh one.
    fn changes(&self) -> Option<Notifier<PropertyChange>> {
        None
    }

    /// A fresh default value suitable for `name` when its current value
    /// is null and a consumer needs something to descend into. The
    /// default builds empty containers for container shapes and
    /// declines composites, which need type knowledge this trait does
    /// not have.
    fn default_for(&self, name: &str) -> Option<Value> {
        match self.shape_of(name)? {
            Shape::List => Some(Value::List(ObservableList::new())),
            Shape::Map => Some(Value::Map(MapHandle::new())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ObjectHandle
// ---------------------------------------------------------------------------

/// Shared handle to a reflective object.
///
/// Clones address the same object. Equality (via
/// [`same_object`](ObjectHandle::same_object)) is handle identity, in
/// line with [`Value`]'s container equality.
pub struct ObjectHandle {
    inner: Rc<RefCell<dyn Reflect>>,
}

impl Clone for ObjectHandle {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHandle<{}>", self.type_name())
    }
}

impl ObjectHandle {
    /// Wrap an owned object.
    #[must_use]
    pub fn new(object: impl Reflect + 'static) -> Self {
        let inner: Rc<RefCell<dyn Reflect>> = Rc::new(RefCell::new(object));
        Self { inner }
    }

    /// Wrap an object already shared elsewhere. The caller keeps its
    /// typed `Rc` and sees every mutation made through the handle.
    #[must_use]
    pub fn from_rc(inner: Rc<RefCell<dyn Reflect>>) -> Self {
        Self { inner }
    }

    /// Whether both handles address the same object.
    #[must_use]
    pub fn same_object(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.borrow().type_name()
    }

    #[must_use]
    pub fn attribute_names(&self) -> Vec<&'static str> {
        self.inner.borrow().attribute_names()
    }

    #[must_use]
    pub fn shape_of(&self, name: &str) -> Option<Shape> {
        self.inner.borrow().shape_of(name)
    }

    pub fn get(&self, name: &str) -> Result<Value, AccessError> {
        self.inner.borrow().get(name)
    }

    /// Write through the handle. The object stays mutably borrowed
    /// while its change notification runs, so handlers reached from
    /// here must not call back into this object.
    pub fn set(&self, name: &str, value: Value) -> Result<(), AccessError> {
        self.inner.borrow_mut().set(name, value)
    }

    #[must_use]
    pub fn changes(&self) -> Option<Notifier<PropertyChange>> {
        self.inner.borrow().changes()
    }

    #[must_use]
    pub fn default_for(&self, name: &str) -> Option<Value> {
        self.inner.borrow().default_for(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
