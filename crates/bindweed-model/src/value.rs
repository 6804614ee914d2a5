#![forbid(unsafe_code)]

//! The closed tagged union bindable attributes are read and written as.
//!
//! # Design
//!
//! [`Value`] carries every shape the engine can bind: seven primitive
//! leaves, an observable sequence, an insertion-ordered mapping, and a
//! reflective composite. `Clone` is cheap by construction: primitives
//! copy, containers and composites clone the *handle*, so a cloned
//! value observes the same underlying contents.
//!
//! # Invariants
//!
//! 1. `Null` is shapeless: [`Value::shape`] returns `None` for it and
//!    `Some` for every other variant.
//! 2. Equality is structural for primitives and *identity* for
//!    containers and composites. Two distinct lists with equal contents
//!    compare unequal; a handle always equals its clone.
//! 3. Cloning never deep-copies container contents.

use std::cell::RefCell;
use std::net::IpAddr;
use std::rc::Rc;

use bindweed_reactive::ObservableList;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::reflect::ObjectHandle;
use crate::shape::{Shape, ShapeClass};

/// A dynamically shaped value. See the module docs for equality and
/// cloning semantics.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Id(Uuid),
    Ip(IpAddr),
    List(ObservableList<Value>),
    Map(MapHandle),
    Object(ObjectHandle),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Id(a), Value::Id(b)) => a == b,
            (Value::Ip(a), Value::Ip(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.same_list(b),
            (Value::Map(a), Value::Map(b)) => a.same_map(b),
            (Value::Object(a), Value::Object(b)) => a.same_object(b),
            _ => false,
        }
    }
}

impl Value {
    /// Shape of this value, or `None` for `Null`.
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(Shape::Bool),
            Value::Int(_) => Some(Shape::Int),
            Value::Float(_) => Some(Shape::Float),
            Value::Text(_) => Some(Shape::Text),
            Value::Timestamp(_) => Some(Shape::Timestamp),
            Value::Id(_) => Some(Shape::Id),
            Value::Ip(_) => Some(Shape::Ip),
            Value::List(_) => Some(Shape::List),
            Value::Map(_) => Some(Shape::Map),
            Value::Object(_) => Some(Shape::Object),
        }
    }

    /// Structural kind of this value, or `None` for `Null`.
    #[must_use]
    pub fn class(&self) -> Option<ShapeClass> {
        self.shape().map(Shape::class)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            Value::Id(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_ip(&self) -> Option<IpAddr> {
        match self {
            Value::Ip(ip) => Some(*ip),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&ObservableList<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&MapHandle> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::Id(id)
    }
}

impl From<IpAddr> for Value {
    fn from(ip: IpAddr) -> Self {
        Value::Ip(ip)
    }
}

impl From<ObservableList<Value>> for Value {
    fn from(list: ObservableList<Value>) -> Self {
        Value::List(list)
    }
}

impl From<MapHandle> for Value {
    fn from(map: MapHandle) -> Self {
        Value::Map(map)
    }
}

impl From<ObjectHandle> for Value {
    fn from(obj: ObjectHandle) -> Self {
        Value::Object(obj)
    }
}

// ---------------------------------------------------------------------------
// MapHandle
// ---------------------------------------------------------------------------

/// Shared handle to an insertion-ordered string-keyed mapping.
///
/// Iteration order is the order keys were first inserted; editors rely
/// on that order being stable across reads.
pub struct MapHandle {
    entries: Rc<RefCell<IndexMap<String, Value>>>,
}

impl Clone for MapHandle {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl Default for MapHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.borrow().iter()).finish()
    }
}

impl MapHandle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(IndexMap::new())),
        }
    }

    /// Insert or overwrite `key`, returning the previous value if any.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.borrow_mut().insert(key.into(), value)
    }

    /// Clone of the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    /// Remove `key`, returning its value if it was present. Later keys
    /// keep their relative order.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.entries.borrow_mut().shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Whether both handles refer to the same mapping.
    #[must_use]
    pub fn same_map(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl FromIterator<(String, Value)> for MapHandle {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let map = Self::new();
        {
            let mut entries = map.entries.borrow_mut();
            for (key, value) in iter {
                entries.insert(key, value);
            }
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
