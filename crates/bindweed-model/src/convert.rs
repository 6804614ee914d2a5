#![forbid(unsafe_code)]

//! Text conversion and shape coercion.
//!
//! # Design
//!
//! A [`TextConverter`] turns one shape of [`Value`] into display text
//! and back. The [`ConverterRegistry`] maps shapes to converters and is
//! passed in wherever conversion happens, so a host can override or
//! extend conversions without touching the engine. Shape coercion
//! ([`ConverterRegistry::coerce`]) is defined *through* text: a value
//! crosses from one primitive shape to another by rendering and
//! re-parsing, which keeps exactly one conversion rule per shape.
//!
//! # Invariants
//!
//! 1. Rendering is total: [`ConverterRegistry::to_text`] produces text
//!    for every value, falling back to a generic rendering for shapes
//!    with no registered converter.
//! 2. Parsing is strict: [`ConverterRegistry::parse`] answers `None`
//!    for unparseable text and for shapes with no registered converter.
//!    The fallback renders but never parses.
//! 3. Coercion never invents structure: containers and composites only
//!    pass through unchanged to their own shape; `Null` passes to any.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shape::Shape;
use crate::value::Value;

/// Converts one shape of value to and from display text.
pub trait TextConverter {
    /// Render `value` as display text.
    fn to_text(&self, value: &Value) -> String;

    /// Parse `text` into a value of this converter's shape, or `None`
    /// if the text does not denote one.
    fn from_text(&self, text: &str) -> Option<Value>;
}

/// Generic rendering for values with no registered converter. Null is
/// empty text; containers and composites render as a summary, which is
/// deliberately not round-trippable.
fn fallback_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(x) => x.to_string(),
        Value::Text(s) => s.clone(),
        Value::Timestamp(t) => t.to_rfc3339(),
        Value::Id(id) => id.to_string(),
        Value::Ip(ip) => ip.to_string(),
        Value::List(list) => format!("<list ({})>", list.len()),
        Value::Map(map) => format!("<map ({})>", map.len()),
        Value::Object(obj) => format!("<{}>", obj.type_name()),
    }
}

// ---------------------------------------------------------------------------
// Built-in converters
// ---------------------------------------------------------------------------

/// `true`/`false`, parsed case-insensitively.
pub struct BoolConverter;

impl TextConverter for BoolConverter {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Bool(b) => b.to_string(),
            other => fallback_text(other),
        }
    }

    fn from_text(&self, text: &str) -> Option<Value> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("true") {
            Some(Value::Bool(true))
        } else if text.eq_ignore_ascii_case("false") {
            Some(Value::Bool(false))
        } else {
            None
        }
    }
}

/// Decimal integers.
pub struct IntConverter;

impl TextConverter for IntConverter {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Int(n) => n.to_string(),
            other => fallback_text(other),
        }
    }

    fn from_text(&self, text: &str) -> Option<Value> {
        text.trim().parse::<i64>().ok().map(Value::Int)
    }
}

/// Decimal floating point.
pub struct FloatConverter;

impl TextConverter for FloatConverter {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Float(x) => x.to_string(),
            other => fallback_text(other),
        }
    }

    fn from_text(&self, text: &str) -> Option<Value> {
        text.trim().parse::<f64>().ok().map(Value::Float)
    }
}

/// Verbatim text. The only converter that does not trim: leading and
/// trailing whitespace in a text attribute is user data.
pub struct StringConverter;

impl TextConverter for StringConverter {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Text(s) => s.clone(),
            other => fallback_text(other),
        }
    }

    fn from_text(&self, text: &str) -> Option<Value> {
        Some(Value::Text(text.to_string()))
    }
}

/// RFC 3339 timestamps, normalized to UTC on parse.
pub struct TimestampConverter;

impl TextConverter for TimestampConverter {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Timestamp(t) => t.to_rfc3339(),
            other => fallback_text(other),
        }
    }

    fn from_text(&self, text: &str) -> Option<Value> {
        DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|t| Value::Timestamp(t.with_timezone(&Utc)))
    }
}

/// Hyphenated UUIDs.
pub struct IdConverter;

impl TextConverter for IdConverter {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Id(id) => id.to_string(),
            other => fallback_text(other),
        }
    }

    fn from_text(&self, text: &str) -> Option<Value> {
        Uuid::parse_str(text.trim()).ok().map(Value::Id)
    }
}

/// IPv4 or IPv6 addresses.
pub struct IpConverter;

impl TextConverter for IpConverter {
    fn to_text(&self, value: &Value) -> String {
        match value {
            Value::Ip(ip) => ip.to_string(),
            other => fallback_text(other),
        }
    }

    fn from_text(&self, text: &str) -> Option<Value> {
        text.trim().parse::<IpAddr>().ok().map(Value::Ip)
    }
}

// ---------------------------------------------------------------------------
// ConverterRegistry
// ---------------------------------------------------------------------------

/// Shape-indexed converter lookup, passed into the binding engine and
/// the field enumerator rather than reached for globally.
pub struct ConverterRegistry {
    converters: HashMap<Shape, Box<dyn TextConverter>>,
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("registered", &self.converters.len())
            .finish()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ConverterRegistry {
    /// An empty registry. Rendering falls back to generic text for
    /// every shape; parsing always fails.
    #[must_use]
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
        }
    }

    /// A registry with the built-in converter for each primitive shape.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Shape::Bool, BoolConverter);
        registry.register(Shape::Int, IntConverter);
        registry.register(Shape::Float, FloatConverter);
        registry.register(Shape::Text, StringConverter);
        registry.register(Shape::Timestamp, TimestampConverter);
        registry.register(Shape::Id, IdConverter);
        registry.register(Shape::Ip, IpConverter);
        registry
    }

    /// Install `converter` for `shape`, replacing any existing one.
    pub fn register(&mut self, shape: Shape, converter: impl TextConverter + 'static) {
        self.converters.insert(shape, Box::new(converter));
    }

    /// The converter registered for `shape`, if any.
    #[must_use]
    pub fn converter_for(&self, shape: Shape) -> Option<&dyn TextConverter> {
        self.converters.get(&shape).map(Box::as_ref)
    }

    /// Render `value` as display text. Total: shapes without a
    /// registered converter use the generic fallback rendering.
    #[must_use]
    pub fn to_text(&self, value: &Value) -> String {
        match value.shape().and_then(|shape| self.converter_for(shape)) {
            Some(converter) => converter.to_text(value),
            None => fallback_text(value),
        }
    }

    /// Parse `text` into a value of `shape`. `None` when the text does
    /// not denote one or no converter is registered for the shape.
    #[must_use]
    pub fn parse(&self, shape: Shape, text: &str) -> Option<Value> {
        self.converter_for(shape)?.from_text(text)
    }

    /// Fit `value` to `want`.
    ///
    /// - `Null` passes to any shape unchanged.
    /// - A value already of shape `want` passes through as a clone
    ///   (for containers and composites, the same handle).
    /// - Primitive-to-primitive crossings go through text: render with
    ///   the value's converter, parse with `want`'s.
    /// - Everything else answers `None`.
    #[must_use]
    pub fn coerce(&self, value: &Value, want: Shape) -> Option<Value> {
        let Some(have) = value.shape() else {
            return Some(Value::Null);
        };
        if have == want {
            return Some(value.clone());
        }
        if have.is_primitive() && want.is_primitive() {
            return self.parse(want, &self.to_text(value));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
