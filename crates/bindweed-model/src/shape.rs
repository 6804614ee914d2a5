#![forbid(unsafe_code)]

//! Closed classification of bindable value shapes.
//!
//! Every non-null [`Value`](crate::Value) has exactly one [`Shape`],
//! and every shape belongs to exactly one [`ShapeClass`]. The set is
//! closed on purpose: downstream `match`es are exhaustive, so adding a
//! shape is a compile-visible event rather than a silently-misrouted
//! runtime case.

use std::fmt;

/// The shape of a single [`Value`](crate::Value) variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
    Id,
    Ip,
    List,
    Map,
    Object,
}

/// The four structural kinds the binding engine and the reflective
/// editor distinguish. Classification is total over [`Shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeClass {
    /// Directly text-editable leaf values.
    Primitive,
    /// Ordered, index-addressed contents.
    Sequence,
    /// Key-addressed contents.
    Mapping,
    /// Named attributes reached through reflection.
    Composite,
}

impl Shape {
    /// Structural kind of this shape.
    #[must_use]
    pub fn class(self) -> ShapeClass {
        match self {
            Shape::Bool
            | Shape::Int
            | Shape::Float
            | Shape::Text
            | Shape::Timestamp
            | Shape::Id
            | Shape::Ip => ShapeClass::Primitive,
            Shape::List => ShapeClass::Sequence,
            Shape::Map => ShapeClass::Mapping,
            Shape::Object => ShapeClass::Composite,
        }
    }

    /// Whether values of this shape are edited as a single text field.
    #[must_use]
    pub fn is_primitive(self) -> bool {
        self.class() == ShapeClass::Primitive
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Bool => "bool",
            Shape::Int => "int",
            Shape::Float => "float",
            Shape::Text => "text",
            Shape::Timestamp => "timestamp",
            Shape::Id => "id",
            Shape::Ip => "ip",
            Shape::List => "list",
            Shape::Map => "map",
            Shape::Object => "object",
        };
        f.write_str(name)
    }
}
