#![forbid(unsafe_code)]

//! Dynamic value model, attribute reflection, and text coercion.
//!
//! # Role in bindweed
//!
//! This crate defines the vocabulary the binding engine speaks:
//!
//! - [`Value`] is the closed tagged union every bindable attribute is
//!   read and written as, with [`Shape`] naming each variant and
//!   [`ShapeClass`] grouping shapes into the four structural kinds the
//!   engine cares about (primitive, sequence, mapping, composite).
//! - [`Reflect`] is the uniform accessor surface an application object
//!   implements so bindings and editors can enumerate, read, and write
//!   its attributes by name, and [`ObjectHandle`] is the shared handle
//!   those consumers hold.
//! - [`ConverterRegistry`] owns the text conversions used both for
//!   editing (value ⇄ display text) and for shape coercion when a
//!   binding connects attributes of different primitive shapes.
//!
//! # How it fits in the system
//!
//! `bindweed-reactive` supplies the notification primitives this crate
//! builds on ([`Value::List`] wraps an observable list, [`Reflect`]
//! implementors expose a property-change channel). `bindweed-sync`
//! consumes everything here to wire live bindings and reflective
//! editors.

pub mod convert;
pub mod reflect;
pub mod shape;
pub mod value;

pub use convert::{
    BoolConverter, ConverterRegistry, FloatConverter, IdConverter, IntConverter, IpConverter,
    StringConverter, TextConverter, TimestampConverter,
};
pub use reflect::{AccessError, ObjectHandle, PropertyChange, Reflect};
pub use shape::{Shape, ShapeClass};
pub use value::{MapHandle, Value};
