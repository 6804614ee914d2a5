#![forbid(unsafe_code)]

//! Reflective enumeration of editable fields over a value graph.
//!
//! # Design
//!
//! [`FieldEnumerator`] flattens one subject value into a [`FieldSet`]:
//! a paginated list of [`Field`]s, each addressable by a single
//! shortcut character within its page. The subject is classified once
//! by shape: mappings enumerate entries in insertion order, sequences
//! enumerate elements in index order, composites enumerate attributes
//! alphabetically, and primitives enumerate nothing. Fields are live
//! views: their getters and setters capture the owning handle, so an
//! accepted edit is immediately visible to everything else holding it
//! (and publishes whatever events the owner publishes).
//!
//! Text editing goes through the enumerator's
//! [`ConverterRegistry`]; a field whose shape is not primitive is
//! edited structurally instead, by recursing into
//! [`navigate`](Field::navigate) and enumerating again.
//!
//! # Invariants
//!
//! 1. Shortcut keys are unique within a page: slot 0..=9 maps to
//!    `'0'..='9'`, slot 10..=35 to `'a'..='z'`, and the page size never
//!    exceeds 36.
//! 2. A composite attribute whose declared shape is a container and
//!    whose current value is null is populated with its default before
//!    the field is exposed, so navigation always has something to
//!    descend into.
//! 3. [`Field::set_from_text`] either fully applies a parsed value or
//!    mutates nothing and returns `false`. Composite fields always
//!    return `false`.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use bindweed_model::{ConverterRegistry, MapHandle, ObjectHandle, Shape, Value};
use bindweed_reactive::ObservableList;

/// Fields per page when not overridden: ten entries, one per digit key.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Shortcut character for a slot within a page: digits, then letters.
fn shortcut_key(slot: usize) -> char {
    debug_assert!(slot < 36);
    if slot < 10 {
        (b'0' + slot as u8) as char
    } else {
        (b'a' + (slot - 10) as u8) as char
    }
}

/// Shape name for a label, with `null` for shapeless values.
fn label_shape(value: &Value) -> String {
    match value.shape() {
        Some(shape) => shape.to_string(),
        None => "null".to_string(),
    }
}

// ---------------------------------------------------------------------------
// FieldEnumerator
// ---------------------------------------------------------------------------

/// Builds [`FieldSet`]s. Carries the converter registry every produced
/// field renders and parses with, plus the page size.
pub struct FieldEnumerator {
    registry: Rc<ConverterRegistry>,
    page_size: usize,
}

impl fmt::Debug for FieldEnumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEnumerator")
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Default for FieldEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldEnumerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(ConverterRegistry::with_defaults()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Use `registry` for rendering and parsing instead of the built-in
    /// defaults.
    #[must_use]
    pub fn with_registry(mut self, registry: Rc<ConverterRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Override the page size.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= page_size <= 36` (the shortcut alphabet).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        assert!(
            (1..=36).contains(&page_size),
            "page size must be between 1 and 36"
        );
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Flatten `subject` into fields. Primitive and null subjects have
    /// nothing to enumerate and produce an empty set.
    #[must_use]
    pub fn enumerate(&self, subject: &Value) -> FieldSet {
        let fields = match subject {
            Value::List(list) => self.sequence_fields(list),
            Value::Map(map) => self.mapping_fields(map),
            Value::Object(object) => self.composite_fields(object),
            Value::Null
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Text(_)
            | Value::Timestamp(_)
            | Value::Id(_)
            | Value::Ip(_) => Vec::new(),
        };
        FieldSet {
            fields,
            page_size: self.page_size,
        }
    }

    fn sequence_fields(&self, list: &ObservableList<Value>) -> Vec<Field> {
        list.to_vec()
            .into_iter()
            .enumerate()
            .map(|(ordinal, element)| {
                let label = format!("item {ordinal} [{}]", label_shape(&element));
                let getter = {
                    let list = list.clone();
                    move || list.get(ordinal).unwrap_or(Value::Null)
                };
                let setter = {
                    let list = list.clone();
                    move |value: Value| list.replace(ordinal, value).is_ok()
                };
                self.field(ordinal, label, element.shape(), getter, setter)
            })
            .collect()
    }

    fn mapping_fields(&self, map: &MapHandle) -> Vec<Field> {
        map.keys()
            .into_iter()
            .enumerate()
            .map(|(ordinal, key)| {
                let current = map.get(&key).unwrap_or(Value::Null);
                let label = format!("{key} [{}]", label_shape(&current));
                let getter = {
                    let map = map.clone();
                    let key = key.clone();
                    move || map.get(&key).unwrap_or(Value::Null)
                };
                let setter = {
                    let map = map.clone();
                    move |value: Value| {
                        map.insert(key.clone(), value);
                        true
                    }
                };
                self.field(ordinal, label, current.shape(), getter, setter)
            })
            .collect()
    }

    fn composite_fields(&self, object: &ObjectHandle) -> Vec<Field> {
        let mut named: Vec<(&'static str, Shape)> = object
            .attribute_names()
            .into_iter()
            .filter_map(|name| object.shape_of(name).map(|shape| (name, shape)))
            .collect();
        named.sort_unstable_by_key(|(name, _)| *name);

        named
            .into_iter()
            .enumerate()
            .map(|(ordinal, (name, declared))| {
                if !declared.is_primitive() {
                    self.populate_null_attribute(object, name, declared);
                }
                let label = format!("{name} [{declared}]");
                let getter = {
                    let object = object.clone();
                    move || object.get(name).unwrap_or(Value::Null)
                };
                let setter = {
                    let object = object.clone();
                    move |value: Value| object.set(name, value).is_ok()
                };
                self.field(ordinal, label, Some(declared), getter, setter)
            })
            .collect()
    }

    /// Write the attribute's default back when it currently holds null,
    /// so the produced field can be navigated into.
    fn populate_null_attribute(&self, object: &ObjectHandle, name: &'static str, shape: Shape) {
        if !matches!(object.get(name), Ok(Value::Null)) {
            return;
        }
        let Some(default) = object.default_for(name) else {
            return;
        };
        match object.set(name, default) {
            Ok(()) => {
                debug!(attribute = name, shape = %shape, "populated null attribute with default");
            }
            Err(err) => {
                warn!(attribute = name, error = %err, "default for null attribute rejected");
            }
        }
    }

    fn field(
        &self,
        ordinal: usize,
        label: String,
        shape: Option<Shape>,
        getter: impl Fn() -> Value + 'static,
        setter: impl Fn(Value) -> bool + 'static,
    ) -> Field {
        Field {
            key: shortcut_key(ordinal % self.page_size),
            page: ordinal / self.page_size,
            label,
            shape,
            getter: Rc::new(getter),
            setter: Rc::new(setter),
            registry: Rc::clone(&self.registry),
        }
    }
}

// ---------------------------------------------------------------------------
// FieldSet
// ---------------------------------------------------------------------------

/// One enumeration pass over a subject: the produced fields in ordinal
/// order, split into pages.
pub struct FieldSet {
    fields: Vec<Field>,
    page_size: usize,
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSet")
            .field("len", &self.fields.len())
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl FieldSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// All fields in ordinal order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.fields.len().div_ceil(self.page_size)
    }

    /// The fields on page `page` (empty past the last page).
    #[must_use]
    pub fn page(&self, page: usize) -> &[Field] {
        let start = page.saturating_mul(self.page_size);
        if start >= self.fields.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.fields.len());
        &self.fields[start..end]
    }

    /// Resolve a shortcut key on a page, for gesture dispatch.
    #[must_use]
    pub fn find(&self, page: usize, key: char) -> Option<&Field> {
        self.page(page).iter().find(|field| field.key == key)
    }
}

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// One editable entry: a live view onto an element, map entry, or
/// object attribute.
pub struct Field {
    key: char,
    label: String,
    page: usize,
    shape: Option<Shape>,
    getter: Rc<dyn Fn() -> Value>,
    setter: Rc<dyn Fn(Value) -> bool>,
    registry: Rc<ConverterRegistry>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("page", &self.page)
            .field("shape", &self.shape)
            .finish()
    }
}

impl Field {
    /// Shortcut character, unique within this field's page.
    #[must_use]
    pub fn key(&self) -> char {
        self.key
    }

    /// Display label: the entry name and its shape.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// The field's shape: declared for object attributes, current for
    /// elements and map entries (`None` when the entry holds null).
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        self.shape
    }

    /// Whether editing this field means recursing into a nested
    /// enumeration rather than parsing text.
    #[must_use]
    pub fn requires_composite_editor(&self) -> bool {
        self.shape.is_some_and(|shape| !shape.is_primitive())
    }

    /// Current value behind the field.
    #[must_use]
    pub fn current_value(&self) -> Value {
        (self.getter)()
    }

    /// Current value rendered for display. Composites render the
    /// registry's summary form.
    #[must_use]
    pub fn current_text(&self) -> String {
        self.registry.to_text(&self.current_value())
    }

    /// Parse `text` and write it back. `false` — and no mutation — when
    /// the field is not text-editable, the text does not parse, or the
    /// owner rejects the write.
    pub fn set_from_text(&self, text: &str) -> bool {
        let Some(shape) = self.shape else {
            return false;
        };
        if !shape.is_primitive() {
            return false;
        }
        match self.registry.parse(shape, text) {
            Some(value) => (self.setter)(value),
            None => false,
        }
    }

    /// The container or object handle to recurse into, for fields whose
    /// current value is structural.
    #[must_use]
    pub fn navigate(&self) -> Option<Value> {
        match self.current_value() {
            value @ (Value::List(_) | Value::Map(_) | Value::Object(_)) => Some(value),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
