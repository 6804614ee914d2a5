#![forbid(unsafe_code)]

//! Live value propagation between two reflective objects.
//!
//! # Design
//!
//! A [`Binding`] names one attribute on a source object and one on a
//! target object, and while bound keeps them in sync. Scalar attributes
//! propagate through [`PropertyChange`] events with shape coercion;
//! list attributes propagate each [`ListChange`] as exactly one
//! equivalent operation on the other list, so element identity and
//! order survive and nothing is rebuilt from scratch.
//!
//! `bind()` validates the whole configuration before subscribing to
//! anything, so a failed bind leaves no trace. Propagation failures
//! after that (a value that will not coerce, a write the target
//! rejects) are not errors: the change is dropped, a warning is logged,
//! and [`propagation_failures`](Binding::propagation_failures) counts
//! it.
//!
//! # Invariants
//!
//! 1. A failed `bind()` installs zero subscriptions.
//! 2. While bound, each propagated change applies at most one write to
//!    the receiving side; the re-entrancy flag is per binding, so
//!    chains of bindings across shared objects propagate end to end.
//! 3. After `unbind()` returns, the binding never writes again, even
//!    when `unbind` runs inside a notification pass the binding itself
//!    is part of.
//! 4. A dropped change leaves the receiving side's previous value
//!    untouched.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | [`BindError`] | misconfigured endpoints | `bind()` rejected, nothing subscribed |
//! | Coercion failure | value does not fit the receiving shape | change dropped, counted, warned |
//! | Rejected write | receiving attribute read-only or incompatible | change dropped, counted, warned |
//! | Diverged lists | mirrored index out of range | change dropped, counted, warned |
//!
//! Borrow discipline: propagation handlers check their flags before
//! borrowing either endpoint. A re-entrant delivery (the receiving
//! object publishing while its cell is still mutably borrowed) is
//! short-circuited by the `applying` flag without touching a `RefCell`
//! held higher in the stack.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

use bindweed_model::{ConverterRegistry, ObjectHandle, PropertyChange, Shape, Value};
use bindweed_reactive::{ListChange, Notifier, ObservableList, Subscription};

// ---------------------------------------------------------------------------
// Mode and errors
// ---------------------------------------------------------------------------

/// Direction(s) a binding propagates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// Source changes flow to the target.
    OneWay,
    /// Changes flow both ways, with feedback suppressed per binding.
    TwoWay,
    /// The source value is pushed once at `bind()`; nothing is
    /// subscribed afterwards.
    OneTime,
    /// Target changes flow to the source. The exact mirror of
    /// [`OneWay`](BindingMode::OneWay), initial push included.
    OneWayToSource,
}

/// Which endpoint of a binding an error talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Source => "source",
            Side::Target => "target",
        })
    }
}

/// Why a `bind()` attempt was rejected. All variants are configuration
/// problems, detected before anything is subscribed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// The named attribute does not exist on that side.
    UnknownAttribute { side: Side, attribute: String },
    /// One side of a container binding is not a list. `shape` is the
    /// offending side's shape, or `None` when its declared-list
    /// attribute currently holds null.
    NotAContainer {
        side: Side,
        attribute: String,
        shape: Option<Shape>,
    },
    /// The mode requires subscribing a side whose object publishes no
    /// property changes.
    NoChangeNotifier { side: Side },
    /// `bind()` was called while this binding is already bound.
    AlreadyBound,
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::UnknownAttribute { side, attribute } => {
                write!(f, "{side} attribute `{attribute}` does not exist")
            }
            BindError::NotAContainer {
                side,
                attribute,
                shape: Some(shape),
            } => write!(
                f,
                "{side} attribute `{attribute}` cannot join a container binding (shape {shape})"
            ),
            BindError::NotAContainer {
                side,
                attribute,
                shape: None,
            } => write!(
                f,
                "{side} attribute `{attribute}` holds no list instance to bind"
            ),
            BindError::NoChangeNotifier { side } => {
                write!(f, "{side} object publishes no property changes")
            }
            BindError::AlreadyBound => f.write_str("binding is already bound"),
        }
    }
}

impl std::error::Error for BindError {}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// A named connection between one attribute on a source object and one
/// on a target object.
///
/// Construct with [`Binding::new`], optionally swap in a custom
/// converter registry with [`Binding::with_registry`], then call
/// [`bind`](Binding::bind). Dropping a bound binding unbinds it.
pub struct Binding {
    source: ObjectHandle,
    source_attr: String,
    target: ObjectHandle,
    target_attr: String,
    mode: BindingMode,
    registry: Rc<ConverterRegistry>,
    // One flag per binding, shared with its closures. `applying` breaks
    // feedback loops; `live` is replaced on every bind() so closures
    // from a previous generation stay dead after rebind.
    applying: Rc<Cell<bool>>,
    live: Option<Rc<Cell<bool>>>,
    failures: Rc<Cell<u64>>,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("source", &self.source_attr)
            .field("target", &self.target_attr)
            .field("mode", &self.mode)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl Binding {
    /// Describe a binding between `source_attr` on `source` and
    /// `target_attr` on `target`. Nothing is connected until
    /// [`bind`](Binding::bind).
    #[must_use]
    pub fn new(
        source: &ObjectHandle,
        source_attr: impl Into<String>,
        target: &ObjectHandle,
        target_attr: impl Into<String>,
        mode: BindingMode,
    ) -> Self {
        Self {
            source: source.clone(),
            source_attr: source_attr.into(),
            target: target.clone(),
            target_attr: target_attr.into(),
            mode,
            registry: Rc::new(ConverterRegistry::with_defaults()),
            applying: Rc::new(Cell::new(false)),
            live: None,
            failures: Rc::new(Cell::new(0)),
            subscriptions: Vec::new(),
        }
    }

    /// Use `registry` for coercion instead of the built-in defaults.
    #[must_use]
    pub fn with_registry(mut self, registry: Rc<ConverterRegistry>) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn mode(&self) -> BindingMode {
        self.mode
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.live.is_some()
    }

    /// Changes dropped since the first `bind()`: coercion failures,
    /// rejected writes, diverged list indices.
    #[must_use]
    pub fn propagation_failures(&self) -> u64 {
        self.failures.get()
    }

    /// Validate the configuration, push the initial value, and
    /// subscribe per the mode. On error nothing was subscribed and the
    /// binding stays unbound.
    pub fn bind(&mut self) -> Result<(), BindError> {
        if self.live.is_some() {
            return Err(BindError::AlreadyBound);
        }

        let source_shape =
            self.source
                .shape_of(&self.source_attr)
                .ok_or_else(|| BindError::UnknownAttribute {
                    side: Side::Source,
                    attribute: self.source_attr.clone(),
                })?;
        let target_shape =
            self.target
                .shape_of(&self.target_attr)
                .ok_or_else(|| BindError::UnknownAttribute {
                    side: Side::Target,
                    attribute: self.target_attr.clone(),
                })?;

        let live = Rc::new(Cell::new(true));
        let subscriptions = match (source_shape == Shape::List, target_shape == Shape::List) {
            (true, true) => self.bind_container(&live)?,
            (false, false) => self.bind_scalar(&live)?,
            (true, false) => {
                return Err(BindError::NotAContainer {
                    side: Side::Target,
                    attribute: self.target_attr.clone(),
                    shape: Some(target_shape),
                });
            }
            (false, true) => {
                return Err(BindError::NotAContainer {
                    side: Side::Source,
                    attribute: self.source_attr.clone(),
                    shape: Some(source_shape),
                });
            }
        };

        self.subscriptions = subscriptions;
        self.live = Some(live);
        debug!(
            source = %self.source_attr,
            target = %self.target_attr,
            mode = ?self.mode,
            "binding established"
        );
        Ok(())
    }

    /// Disconnect. Idempotent; takes effect immediately, even when
    /// called from inside a notification pass this binding is part of.
    pub fn unbind(&mut self) {
        if let Some(live) = self.live.take() {
            live.set(false);
            self.subscriptions.clear();
            debug!(
                source = %self.source_attr,
                target = %self.target_attr,
                "binding released"
            );
        }
    }

    // -- scalar path --------------------------------------------------

    fn bind_scalar(&self, live: &Rc<Cell<bool>>) -> Result<Vec<Subscription>, BindError> {
        let watch_source = matches!(self.mode, BindingMode::OneWay | BindingMode::TwoWay);
        let watch_target = matches!(
            self.mode,
            BindingMode::TwoWay | BindingMode::OneWayToSource
        );

        // Capability checks complete before the initial push or any
        // subscription, so a rejected bind has no side effects.
        let source_changes = if watch_source {
            Some(
                self.source
                    .changes()
                    .ok_or(BindError::NoChangeNotifier { side: Side::Source })?,
            )
        } else {
            None
        };
        let target_changes = if watch_target {
            Some(
                self.target
                    .changes()
                    .ok_or(BindError::NoChangeNotifier { side: Side::Target })?,
            )
        } else {
            None
        };

        match self.mode {
            BindingMode::OneWay | BindingMode::TwoWay | BindingMode::OneTime => {
                self.push_current(&self.source, &self.source_attr, &self.target, &self.target_attr);
            }
            BindingMode::OneWayToSource => {
                self.push_current(&self.target, &self.target_attr, &self.source, &self.source_attr);
            }
        }

        let mut subscriptions = Vec::new();
        if let Some(changes) = source_changes {
            subscriptions.push(self.subscribe_scalar(
                &changes,
                self.source_attr.clone(),
                self.target.clone(),
                self.target_attr.clone(),
                live,
            ));
        }
        if let Some(changes) = target_changes {
            subscriptions.push(self.subscribe_scalar(
                &changes,
                self.target_attr.clone(),
                self.source.clone(),
                self.source_attr.clone(),
                live,
            ));
        }
        Ok(subscriptions)
    }

    /// Read the current value of one side and apply it to the other.
    /// Failures here are propagation failures, not bind errors.
    fn push_current(&self, from: &ObjectHandle, from_attr: &str, to: &ObjectHandle, to_attr: &str) {
        match from.get(from_attr) {
            Ok(value) => apply_value(&self.registry, &value, to, to_attr, &self.failures),
            Err(err) => {
                self.failures.set(self.failures.get() + 1);
                warn!(attribute = %from_attr, error = %err, "initial push skipped: read failed");
            }
        }
    }

    fn subscribe_scalar(
        &self,
        changes: &Notifier<PropertyChange>,
        from_attr: String,
        to: ObjectHandle,
        to_attr: String,
        live: &Rc<Cell<bool>>,
    ) -> Subscription {
        let live = Rc::clone(live);
        let applying = Rc::clone(&self.applying);
        let failures = Rc::clone(&self.failures);
        let registry = Rc::clone(&self.registry);
        changes.subscribe(move |change: &PropertyChange| {
            // Flag checks come before any endpoint access; the sending
            // object may still be mutably borrowed by the caller.
            if !live.get() || change.property != from_attr || applying.get() {
                return;
            }
            applying.set(true);
            apply_value(&registry, &change.new, &to, &to_attr, &failures);
            applying.set(false);
        })
    }

    // -- container path -----------------------------------------------

    fn bind_container(&self, live: &Rc<Cell<bool>>) -> Result<Vec<Subscription>, BindError> {
        let source_list = self.current_list(&self.source, &self.source_attr, Side::Source)?;
        let target_list = self.current_list(&self.target, &self.target_attr, Side::Target)?;

        match self.mode {
            BindingMode::OneWay | BindingMode::TwoWay | BindingMode::OneTime => {
                target_list.reset(source_list.to_vec());
            }
            BindingMode::OneWayToSource => {
                source_list.reset(target_list.to_vec());
            }
        }

        let mut subscriptions = Vec::new();
        if matches!(self.mode, BindingMode::OneWay | BindingMode::TwoWay) {
            subscriptions.push(self.subscribe_container(&source_list, target_list.clone(), live));
        }
        if matches!(
            self.mode,
            BindingMode::TwoWay | BindingMode::OneWayToSource
        ) {
            subscriptions.push(self.subscribe_container(&target_list, source_list.clone(), live));
        }
        Ok(subscriptions)
    }

    /// The list instance currently held by `attr`. The binding tracks
    /// this instance; rebind to track a replacement.
    fn current_list(
        &self,
        object: &ObjectHandle,
        attr: &str,
        side: Side,
    ) -> Result<ObservableList<Value>, BindError> {
        let value = object.get(attr).map_err(|_| BindError::UnknownAttribute {
            side,
            attribute: attr.to_string(),
        })?;
        match value {
            Value::List(list) => Ok(list),
            other => Err(BindError::NotAContainer {
                side,
                attribute: attr.to_string(),
                shape: other.shape(),
            }),
        }
    }

    fn subscribe_container(
        &self,
        from: &ObservableList<Value>,
        to: ObservableList<Value>,
        live: &Rc<Cell<bool>>,
    ) -> Subscription {
        let live = Rc::clone(live);
        let applying = Rc::clone(&self.applying);
        let failures = Rc::clone(&self.failures);
        from.subscribe(move |change: &ListChange<Value>| {
            if !live.get() || applying.get() {
                return;
            }
            applying.set(true);
            mirror_change(&to, change, &failures);
            applying.set(false);
        })
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.unbind();
    }
}

// ---------------------------------------------------------------------------
// Propagation helpers
// ---------------------------------------------------------------------------

/// Coerce `value` to the receiving attribute's declared shape and write
/// it. A value that will not coerce or a write the receiver rejects
/// drops the change, warns, and counts.
fn apply_value(
    registry: &ConverterRegistry,
    value: &Value,
    to: &ObjectHandle,
    to_attr: &str,
    failures: &Cell<u64>,
) {
    let Some(shape) = to.shape_of(to_attr) else {
        failures.set(failures.get() + 1);
        warn!(attribute = %to_attr, "change dropped: attribute vanished");
        return;
    };
    match registry.coerce(value, shape) {
        Some(coerced) => {
            if let Err(err) = to.set(to_attr, coerced) {
                failures.set(failures.get() + 1);
                warn!(attribute = %to_attr, error = %err, "change dropped: write rejected");
            }
        }
        None => {
            failures.set(failures.get() + 1);
            warn!(
                attribute = %to_attr,
                from = ?value.shape(),
                to = %shape,
                "change dropped: value does not coerce to receiving shape"
            );
        }
    }
}

/// Apply one incoming list change as exactly one equivalent operation
/// on the receiving list.
fn mirror_change(to: &ObservableList<Value>, change: &ListChange<Value>, failures: &Cell<u64>) {
    let result = match change {
        ListChange::Added { index, value } => to.insert(*index, value.clone()),
        ListChange::Removed { index, .. } => to.remove(*index).map(|_| ()),
        ListChange::Replaced { index, new, .. } => to.replace(*index, new.clone()).map(|_| ()),
        ListChange::Reset { items } => {
            to.reset(items.clone());
            Ok(())
        }
    };
    if let Err(err) = result {
        failures.set(failures.get() + 1);
        warn!(
            index = err.index,
            len = err.len,
            "change dropped: lists diverged"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bindweed_model::{AccessError, Reflect};
    use std::cell::RefCell;

    /// Notifying fixture with a text, an int, and a list attribute.
    struct Panel {
        title: String,
        width: i64,
        items: ObservableList<Value>,
        changes: Notifier<PropertyChange>,
    }

    impl Panel {
        fn new() -> Self {
            Self {
                title: String::new(),
                width: 0,
                items: ObservableList::new(),
                changes: Notifier::new(),
            }
        }
    }

    impl Reflect for Panel {
        fn type_name(&self) -> &'static str {
            "Panel"
        }

        fn attribute_names(&self) -> Vec<&'static str> {
            vec!["title", "width", "items"]
        }

        fn shape_of(&self, name: &str) -> Option<Shape> {
            match name {
                "title" => Some(Shape::Text),
                "width" => Some(Shape::Int),
                "items" => Some(Shape::List),
                _ => None,
            }
        }

        fn get(&self, name: &str) -> Result<Value, AccessError> {
            match name {
                "title" => Ok(Value::Text(self.title.clone())),
                "width" => Ok(Value::Int(self.width)),
                "items" => Ok(Value::List(self.items.clone())),
                _ => Err(AccessError::UnknownAttribute {
                    attribute: name.to_string(),
                }),
            }
        }

        fn set(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
            let old = self.get(name)?;
            let property = match name {
                "title" => "title",
                "width" => "width",
                _ => "items",
            };
            match (property, &value) {
                ("title", Value::Text(s)) => self.title = s.clone(),
                ("width", Value::Int(n)) => self.width = *n,
                ("items", Value::List(list)) => self.items = list.clone(),
                (_, got) => {
                    return Err(AccessError::Incompatible {
                        attribute: name.to_string(),
                        expected: self.shape_of(name).unwrap(),
                        got: got.shape(),
                    });
                }
            }
            self.changes.publish(&PropertyChange {
                property,
                old,
                new: value,
            });
            Ok(())
        }

        fn changes(&self) -> Option<Notifier<PropertyChange>> {
            Some(self.changes.clone())
        }
    }

    /// Fixture without a change channel.
    struct Mute {
        value: i64,
    }

    impl Reflect for Mute {
        fn type_name(&self) -> &'static str {
            "Mute"
        }
        fn attribute_names(&self) -> Vec<&'static str> {
            vec!["value"]
        }
        fn shape_of(&self, name: &str) -> Option<Shape> {
            (name == "value").then_some(Shape::Int)
        }
        fn get(&self, name: &str) -> Result<Value, AccessError> {
            if name == "value" {
                Ok(Value::Int(self.value))
            } else {
                Err(AccessError::UnknownAttribute {
                    attribute: name.to_string(),
                })
            }
        }
        fn set(&mut self, name: &str, value: Value) -> Result<(), AccessError> {
            match (name, value) {
                ("value", Value::Int(n)) => {
                    self.value = n;
                    Ok(())
                }
                ("value", got) => Err(AccessError::Incompatible {
                    attribute: name.to_string(),
                    expected: Shape::Int,
                    got: got.shape(),
                }),
                _ => Err(AccessError::UnknownAttribute {
                    attribute: name.to_string(),
                }),
            }
        }
    }

    fn panel() -> ObjectHandle {
        ObjectHandle::new(Panel::new())
    }

    #[test]
    fn one_way_pushes_initial_and_propagates() {
        let a = panel();
        let b = panel();
        a.set("width", Value::from(5)).unwrap();

        let mut binding = Binding::new(&a, "width", &b, "width", BindingMode::OneWay);
        binding.bind().unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(5));

        a.set("width", Value::from(9)).unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(9));
    }

    #[test]
    fn one_way_ignores_target_changes() {
        let a = panel();
        let b = panel();
        let mut binding = Binding::new(&a, "width", &b, "width", BindingMode::OneWay);
        binding.bind().unwrap();

        b.set("width", Value::from(3)).unwrap();
        assert_eq!(a.get("width").unwrap(), Value::from(0));
        assert_eq!(b.get("width").unwrap(), Value::from(3));
    }

    #[test]
    fn two_way_propagates_both_directions_once() {
        let a = panel();
        let b = panel();
        let mut binding = Binding::new(&a, "title", &b, "title", BindingMode::TwoWay);
        binding.bind().unwrap();

        // Count every write observed on each side after bind.
        let a_writes = Rc::new(Cell::new(0u32));
        let b_writes = Rc::new(Cell::new(0u32));
        let (ac, bc) = (Rc::clone(&a_writes), Rc::clone(&b_writes));
        let _sa = a.changes().unwrap().subscribe(move |_| ac.set(ac.get() + 1));
        let _sb = b.changes().unwrap().subscribe(move |_| bc.set(bc.get() + 1));

        a.set("title", Value::from("left")).unwrap();
        assert_eq!(b.get("title").unwrap(), Value::from("left"));
        assert_eq!((a_writes.get(), b_writes.get()), (1, 1));

        b.set("title", Value::from("right")).unwrap();
        assert_eq!(a.get("title").unwrap(), Value::from("right"));
        assert_eq!((a_writes.get(), b_writes.get()), (2, 2));
    }

    #[test]
    fn coercion_bridges_primitive_shapes() {
        let a = panel();
        let b = panel();
        a.set("width", Value::from(42)).unwrap();

        let mut binding = Binding::new(&a, "width", &b, "title", BindingMode::OneWay);
        binding.bind().unwrap();
        assert_eq!(b.get("title").unwrap(), Value::from("42"));

        a.set("width", Value::from(7)).unwrap();
        assert_eq!(b.get("title").unwrap(), Value::from("7"));
        assert_eq!(binding.propagation_failures(), 0);
    }

    #[test]
    fn coercion_failure_is_counted_and_skipped() {
        let a = panel();
        let b = panel();
        b.set("width", Value::from(10)).unwrap();
        a.set("title", Value::from("10")).unwrap();

        let mut binding = Binding::new(&a, "title", &b, "width", BindingMode::OneWay);
        binding.bind().unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(10));
        assert_eq!(binding.propagation_failures(), 0);

        a.set("title", Value::from("not a number")).unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(10));
        assert_eq!(binding.propagation_failures(), 1);

        // The binding keeps working for later valid changes.
        a.set("title", Value::from("11")).unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(11));
        assert_eq!(binding.propagation_failures(), 1);
    }

    #[test]
    fn unknown_attribute_fails_without_subscribing() {
        let a = panel();
        let b = panel();
        let notifier = a.changes().unwrap();
        let before = notifier.subscriber_count();

        let mut binding = Binding::new(&a, "missing", &b, "width", BindingMode::OneWay);
        assert_eq!(
            binding.bind().unwrap_err(),
            BindError::UnknownAttribute {
                side: Side::Source,
                attribute: "missing".into()
            }
        );
        assert!(!binding.is_bound());
        assert_eq!(notifier.subscriber_count(), before);

        let mut binding = Binding::new(&a, "width", &b, "missing", BindingMode::OneWay);
        assert_eq!(
            binding.bind().unwrap_err(),
            BindError::UnknownAttribute {
                side: Side::Target,
                attribute: "missing".into()
            }
        );
    }

    #[test]
    fn missing_notifier_fails_per_mode() {
        let mute = ObjectHandle::new(Mute { value: 1 });
        let observable = panel();

        let mut binding = Binding::new(&mute, "value", &observable, "width", BindingMode::OneWay);
        assert_eq!(
            binding.bind().unwrap_err(),
            BindError::NoChangeNotifier { side: Side::Source }
        );

        // The mute side is fine as a pure receiver.
        let mut binding = Binding::new(&observable, "width", &mute, "value", BindingMode::OneWay);
        binding.bind().unwrap();
        observable.set("width", Value::from(8)).unwrap();
        assert_eq!(mute.get("value").unwrap(), Value::from(8));

        let mut binding = Binding::new(&observable, "width", &mute, "value", BindingMode::TwoWay);
        assert_eq!(
            binding.bind().unwrap_err(),
            BindError::NoChangeNotifier { side: Side::Target }
        );

        // OneTime needs no notifier anywhere.
        let mut binding = Binding::new(&mute, "value", &observable, "width", BindingMode::OneTime);
        binding.bind().unwrap();
    }

    #[test]
    fn container_mismatch_fails() {
        let a = panel();
        let b = panel();
        let mut binding = Binding::new(&a, "items", &b, "width", BindingMode::OneWay);
        assert_eq!(
            binding.bind().unwrap_err(),
            BindError::NotAContainer {
                side: Side::Target,
                attribute: "width".into(),
                shape: Some(Shape::Int),
            }
        );

        let mut binding = Binding::new(&a, "title", &b, "items", BindingMode::OneWay);
        assert_eq!(
            binding.bind().unwrap_err(),
            BindError::NotAContainer {
                side: Side::Source,
                attribute: "title".into(),
                shape: Some(Shape::Text),
            }
        );
    }

    #[test]
    fn container_binding_mirrors_operations() {
        let a = panel();
        let b = panel();
        let source = a.get("items").unwrap().as_list().unwrap().clone();
        let target = b.get("items").unwrap().as_list().unwrap().clone();
        source.push(Value::from("pre"));

        let mut binding = Binding::new(&a, "items", &b, "items", BindingMode::OneWay);
        binding.bind().unwrap();
        assert_eq!(target.to_vec(), vec![Value::from("pre")]);

        source.push(Value::from("x"));
        source.insert(1, Value::from("mid")).unwrap();
        source.replace(0, Value::from("PRE")).unwrap();
        source.remove(2).unwrap();
        assert_eq!(target.to_vec(), source.to_vec());
        assert_eq!(binding.propagation_failures(), 0);
    }

    #[test]
    fn already_bound_then_rebind_after_unbind() {
        let a = panel();
        let b = panel();
        let mut binding = Binding::new(&a, "width", &b, "width", BindingMode::OneWay);
        binding.bind().unwrap();
        assert_eq!(binding.bind().unwrap_err(), BindError::AlreadyBound);
        assert!(binding.is_bound());

        binding.unbind();
        binding.unbind();
        assert!(!binding.is_bound());
        a.set("width", Value::from(4)).unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(0));

        binding.bind().unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(4));
        a.set("width", Value::from(6)).unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(6));
    }

    #[test]
    fn one_time_pushes_once_and_never_subscribes() {
        let a = panel();
        let b = panel();
        a.set("width", Value::from(3)).unwrap();
        let before = a.changes().unwrap().subscriber_count();

        let mut binding = Binding::new(&a, "width", &b, "width", BindingMode::OneTime);
        binding.bind().unwrap();
        assert!(binding.is_bound());
        assert_eq!(a.changes().unwrap().subscriber_count(), before);
        assert_eq!(b.get("width").unwrap(), Value::from(3));

        a.set("width", Value::from(99)).unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(3));
    }

    #[test]
    fn one_way_to_source_mirrors_roles() {
        let a = panel();
        let b = panel();
        b.set("title", Value::from("from target")).unwrap();

        let mut binding = Binding::new(&a, "title", &b, "title", BindingMode::OneWayToSource);
        binding.bind().unwrap();
        assert_eq!(a.get("title").unwrap(), Value::from("from target"));

        b.set("title", Value::from("updated")).unwrap();
        assert_eq!(a.get("title").unwrap(), Value::from("updated"));

        a.set("title", Value::from("ignored")).unwrap();
        assert_eq!(b.get("title").unwrap(), Value::from("updated"));
    }

    #[test]
    fn drop_unbinds() {
        let a = panel();
        let b = panel();
        {
            let mut binding = Binding::new(&a, "width", &b, "width", BindingMode::OneWay);
            binding.bind().unwrap();
            a.set("width", Value::from(2)).unwrap();
            assert_eq!(b.get("width").unwrap(), Value::from(2));
        }
        a.set("width", Value::from(50)).unwrap();
        assert_eq!(b.get("width").unwrap(), Value::from(2));
    }

    #[test]
    fn unrelated_attribute_changes_are_filtered() {
        let a = panel();
        let b = panel();
        let mut binding = Binding::new(&a, "width", &b, "width", BindingMode::OneWay);
        binding.bind().unwrap();

        a.set("title", Value::from("noise")).unwrap();
        assert_eq!(b.get("title").unwrap(), Value::from(""));
        assert_eq!(b.get("width").unwrap(), Value::from(0));
        assert_eq!(binding.propagation_failures(), 0);
    }

    #[test]
    fn bind_error_display() {
        let err = BindError::NotAContainer {
            side: Side::Target,
            attribute: "width".into(),
            shape: Some(Shape::Int),
        };
        assert_eq!(
            err.to_string(),
            "target attribute `width` cannot join a container binding (shape int)"
        );
        assert_eq!(
            BindError::AlreadyBound.to_string(),
            "binding is already bound"
        );
        assert_eq!(
            BindError::NoChangeNotifier { side: Side::Source }.to_string(),
            "source object publishes no property changes"
        );
    }

    #[test]
    fn failures_are_visible_across_closures() {
        // The counter the closures increment is the one the accessor
        // reads.
        let a = panel();
        let b = panel();
        a.set("title", Value::from("0")).unwrap();
        let mut binding = Binding::new(&a, "title", &b, "width", BindingMode::OneWay);
        binding.bind().unwrap();

        let log: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
        for text in ["1", "nope", "2", "also nope"] {
            a.set("title", Value::from(text)).unwrap();
            log.borrow_mut().push(binding.propagation_failures());
        }
        assert_eq!(*log.borrow(), vec![0, 1, 1, 2]);
    }
}
