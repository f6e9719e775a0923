//! Dynamic values and observable collections.
//!
//! [`Value`] is the type-erased currency of dynamic property access: a
//! scalar, a shared [`Bindable`] object, or a shared [`ObservableList`].
//! Equality is by value for scalars and by instance identity for objects
//! and lists, so re-assigning the same shared instance is detectable as a
//! no-op.
//!
//! [`ObservableList`] is a growable list of values that emits
//! [`ListChange`] events through a [`Signal`]. An optional element factory
//! lets consumers grow the list on demand with default-constructed
//! elements.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use static_assertions::assert_impl_all;

use crate::meta::Bindable;
use crate::signal::Signal;

/// Type-erased value for dynamic property access.
#[derive(Clone, Default)]
pub enum Value {
    /// No value.
    #[default]
    None,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Shared object exposing named properties.
    Object(Arc<dyn Bindable>),
    /// Shared observable list.
    List(Arc<ObservableList>),
}

impl Value {
    /// Wrap an owned object as a shared `Value::Object`.
    pub fn object<T: Bindable>(value: T) -> Self {
        Value::Object(Arc::new(value))
    }

    /// Returns `true` if this is `Value::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` if this holds some value.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to get the value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the value as a shared object.
    pub fn as_object(&self) -> Option<&Arc<dyn Bindable>> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Attempts to get the value as a shared list.
    pub fn as_list(&self) -> Option<&Arc<ObservableList>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Whether two values are the same instance (objects/lists) or equal
    /// scalars.
    ///
    /// This is the identity notion used by binding: assigning a source
    /// that is `same_instance` as the current one is a no-op.
    pub fn same_instance(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            // Objects and lists compare by instance identity.
            (Value::Object(a), Value::Object(b)) => {
                std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
            }
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Object(obj) => f.debug_tuple("Object").field(&obj.meta().type_name).finish(),
            Value::List(list) => write!(f, "List(len={})", list.len()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Arc<dyn Bindable>> for Value {
    fn from(obj: Arc<dyn Bindable>) -> Self {
        Value::Object(obj)
    }
}

impl From<Arc<ObservableList>> for Value {
    fn from(list: Arc<ObservableList>) -> Self {
        Value::List(list)
    }
}

/// Granular change notification for [`ObservableList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// `count` elements were inserted starting at `index`.
    Inserted {
        /// First inserted position.
        index: usize,
        /// Number of inserted elements.
        count: usize,
    },
    /// `count` elements were removed starting at `index`.
    Removed {
        /// First removed position.
        index: usize,
        /// Number of removed elements.
        count: usize,
    },
    /// The element at `index` was replaced.
    Replaced {
        /// The replaced position.
        index: usize,
    },
    /// The list changed wholesale.
    Reset,
}

type ElementFactory = Box<dyn Fn() -> Value + Send + Sync>;

/// A shared, observable list of [`Value`]s.
///
/// Mutations emit a [`ListChange`] through [`changed`](Self::changed)
/// after the internal lock has been released, so listeners may read the
/// list (or mutate it again) from inside their callbacks.
pub struct ObservableList {
    items: RwLock<Vec<Value>>,
    changed: Signal<ListChange>,
    /// Constructs default elements for on-demand growth. Lists without a
    /// factory cannot be grown implicitly.
    element_factory: Option<ElementFactory>,
}

impl Default for ObservableList {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservableList {
    /// Create an empty list without an element factory.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            changed: Signal::new(),
            element_factory: None,
        }
    }

    /// Create an empty list whose elements can be default-constructed.
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            items: RwLock::new(Vec::new()),
            changed: Signal::new(),
            element_factory: Some(Box::new(factory)),
        }
    }

    /// Create a list from existing values.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            items: RwLock::new(values),
            changed: Signal::new(),
            element_factory: None,
        }
    }

    /// The change notification signal.
    pub fn changed(&self) -> &Signal<ListChange> {
        &self.changed
    }

    /// Whether elements can be default-constructed for implicit growth.
    pub fn has_factory(&self) -> bool {
        self.element_factory.is_some()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// The element at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// A snapshot of all elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    /// Append an element.
    pub fn push(&self, value: Value) {
        let index = {
            let mut items = self.items.write();
            items.push(value);
            items.len() - 1
        };
        self.changed.emit(ListChange::Inserted { index, count: 1 });
    }

    /// Insert an element at `index`. Returns `false` when out of range.
    pub fn insert(&self, index: usize, value: Value) -> bool {
        {
            let mut items = self.items.write();
            if index > items.len() {
                return false;
            }
            items.insert(index, value);
        }
        self.changed.emit(ListChange::Inserted { index, count: 1 });
        true
    }

    /// Remove and return the element at `index`.
    pub fn remove(&self, index: usize) -> Option<Value> {
        let removed = {
            let mut items = self.items.write();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        self.changed.emit(ListChange::Removed { index, count: 1 });
        Some(removed)
    }

    /// Replace the element at `index`. Returns `false` when out of range.
    ///
    /// Replacing an element with an equal value is accepted but emits no
    /// change.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let replaced = {
            let mut items = self.items.write();
            let Some(slot) = items.get_mut(index) else {
                return false;
            };
            if *slot == value {
                false
            } else {
                *slot = value;
                true
            }
        };
        if replaced {
            self.changed.emit(ListChange::Replaced { index });
        }
        true
    }

    /// Remove all elements.
    pub fn clear(&self) {
        let was_empty = {
            let mut items = self.items.write();
            let was_empty = items.is_empty();
            items.clear();
            was_empty
        };
        if !was_empty {
            self.changed.emit(ListChange::Reset);
        }
    }

    /// Grow the list with factory-built elements until it holds at least
    /// `len` elements.
    ///
    /// Returns `false` (without growing) when the list has no element
    /// factory. A list already long enough returns `true` untouched.
    pub fn grow_to(&self, len: usize) -> bool {
        let Some(factory) = &self.element_factory else {
            return false;
        };
        let change = {
            let mut items = self.items.write();
            if items.len() >= len {
                None
            } else {
                let index = items.len();
                let count = len - items.len();
                for _ in 0..count {
                    items.push(factory());
                }
                Some(ListChange::Inserted { index, count })
            }
        };
        if let Some(change) = change {
            self.changed.emit(change);
        }
        true
    }
}

impl fmt::Debug for ObservableList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("items", &*self.items.read())
            .field("has_factory", &self.has_factory())
            .finish()
    }
}

assert_impl_all!(Value: Send, Sync);
assert_impl_all!(ObservableList: Send, Sync);
