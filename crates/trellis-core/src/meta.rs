//! Schema tables for dynamic property access.
//!
//! Types participate in dynamic binding by implementing [`Bindable`] and
//! exposing a static [`MetaType`]: a table of [`MetaProperty`] entries,
//! each carrying plain function pointers for reading, optionally writing,
//! and optionally constructing a default value for one named property.
//! Lookups resolve against these tables at runtime; there is no global
//! type registry to initialize and nothing is derived.
//!
//! # Example
//!
//! ```
//! use trellis_core::{Bindable, MetaProperty, MetaType, Value};
//! use std::any::Any;
//!
//! struct Point {
//!     x: f64,
//! }
//!
//! fn point_x(obj: &dyn Bindable) -> Value {
//!     obj.as_any()
//!         .downcast_ref::<Point>()
//!         .map(|p| Value::Float(p.x))
//!         .unwrap_or(Value::None)
//! }
//!
//! static POINT_META: MetaType = MetaType {
//!     type_name: "Point",
//!     properties: &[MetaProperty {
//!         name: "x",
//!         read: point_x,
//!         write: None,
//!         make_default: None,
//!     }],
//! };
//!
//! impl Bindable for Point {
//!     fn meta(&self) -> &'static MetaType {
//!         &POINT_META
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let p = Point { x: 2.5 };
//! let prop = p.meta().property("x").unwrap();
//! assert_eq!((prop.read)(&p), Value::Float(2.5));
//! ```

use std::any::Any;
use std::fmt;

use crate::signal::Signal;
use crate::value::Value;

/// A type that exposes named properties for dynamic access.
///
/// Implementors hand out a `'static` schema via [`meta`](Self::meta) and
/// may additionally expose a change signal whose payload is the name of
/// the property that changed (the empty string means "any property").
pub trait Bindable: Any + Send + Sync {
    /// The schema describing this type's dynamic properties.
    fn meta(&self) -> &'static MetaType;

    /// Self as `Any`, for downcasting inside accessor functions.
    fn as_any(&self) -> &dyn Any;

    /// Change notification carrying the changed property's name.
    ///
    /// Returns `None` for types that never notify. Emitting an empty
    /// string signals that any property may have changed.
    fn changed(&self) -> Option<&Signal<String>> {
        None
    }
}

/// Static schema for one [`Bindable`] type.
pub struct MetaType {
    /// The type's display name, used in diagnostics.
    pub type_name: &'static str,
    /// Property table, looked up by name.
    pub properties: &'static [MetaProperty],
}

impl MetaType {
    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&MetaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

impl fmt::Debug for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaType")
            .field("type_name", &self.type_name)
            .field(
                "properties",
                &self.properties.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Accessors for one named property of a [`Bindable`] type.
///
/// `read` must return [`Value::None`] when handed an object of the wrong
/// concrete type; `write` returns whether the value was accepted.
pub struct MetaProperty {
    /// The property name.
    pub name: &'static str,
    /// Reads the current value.
    pub read: fn(&dyn Bindable) -> Value,
    /// Writes a new value, if the property is writable.
    pub write: Option<fn(&dyn Bindable, Value) -> bool>,
    /// Constructs a default value, for callers that materialize missing
    /// intermediate values.
    pub make_default: Option<fn() -> Value>,
}

impl fmt::Debug for MetaProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaProperty")
            .field("name", &self.name)
            .field("writable", &self.write.is_some())
            .field("has_default", &self.make_default.is_some())
            .finish()
    }
}

/// Errors from checked dynamic property access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The property was not found on the type.
    PropertyNotFound {
        /// The owning type's name.
        type_name: &'static str,
        /// The name of the property that was not found.
        name: String,
    },
    /// The property has no setter.
    ReadOnly {
        /// The name of the read-only property.
        name: &'static str,
    },
    /// The setter rejected the value.
    TypeMismatch {
        /// The name of the property.
        name: &'static str,
    },
    /// The property declares no default constructor.
    NoDefaultValue {
        /// The name of the property.
        name: &'static str,
    },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PropertyNotFound { type_name, name } => {
                write!(f, "Property '{}' not found on {}", name, type_name)
            }
            Self::ReadOnly { name } => write!(f, "Property '{}' is read-only", name),
            Self::TypeMismatch { name } => {
                write!(f, "Property '{}' rejected the value", name)
            }
            Self::NoDefaultValue { name } => {
                write!(f, "Property '{}' has no default value", name)
            }
        }
    }
}

impl std::error::Error for AccessError {}

/// Read a named property, failing when the property does not exist.
pub fn read_property(obj: &dyn Bindable, name: &str) -> Result<Value, AccessError> {
    let prop = obj
        .meta()
        .property(name)
        .ok_or_else(|| AccessError::PropertyNotFound {
            type_name: obj.meta().type_name,
            name: name.to_string(),
        })?;
    Ok((prop.read)(obj))
}

/// Write a named property, failing when it is missing, read-only, or the
/// setter rejects the value.
pub fn write_property(obj: &dyn Bindable, name: &str, value: Value) -> Result<(), AccessError> {
    let prop = obj
        .meta()
        .property(name)
        .ok_or_else(|| AccessError::PropertyNotFound {
            type_name: obj.meta().type_name,
            name: name.to_string(),
        })?;
    let write = prop.write.ok_or(AccessError::ReadOnly { name: prop.name })?;
    if write(obj, value) {
        Ok(())
    } else {
        Err(AccessError::TypeMismatch { name: prop.name })
    }
}

/// Construct the default value for a named property.
pub fn default_for(obj: &dyn Bindable, name: &str) -> Result<Value, AccessError> {
    let prop = obj
        .meta()
        .property(name)
        .ok_or_else(|| AccessError::PropertyNotFound {
            type_name: obj.meta().type_name,
            name: name.to_string(),
        })?;
    let make_default = prop
        .make_default
        .ok_or(AccessError::NoDefaultValue { name: prop.name })?;
    Ok(make_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;

    struct Gauge {
        level: RwLock<i64>,
    }

    fn gauge_level(obj: &dyn Bindable) -> Value {
        obj.as_any()
            .downcast_ref::<Gauge>()
            .map(|g| Value::Int(*g.level.read()))
            .unwrap_or(Value::None)
    }

    fn set_gauge_level(obj: &dyn Bindable, value: Value) -> bool {
        let Some(gauge) = obj.as_any().downcast_ref::<Gauge>() else {
            return false;
        };
        let Some(level) = value.as_int() else {
            return false;
        };
        *gauge.level.write() = level;
        true
    }

    fn default_level() -> Value {
        Value::Int(0)
    }

    static GAUGE_META: MetaType = MetaType {
        type_name: "Gauge",
        properties: &[MetaProperty {
            name: "level",
            read: gauge_level,
            write: Some(set_gauge_level),
            make_default: Some(default_level),
        }],
    };

    impl Bindable for Gauge {
        fn meta(&self) -> &'static MetaType {
            &GAUGE_META
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_property_lookup() {
        let gauge = Gauge {
            level: RwLock::new(3),
        };
        assert!(gauge.meta().property("level").is_some());
        assert!(gauge.meta().property("missing").is_none());
    }

    #[test]
    fn test_read_property() {
        let gauge = Gauge {
            level: RwLock::new(7),
        };
        assert_eq!(read_property(&gauge, "level"), Ok(Value::Int(7)));

        let err = read_property(&gauge, "missing").unwrap_err();
        assert_eq!(
            err,
            AccessError::PropertyNotFound {
                type_name: "Gauge",
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_write_property() {
        let gauge = Gauge {
            level: RwLock::new(0),
        };
        write_property(&gauge, "level", Value::Int(9)).unwrap();
        assert_eq!(*gauge.level.read(), 9);

        // Setter rejects non-integer values.
        let err = write_property(&gauge, "level", Value::Bool(true)).unwrap_err();
        assert_eq!(err, AccessError::TypeMismatch { name: "level" });
    }

    #[test]
    fn test_default_for() {
        let gauge = Gauge {
            level: RwLock::new(5),
        };
        assert_eq!(default_for(&gauge, "level"), Ok(Value::Int(0)));
    }

    #[test]
    fn test_wrong_concrete_type_reads_none() {
        struct Other;
        static OTHER_META: MetaType = MetaType {
            type_name: "Other",
            properties: &[],
        };
        impl Bindable for Other {
            fn meta(&self) -> &'static MetaType {
                &OTHER_META
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let other = Other;
        assert_eq!(gauge_level(&other), Value::None);
    }
}
