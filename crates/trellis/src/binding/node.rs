//! Per-segment resolution state for path walking.
//!
//! Each [`Node`] owns one segment of a binding path: the source value it
//! currently resolves against, the resolved value, a cached property
//! accessor, and the change subscription attached to its source. Nodes are
//! exclusively owned by their walker and live behind its lock; nothing
//! here is public API.
//!
//! Resolution failures (wrong source type, missing property, out-of-range
//! index) are recorded as broken state. They are expected during normal
//! operation - sources arrive late, lists shrink - and never escalate to
//! errors.

use std::any::TypeId;
use std::sync::Arc;

use trellis_core::{Bindable, ConnectionId, MetaProperty, ObservableList, Value};

use super::path::PathSegment;
use super::walker::BindingOptions;

/// Outcome of [`Node::set_source`].
pub(crate) enum SourceUpdate {
    /// The new source is the same instance; nothing was touched.
    Unchanged,
    /// The source was replaced and the node re-resolved. The old
    /// subscription was dropped; the caller installs a new one.
    Rewired,
}

enum SubscriptionTarget {
    Object(Arc<dyn Bindable>),
    List(Arc<ObservableList>),
}

/// A live connection from a source's change signal back into the walker.
///
/// Dropping the subscription disconnects it, so replacing a node's source
/// can never leave a stale listener behind.
pub(crate) struct NodeSubscription {
    target: SubscriptionTarget,
    id: ConnectionId,
}

impl NodeSubscription {
    pub(crate) fn object(source: Arc<dyn Bindable>, id: ConnectionId) -> Self {
        Self {
            target: SubscriptionTarget::Object(source),
            id,
        }
    }

    pub(crate) fn list(source: Arc<ObservableList>, id: ConnectionId) -> Self {
        Self {
            target: SubscriptionTarget::List(source),
            id,
        }
    }
}

impl Drop for NodeSubscription {
    fn drop(&mut self) {
        match &self.target {
            SubscriptionTarget::Object(obj) => {
                if let Some(signal) = obj.changed() {
                    signal.disconnect(self.id);
                }
            }
            SubscriptionTarget::List(list) => {
                list.changed().disconnect(self.id);
            }
        }
    }
}

/// Resolution state for one path segment.
///
/// A node with no segment is the pass-through node used for empty paths:
/// its value is its source.
pub(crate) struct Node {
    segment: Option<PathSegment>,
    source: Value,
    value: Value,
    broken: bool,
    /// Cached accessor for the source's concrete type. Revalidated only
    /// when the source's `TypeId` changes, so swapping between instances
    /// of the same type skips the lookup.
    accessor: Option<&'static MetaProperty>,
    source_type: Option<TypeId>,
    subscription: Option<NodeSubscription>,
}

impl Node {
    pub(crate) fn new(segment: Option<PathSegment>) -> Self {
        // A segment with no source yet has nothing to resolve against.
        let broken = segment.is_some();
        Self {
            segment,
            source: Value::None,
            value: Value::None,
            broken,
            accessor: None,
            source_type: None,
            subscription: None,
        }
    }

    pub(crate) fn segment(&self) -> Option<&PathSegment> {
        self.segment.as_ref()
    }

    pub(crate) fn source(&self) -> &Value {
        &self.source
    }

    pub(crate) fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn is_broken(&self) -> bool {
        self.broken
    }

    pub(crate) fn set_subscription(&mut self, subscription: Option<NodeSubscription>) {
        self.subscription = subscription;
    }

    /// Re-source the node.
    ///
    /// Assigning the same instance (or an equal scalar) is a strict no-op:
    /// no re-resolution, no subscription churn. Otherwise the old
    /// subscription is dropped and the node re-resolves against the new
    /// source.
    pub(crate) fn set_source(&mut self, source: Value, options: &BindingOptions) -> SourceUpdate {
        if self.source.same_instance(&source) {
            return SourceUpdate::Unchanged;
        }
        self.subscription = None;
        self.source = source;
        self.resolve(options);
        SourceUpdate::Rewired
    }

    /// Recompute the value from the current source.
    ///
    /// Used both after re-sourcing and when the source reports a content
    /// change. Returns whether the resolved value changed.
    pub(crate) fn resolve(&mut self, options: &BindingOptions) -> bool {
        let (value, broken) = self.compute(options);
        self.broken = broken;
        if self.value != value {
            self.value = value;
            true
        } else {
            false
        }
    }

    fn compute(&mut self, options: &BindingOptions) -> (Value, bool) {
        match self.segment.clone() {
            None => (self.source.clone(), false),
            Some(PathSegment::Property(name)) => self.read_member(&name, options),
            Some(PathSegment::Index(index)) => self.read_index(index, options),
        }
    }

    fn read_member(&mut self, name: &str, options: &BindingOptions) -> (Value, bool) {
        let Some(obj) = self.source.as_object().cloned() else {
            return (Value::None, true);
        };
        self.update_accessor(&obj, name);
        let Some(accessor) = self.accessor else {
            tracing::debug!(
                target: "trellis::binding",
                property = name,
                source_type = obj.meta().type_name,
                "property not found, link is broken"
            );
            return (Value::None, true);
        };

        let mut value = (accessor.read)(obj.as_ref());
        if value.is_none() && options.ensure_non_null {
            match (accessor.make_default, accessor.write) {
                (Some(make_default), Some(write)) => {
                    let default = make_default();
                    // Side-effecting read: the default is written back to
                    // the source so later readers see the same instance.
                    if write(obj.as_ref(), default.clone()) {
                        value = default;
                    }
                }
                _ => {
                    tracing::warn!(
                        target: "trellis::binding",
                        property = accessor.name,
                        source_type = obj.meta().type_name,
                        "cannot materialize default value for property"
                    );
                }
            }
        }
        (value, false)
    }

    fn read_index(&mut self, index: usize, options: &BindingOptions) -> (Value, bool) {
        match &self.source {
            Value::List(list) => {
                let list = list.clone();
                if let Some(value) = list.get(index) {
                    return (value, false);
                }
                if options.ensure_non_null {
                    if list.grow_to(index + 1) {
                        if let Some(value) = list.get(index) {
                            return (value, false);
                        }
                    } else {
                        tracing::warn!(
                            target: "trellis::binding",
                            index,
                            "list has no element factory, cannot grow to index"
                        );
                    }
                }
                (Value::None, true)
            }
            // Sources that are not lists may still expose the index as a
            // named property (string indexer).
            Value::Object(_) => self.read_member(&index.to_string(), options),
            _ => (Value::None, true),
        }
    }

    fn update_accessor(&mut self, obj: &Arc<dyn Bindable>, name: &str) {
        let type_id = obj.as_any().type_id();
        if self.source_type != Some(type_id) {
            self.source_type = Some(type_id);
            self.accessor = obj.meta().property(name);
        }
    }
}
