//! Path walking over live object graphs.
//!
//! A [`PathWalker`] binds a parsed [`BindingPath`] to a chain of
//! [`Node`](super::node::Node)s, one per segment, and keeps the chain's
//! final value current as sources change underneath it. Intermediate
//! changes never surface individually: however deep a change originates,
//! the walker re-resolves from that point down and emits at most one
//! [`value_changed`](PathWalker::value_changed) notification, and only
//! when the final value actually differs.
//!
//! # Broken Links
//!
//! A link anywhere in the chain that cannot resolve (missing property,
//! out-of-range index, `None` intermediate) makes the whole walker
//! broken: [`is_broken`](PathWalker::is_broken) reports `true` and the
//! final value is `None`. Broken state is ordinary and recoverable; the
//! next source change re-resolves.
//!
//! # Example
//!
//! ```ignore
//! let walker = PathWalker::new("orders[0].total")?;
//! walker.value_changed().connect(|value| println!("total: {:?}", value));
//! walker.update(customer_value);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use trellis_core::{Property, Signal, Value};

use super::node::{Node, NodeSubscription, SourceUpdate};
use super::path::{BindingPath, PathSegment};
use crate::error::PathError;

/// Resolution policy for a walker.
#[derive(Debug, Clone, Copy, Default)]
pub struct BindingOptions {
    /// Materialize missing intermediate values while resolving: `None`
    /// properties are default-constructed and written back to their
    /// source, and lists grow (through their element factory) to reach
    /// an out-of-range index. Off by default because resolution becomes
    /// a side-effecting operation.
    pub ensure_non_null: bool,
}

struct WalkerInner {
    path: BindingPath,
    options: BindingOptions,
    nodes: Mutex<Vec<Node>>,
    /// Guards against re-entrant resolution: an ensure_non_null
    /// write-back notifies the source's listeners while the pass that
    /// wrote it still holds the node lock. Such notifications are
    /// dropped; the running pass already carries the written value.
    resolving: AtomicBool,
    broken: AtomicBool,
    final_value: Property<Value>,
    value_changed: Signal<Value>,
}

/// Resolves a property path against a source value and tracks changes.
///
/// Dropping the walker disconnects every change subscription it holds on
/// source objects and lists.
pub struct PathWalker {
    inner: Arc<WalkerInner>,
}

impl PathWalker {
    /// Build a walker over a strictly parsed path.
    pub fn new(path: &str) -> Result<Self, PathError> {
        Self::with_options(path, BindingOptions::default())
    }

    /// Build a walker over a strictly parsed path with explicit options.
    pub fn with_options(path: &str, options: BindingOptions) -> Result<Self, PathError> {
        Ok(Self::from_path(BindingPath::parse(path)?, options))
    }

    /// Build a walker over a leniently parsed path.
    ///
    /// A malformed path yields a walker that is permanently broken with a
    /// `None` value rather than an error.
    pub fn lenient(path: &str) -> Self {
        Self::lenient_with_options(path, BindingOptions::default())
    }

    /// Build a lenient walker with explicit options.
    pub fn lenient_with_options(path: &str, options: BindingOptions) -> Self {
        Self::from_path(BindingPath::parse_lenient(path), options)
    }

    fn from_path(path: BindingPath, options: BindingOptions) -> Self {
        let nodes = if !path.is_usable() {
            Vec::new()
        } else if path.segments().is_empty() {
            // Empty and parenthesized paths bind straight to the source.
            vec![Node::new(None)]
        } else {
            path.segments()
                .iter()
                .map(|segment| Node::new(Some(segment.clone())))
                .collect()
        };
        let broken = !path.is_usable() || nodes.iter().any(Node::is_broken);
        Self {
            inner: Arc::new(WalkerInner {
                path,
                options,
                nodes: Mutex::new(nodes),
                resolving: AtomicBool::new(false),
                broken: AtomicBool::new(broken),
                final_value: Property::new(Value::None),
                value_changed: Signal::new(),
            }),
        }
    }

    /// The path this walker resolves.
    pub fn path(&self) -> &BindingPath {
        &self.inner.path
    }

    /// Synchronously re-source the chain from a new root.
    ///
    /// Re-assigning the current root instance is a no-op. Emits
    /// [`value_changed`](Self::value_changed) once if the final value
    /// changed.
    #[tracing::instrument(skip_all, target = "trellis::binding", level = "trace")]
    pub fn update(&self, root: Value) {
        WalkerInner::rebind_from(&self.inner, 0, root);
    }

    /// Resolve the path against `item` once and return the value.
    ///
    /// The walker binds to the item, reads the final value, then unbinds,
    /// leaving no live subscriptions behind.
    pub fn get_value(&self, item: Value) -> Value {
        self.update(item);
        let value = self.inner.final_value.get();
        self.update(Value::None);
        value
    }

    /// The chain's current final value (`None` while broken).
    pub fn final_value(&self) -> Value {
        self.inner.final_value.get()
    }

    /// Whether any link in the chain failed to resolve.
    pub fn is_broken(&self) -> bool {
        self.inner.broken.load(Ordering::SeqCst)
    }

    /// Emitted with the new final value whenever it changes.
    pub fn value_changed(&self) -> &Signal<Value> {
        &self.inner.value_changed
    }
}

impl WalkerInner {
    /// Re-source nodes from `start` down and publish the result.
    fn rebind_from(inner: &Arc<Self>, start: usize, source: Value) {
        if !inner.path.is_usable() {
            return;
        }
        if inner.resolving.swap(true, Ordering::SeqCst) {
            return;
        }
        let emitted = {
            let mut nodes = inner.nodes.lock();
            let mut src = source;
            let mut index = start;
            while index < nodes.len() {
                match nodes[index].set_source(src, &inner.options) {
                    // Same source instance: nothing downstream can have
                    // changed through this assignment.
                    SourceUpdate::Unchanged => break,
                    SourceUpdate::Rewired => {
                        Self::attach_subscription(inner, &mut nodes[index], index);
                        src = nodes[index].value().clone();
                        index += 1;
                    }
                }
            }
            Self::publish(inner, &nodes)
        };
        inner.resolving.store(false, Ordering::SeqCst);
        if let Some(value) = emitted {
            inner.value_changed.emit(value);
        }
    }

    /// Re-resolve node `index` after its source reported a content
    /// change, cascading downward only if the node's value changed.
    fn refresh_from(inner: &Arc<Self>, index: usize) {
        if !inner.path.is_usable() {
            return;
        }
        if inner.resolving.swap(true, Ordering::SeqCst) {
            return;
        }
        let emitted = {
            let mut nodes = inner.nodes.lock();
            if index >= nodes.len() {
                None
            } else {
                if nodes[index].resolve(&inner.options) {
                    let mut src = nodes[index].value().clone();
                    let mut next = index + 1;
                    while next < nodes.len() {
                        match nodes[next].set_source(src, &inner.options) {
                            SourceUpdate::Unchanged => break,
                            SourceUpdate::Rewired => {
                                Self::attach_subscription(inner, &mut nodes[next], next);
                                src = nodes[next].value().clone();
                                next += 1;
                            }
                        }
                    }
                }
                Self::publish(inner, &nodes)
            }
        };
        inner.resolving.store(false, Ordering::SeqCst);
        if let Some(value) = emitted {
            inner.value_changed.emit(value);
        }
    }

    /// Recompute broken state and the final value. Returns the value to
    /// emit, if it changed.
    fn publish(inner: &Arc<Self>, nodes: &[Node]) -> Option<Value> {
        let broken = nodes.iter().any(Node::is_broken);
        inner.broken.store(broken, Ordering::SeqCst);
        let final_value = if broken {
            Value::None
        } else {
            nodes
                .last()
                .map(|node| node.value().clone())
                .unwrap_or(Value::None)
        };
        if inner.final_value.set(final_value.clone()) {
            Some(final_value)
        } else {
            None
        }
    }

    /// Subscribe to the node's new source so content changes re-resolve
    /// from this node down. Sources without a change signal resolve once
    /// and go quiet.
    fn attach_subscription(inner: &Arc<Self>, node: &mut Node, index: usize) {
        let subscription = match (node.segment(), node.source()) {
            (Some(PathSegment::Property(name)), Value::Object(obj)) => {
                obj.changed().map(|signal| {
                    let weak = Arc::downgrade(inner);
                    let name = name.clone();
                    let id = signal.connect(move |changed: &String| {
                        if changed.is_empty() || *changed == name {
                            if let Some(inner) = weak.upgrade() {
                                WalkerInner::refresh_from(&inner, index);
                            }
                        }
                    });
                    NodeSubscription::object(obj.clone(), id)
                })
            }
            (Some(PathSegment::Index(_)), Value::List(list)) => {
                let weak = Arc::downgrade(inner);
                let id = list.changed().connect(move |_| {
                    if let Some(inner) = weak.upgrade() {
                        WalkerInner::refresh_from(&inner, index);
                    }
                });
                Some(NodeSubscription::list(list.clone(), id))
            }
            // String-indexer fallback: listen for the index-named property.
            (Some(PathSegment::Index(i)), Value::Object(obj)) => {
                let name = i.to_string();
                obj.changed().map(|signal| {
                    let weak = Arc::downgrade(inner);
                    let id = signal.connect(move |changed: &String| {
                        if changed.is_empty() || *changed == name {
                            if let Some(inner) = weak.upgrade() {
                                WalkerInner::refresh_from(&inner, index);
                            }
                        }
                    });
                    NodeSubscription::object(obj.clone(), id)
                })
            }
            _ => None,
        };
        node.set_subscription(subscription);
    }
}

assert_impl_all!(PathWalker: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::{Mutex, RwLock};
    use std::any::Any;
    use trellis_core::{Bindable, MetaProperty, MetaType, ObservableList};

    struct TestNode {
        child: RwLock<Value>,
        score: RwLock<i64>,
        changed: Signal<String>,
    }

    impl TestNode {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                child: RwLock::new(Value::None),
                score: RwLock::new(0),
                changed: Signal::new(),
            })
        }

        fn set_child(&self, value: Value) {
            *self.child.write() = value;
            self.changed.emit("child".to_string());
        }

        fn set_score(&self, score: i64) {
            *self.score.write() = score;
            self.changed.emit("score".to_string());
        }
    }

    fn read_child(obj: &dyn Bindable) -> Value {
        obj.as_any()
            .downcast_ref::<TestNode>()
            .map(|node| node.child.read().clone())
            .unwrap_or(Value::None)
    }

    fn write_child(obj: &dyn Bindable, value: Value) -> bool {
        let Some(node) = obj.as_any().downcast_ref::<TestNode>() else {
            return false;
        };
        node.set_child(value);
        true
    }

    fn default_child() -> Value {
        Value::Object(TestNode::new() as Arc<dyn Bindable>)
    }

    fn read_score(obj: &dyn Bindable) -> Value {
        obj.as_any()
            .downcast_ref::<TestNode>()
            .map(|node| Value::Int(*node.score.read()))
            .unwrap_or(Value::None)
    }

    static TEST_NODE_META: MetaType = MetaType {
        type_name: "TestNode",
        properties: &[
            MetaProperty {
                name: "child",
                read: read_child,
                write: Some(write_child),
                make_default: Some(default_child),
            },
            MetaProperty {
                name: "score",
                read: read_score,
                write: None,
                make_default: None,
            },
        ],
    };

    impl Bindable for TestNode {
        fn meta(&self) -> &'static MetaType {
            &TEST_NODE_META
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn changed(&self) -> Option<&Signal<String>> {
            Some(&self.changed)
        }
    }

    fn obj(node: &Arc<TestNode>) -> Value {
        Value::Object(node.clone() as Arc<dyn Bindable>)
    }

    #[test]
    fn empty_path_passes_the_root_through() {
        let walker = PathWalker::new("").unwrap();
        assert!(!walker.is_broken());

        walker.update(Value::Int(5));
        assert_eq!(walker.final_value(), Value::Int(5));
        assert!(!walker.is_broken());
    }

    #[test]
    fn unusable_path_is_permanently_broken() {
        let walker = PathWalker::lenient(".bad.path");
        assert!(walker.is_broken());

        walker.update(Value::Int(5));
        assert!(walker.is_broken());
        assert_eq!(walker.final_value(), Value::None);
    }

    #[test]
    fn fresh_walker_with_segments_is_broken_until_sourced() {
        let walker = PathWalker::new("score").unwrap();
        assert!(walker.is_broken());
        assert_eq!(walker.final_value(), Value::None);

        let node = TestNode::new();
        node.set_score(7);
        walker.update(obj(&node));
        assert!(!walker.is_broken());
        assert_eq!(walker.final_value(), Value::Int(7));
    }

    #[test]
    fn chain_resolves_through_objects() {
        let root = TestNode::new();
        let leaf = TestNode::new();
        leaf.set_score(42);
        root.set_child(obj(&leaf));

        let walker = PathWalker::new("child.score").unwrap();
        walker.update(obj(&root));
        assert_eq!(walker.final_value(), Value::Int(42));
    }

    #[test]
    fn source_change_propagates_one_notification() {
        let root = TestNode::new();
        let leaf = TestNode::new();
        root.set_child(obj(&leaf));

        let walker = PathWalker::new("child.score").unwrap();
        walker.update(obj(&root));

        let emissions = std::sync::Arc::new(Mutex::new(Vec::new()));
        let emissions_clone = emissions.clone();
        walker.value_changed().connect(move |value| {
            emissions_clone.lock().push(value.clone());
        });

        leaf.set_score(3);
        assert_eq!(*emissions.lock(), vec![Value::Int(3)]);
        assert_eq!(walker.final_value(), Value::Int(3));

        // Same value again: re-resolution happens, but nothing is emitted.
        leaf.set_score(3);
        assert_eq!(emissions.lock().len(), 1);
    }

    #[test]
    fn swapping_an_intermediate_rewires_downstream() {
        let root = TestNode::new();
        let first = TestNode::new();
        first.set_score(1);
        root.set_child(obj(&first));

        let walker = PathWalker::new("child.score").unwrap();
        walker.update(obj(&root));
        assert_eq!(walker.final_value(), Value::Int(1));

        let second = TestNode::new();
        second.set_score(2);
        root.set_child(obj(&second));
        assert_eq!(walker.final_value(), Value::Int(2));

        // The old leaf no longer has a listener.
        assert_eq!(first.changed.connection_count(), 0);
        assert_eq!(second.changed.connection_count(), 1);

        // Changes on the detached object are ignored.
        first.set_score(99);
        assert_eq!(walker.final_value(), Value::Int(2));
    }

    #[test]
    fn updating_with_same_root_does_not_duplicate_subscriptions() {
        let root = TestNode::new();
        let walker = PathWalker::new("score").unwrap();

        walker.update(obj(&root));
        assert_eq!(root.changed.connection_count(), 1);

        walker.update(obj(&root));
        assert_eq!(root.changed.connection_count(), 1);
    }

    #[test]
    fn broken_intermediate_yields_none_without_error() {
        let root = TestNode::new();
        // child is None; "child.score" cannot resolve past the first hop.
        let walker = PathWalker::new("child.score").unwrap();
        walker.update(obj(&root));
        assert!(walker.is_broken());
        assert_eq!(walker.final_value(), Value::None);

        // Recovers once the intermediate arrives.
        let leaf = TestNode::new();
        leaf.set_score(8);
        root.set_child(obj(&leaf));
        assert!(!walker.is_broken());
        assert_eq!(walker.final_value(), Value::Int(8));
    }

    #[test]
    fn list_changes_re_resolve_the_index() {
        let list = Arc::new(ObservableList::from_values(vec![Value::Int(1)]));
        let walker = PathWalker::new("[0]").unwrap();
        walker.update(Value::List(list.clone()));
        assert_eq!(walker.final_value(), Value::Int(1));

        list.set(0, Value::Int(5));
        assert_eq!(walker.final_value(), Value::Int(5));

        list.remove(0);
        assert!(walker.is_broken());
        assert_eq!(walker.final_value(), Value::None);

        list.push(Value::Int(7));
        assert!(!walker.is_broken());
        assert_eq!(walker.final_value(), Value::Int(7));
    }

    #[test]
    fn get_value_reads_once_and_unbinds() {
        let node = TestNode::new();
        node.set_score(11);

        let walker = PathWalker::new("score").unwrap();
        assert_eq!(walker.get_value(obj(&node)), Value::Int(11));
        assert_eq!(node.changed.connection_count(), 0);
        assert_eq!(walker.final_value(), Value::None);
    }

    #[test]
    fn ensure_non_null_materializes_intermediates() {
        let root = TestNode::new();
        let options = BindingOptions {
            ensure_non_null: true,
        };
        let walker = PathWalker::with_options("child.score", options).unwrap();

        walker.update(obj(&root));
        // The missing child was default-constructed and written back.
        assert!(!walker.is_broken());
        assert_eq!(walker.final_value(), Value::Int(0));
        assert!(root.child.read().is_some());
    }

    #[test]
    fn dropping_the_walker_releases_subscriptions() {
        let node = TestNode::new();
        {
            let walker = PathWalker::new("score").unwrap();
            walker.update(obj(&node));
            assert_eq!(node.changed.connection_count(), 1);
        }
        assert_eq!(node.changed.connection_count(), 0);
    }
}
