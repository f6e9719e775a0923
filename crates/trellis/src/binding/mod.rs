//! Property-path binding engine.
//!
//! Three layers, bottom up:
//!
//! - [`path`]: parsing path text like `orders[0].customer.name` into a
//!   [`BindingPath`] of [`PathSegment`]s.
//! - `node` (internal): per-segment resolution state with cached property
//!   accessors and source change subscriptions.
//! - [`walker`]: the [`PathWalker`], which binds a path to a live object
//!   graph and keeps the final value current as sources change.

mod node;
pub mod path;
pub mod walker;

pub use path::{BindingPath, PathSegment};
pub use walker::{BindingOptions, PathWalker};
