//! Trellis: data binding and selection for item-based views.
//!
//! This crate builds on [`trellis_core`] to provide the two models a
//! tabular view needs:
//!
//! - [`binding`]: a property-path engine. Parse a path like
//!   `orders[0].customer.name` into a [`binding::BindingPath`], then bind
//!   it to a live object graph with a [`binding::PathWalker`] that keeps
//!   the resolved value current as sources change.
//! - [`model`]: selection tracking. A [`model::SelectionModel`] records
//!   selected items and asserted index ranges over an
//!   [`ObservableList`], batching every mutation into a single
//!   notification.
//!
//! # Example
//!
//! ```ignore
//! use trellis::binding::PathWalker;
//!
//! let walker = PathWalker::new("customer.name")?;
//! walker.value_changed().connect(|name| println!("name: {:?}", name));
//! walker.update(order_value);
//! ```

pub mod binding;
pub mod model;

mod error;

pub use error::PathError;

pub use trellis_core::{
    Bindable, Dispatcher, ListChange, MetaProperty, MetaType, ObservableList, Property, Signal,
    SubscriptionId, Value,
};
