//! Core systems for Trellis.
//!
//! This crate provides the foundational components of the Trellis binding
//! toolkit:
//!
//! - **Signal/Slot System**: Type-safe change notification
//! - **Observer Dispatch**: Code-keyed handler registries
//! - **Property System**: Reactive cells with change detection
//! - **Dynamic Values**: Type-erased values and observable lists
//! - **Schema Tables**: Static property metadata for dynamic access
//!
//! # Signal Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//!
//! value_changed.disconnect(conn_id);
//! ```
//!
//! # Dispatcher Example
//!
//! ```
//! use trellis_core::Dispatcher;
//!
//! let dispatcher = Dispatcher::<Vec<String>>::new();
//!
//! let id = dispatcher.register("rows.selected", |rows| {
//!     println!("{} rows selected", rows.len());
//! });
//!
//! dispatcher.notify("rows.selected", &vec!["a".to_string()]);
//! dispatcher.remove(id);
//! ```

pub mod dispatcher;
pub mod logging;
pub mod meta;
pub mod property;
pub mod signal;
pub mod value;

pub use dispatcher::{Dispatcher, DispatcherGuard, SubscriptionId};
pub use logging::PerfSpan;
pub use meta::{AccessError, Bindable, MetaProperty, MetaType, default_for, read_property, write_property};
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use value::{ListChange, ObservableList, Value};
