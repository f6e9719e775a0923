//! Selection state over item lists.

pub mod ranges;
pub mod selection;

pub use ranges::{Interval, RangeCollection};
pub use selection::{SelectionMode, SelectionModel, codes};
