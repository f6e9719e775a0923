//! Item selection tracking over an observable list.
//!
//! A [`SelectionModel`] pairs a [`RangeCollection`] of asserted index
//! intervals with the list of selected item values, and reports every
//! mutation as one batched notification: a signal emission carrying the
//! newly selected and newly deselected items, plus optional fan-out
//! through a [`Dispatcher`] under the codes in [`codes`].

use std::sync::Arc;

use trellis_core::{Dispatcher, ObservableList, PerfSpan, Signal, Value};

use super::ranges::RangeCollection;

/// Dispatcher codes published by [`SelectionModel`].
pub mod codes {
    /// Payload: the items that just became selected.
    pub const ITEMS_SELECTED: &str = "selection.items-selected";
    /// Payload: the items that just became deselected.
    pub const ITEMS_DESELECTED: &str = "selection.items-deselected";
}

/// How many items may be selected at once, and how range operations behave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// At most one item; selecting replaces the previous selection.
    #[default]
    Single,
    /// Any number of items, toggled individually.
    Multiple,
    /// Any number of items, with anchor-based range extension.
    Extended,
}

/// Tracks which items of a list are selected.
///
/// Items are identified the way [`Value`] identity works: objects and
/// lists by instance, scalars by value. A list holding duplicate scalar
/// entries therefore exposes them as one selectable item — the first
/// selected index claims it, and the duplicate index cannot be selected
/// separately.
pub struct SelectionModel {
    mode: SelectionMode,
    items: Option<Arc<ObservableList>>,
    selected: Vec<Value>,
    ranges: RangeCollection,
    selection_changed: Signal<(Vec<Value>, Vec<Value>)>,
    dispatcher: Option<Arc<Dispatcher<Vec<Value>>>>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self {
            mode: SelectionMode::default(),
            items: None,
            selected: Vec::new(),
            ranges: RangeCollection::new(),
            selection_changed: Signal::new(),
            dispatcher: None,
        }
    }

    /// Build a model that also publishes changes through `dispatcher`
    /// under [`codes::ITEMS_SELECTED`] and [`codes::ITEMS_DESELECTED`].
    pub fn with_dispatcher(dispatcher: Arc<Dispatcher<Vec<Value>>>) -> Self {
        let mut model = Self::new();
        model.dispatcher = Some(dispatcher);
        model
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Change the selection mode.
    ///
    /// The current selection survives the switch. Entering
    /// [`SelectionMode::Single`] takes effect on the next insertion, which
    /// clears whatever was selected before adding its one item.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
    }

    pub fn items(&self) -> Option<&Arc<ObservableList>> {
        self.items.as_ref()
    }

    /// Replace the item list. Any existing selection is cleared first.
    pub fn set_items(&mut self, items: Option<Arc<ObservableList>>) {
        self.clear_selection();
        self.items = items;
    }

    /// Emitted once per mutation with `(selected, deselected)` items.
    pub fn selection_changed(&self) -> &Signal<(Vec<Value>, Vec<Value>)> {
        &self.selection_changed
    }

    /// Select the item at `index`.
    ///
    /// In [`SelectionMode::Single`] this replaces the previous selection.
    /// Returns `false` if the index is out of range or already selected.
    pub fn select_index(&mut self, index: usize) -> bool {
        let mut deselected = Vec::new();
        let selected = self.insert_index(index, &mut deselected);
        let changed = !selected.is_empty() || !deselected.is_empty();
        self.notify(selected, deselected);
        changed
    }

    /// Deselect the item at `index`. Returns `false` if it was not selected.
    pub fn deselect_index(&mut self, index: usize) -> bool {
        let removed_range = self.ranges.remove_range(index, index);
        let removed_item = self
            .items
            .as_ref()
            .and_then(|items| items.get(index))
            .and_then(|item| {
                let position = self
                    .selected
                    .iter()
                    .position(|selected| selected.same_instance(&item))?;
                Some(self.selected.remove(position))
            });
        match removed_item {
            Some(item) => {
                self.notify(Vec::new(), vec![item]);
                true
            }
            None => removed_range,
        }
    }

    /// Select `index` if unselected, deselect it otherwise.
    pub fn toggle_index(&mut self, index: usize) {
        if self.is_index_selected(index) {
            self.deselect_index(index);
        } else {
            self.select_index(index);
        }
    }

    /// Select every index from `start` to `end`, walking in the given
    /// direction so `selected_items` reflects it.
    ///
    /// The span is clamped to the item list before anything is asserted,
    /// so ranges never cover indices that hold no item. A span entirely
    /// past the end selects nothing. In [`SelectionMode::Single`] only the
    /// `end` index is selected.
    pub fn select_range(&mut self, start: usize, end: usize) {
        if self.mode == SelectionMode::Single {
            self.select_index(end);
            return;
        }
        let Some((low, high)) = self.clamp_span(start, end) else {
            return;
        };
        let mut newly_selected = Vec::new();
        if start <= end {
            for index in low..=high {
                if let Some(item) = self.item_if_unselected(index) {
                    self.selected.push(item.clone());
                    newly_selected.push(item);
                }
            }
        } else {
            for index in (low..=high).rev() {
                if let Some(item) = self.item_if_unselected(index) {
                    self.selected.push(item.clone());
                    newly_selected.push(item);
                }
            }
        }
        self.ranges.add_range(low, high);
        self.notify(newly_selected, Vec::new());
    }

    /// Extend the selection from the current anchor to `end`.
    ///
    /// The anchor is the end of the most recently asserted range, read
    /// before any clearing; with no prior range it is index 0. When
    /// `clear_previous` is set the existing selection is dropped first and
    /// the batch reports both sides. The extended span is clamped to the
    /// item list like [`select_range`](Self::select_range).
    pub fn extend_range_to(&mut self, end: usize, clear_previous: bool) {
        let anchor = self.ranges.last().map(|range| range.end()).unwrap_or(0);
        let mut deselected = Vec::new();
        if clear_previous {
            deselected = std::mem::take(&mut self.selected);
            self.ranges.clear();
        }
        if self.mode == SelectionMode::Single {
            let selected = self.insert_index(end, &mut deselected);
            self.notify(selected, deselected);
            return;
        }
        let Some((low, high)) = self.clamp_span(anchor, end) else {
            self.notify(Vec::new(), deselected);
            return;
        };
        let mut newly_selected = Vec::new();
        if anchor <= end {
            for index in low..=high {
                if let Some(item) = self.item_if_unselected(index) {
                    self.selected.push(item.clone());
                    newly_selected.push(item);
                }
            }
        } else {
            for index in (low..=high).rev() {
                if let Some(item) = self.item_if_unselected(index) {
                    self.selected.push(item.clone());
                    newly_selected.push(item);
                }
            }
        }
        self.ranges.add_range(low, high);
        self.notify(newly_selected, deselected);
    }

    /// Select every item in the list.
    ///
    /// The asserted ranges are left exactly as they were: the full sweep
    /// is not recorded as a range, so a later extension still anchors on
    /// the last explicit assertion. No-op in [`SelectionMode::Single`].
    pub fn select_all(&mut self) {
        if self.mode == SelectionMode::Single {
            return;
        }
        let Some(items) = self.items.clone() else {
            return;
        };
        let _span = PerfSpan::new("selection.select_all");
        let backup = self.ranges.clone();
        let mut newly_selected = Vec::new();
        for index in 0..items.len() {
            if let Some(item) = self.item_if_unselected(index) {
                self.selected.push(item.clone());
                newly_selected.push(item);
            }
            self.ranges.add_range(index, index);
        }
        self.ranges = backup;
        self.notify(newly_selected, Vec::new());
    }

    /// Drop the entire selection, reporting every item as deselected.
    pub fn clear_selection(&mut self) {
        self.ranges.clear();
        let deselected = std::mem::take(&mut self.selected);
        self.notify(Vec::new(), deselected);
    }

    /// Whether `index` lies in any asserted range.
    pub fn is_index_selected(&self, index: usize) -> bool {
        self.ranges.contains_index(index)
    }

    /// The selected items, in selection order.
    pub fn selected_items(&self) -> Vec<Value> {
        self.selected.clone()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// The asserted index ranges.
    pub fn ranges(&self) -> &RangeCollection {
        &self.ranges
    }

    /// Select one index, honoring Single-mode replacement. Items pushed
    /// out of the selection are appended to `deselected`.
    fn insert_index(&mut self, index: usize, deselected: &mut Vec<Value>) -> Vec<Value> {
        let Some(item) = self.item_if_unselected(index) else {
            return Vec::new();
        };
        if self.mode == SelectionMode::Single {
            deselected.append(&mut self.selected);
            self.ranges.clear();
        }
        self.selected.push(item.clone());
        self.ranges.add_range(index, index);
        vec![item]
    }

    /// Normalize a span to the indices the item list actually holds.
    ///
    /// Returns `None` when there is no list, the list is empty, or the
    /// span lies entirely past its end.
    fn clamp_span(&self, a: usize, b: usize) -> Option<(usize, usize)> {
        let count = self.items.as_ref()?.len();
        let (low, high) = (a.min(b), a.max(b));
        if count == 0 || low >= count {
            return None;
        }
        Some((low, high.min(count - 1)))
    }

    /// The item at `index`, unless it is missing or already selected.
    fn item_if_unselected(&self, index: usize) -> Option<Value> {
        let item = self.items.as_ref()?.get(index)?;
        if self
            .selected
            .iter()
            .any(|selected| selected.same_instance(&item))
        {
            return None;
        }
        Some(item)
    }

    fn notify(&self, selected: Vec<Value>, deselected: Vec<Value>) {
        if selected.is_empty() && deselected.is_empty() {
            return;
        }
        tracing::trace!(
            target: "trellis::selection",
            selected = selected.len(),
            deselected = deselected.len(),
            "selection changed"
        );
        if let Some(dispatcher) = &self.dispatcher {
            if !selected.is_empty() {
                dispatcher.notify(codes::ITEMS_SELECTED, &selected);
            }
            if !deselected.is_empty() {
                dispatcher.notify(codes::ITEMS_DESELECTED, &deselected);
            }
        }
        self.selection_changed.emit((selected, deselected));
    }
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::new()
    }
}
