//! Drag-reorder coordination for layout children
//!
//! Tracks which child is being dragged and which one is the current drop
//! target. On drop it produces a new, reordered copy of the sibling list
//! and hands it to a callback; the source list is never touched. Persisting
//! the new order is the caller's job.

/// Ephemeral drag state for one list of siblings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragReorder {
    dragged_index: Option<usize>,
    drag_over_index: Option<usize>,
}

impl DragReorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_start(&mut self, index: usize) {
        self.dragged_index = Some(index);
        self.drag_over_index = None;
    }

    /// Mark `index` as the insertion point while a drag is active
    pub fn drag_over(&mut self, index: usize) {
        if matches!(self.dragged_index, Some(dragged) if dragged != index) {
            self.drag_over_index = Some(index);
        }
    }

    pub fn drag_enter(&mut self, index: usize) {
        self.drag_over(index);
    }

    /// The pointer left a child; `pointer_in_region` says whether it is still
    /// inside the list as a whole (e.g. it moved onto a sibling)
    pub fn drag_leave(&mut self, pointer_in_region: bool) {
        if !pointer_in_region {
            self.drag_over_index = None;
        }
    }

    /// Drag finished or was cancelled
    pub fn drag_end(&mut self) {
        self.reset();
    }

    /// Drop the dragged item onto `target`
    ///
    /// The target index is interpreted after the dragged item has been
    /// removed. `on_reorder` receives the new full list and is only invoked
    /// when the order actually changes. Returns whether it was invoked.
    pub fn drop<T: Clone>(
        &mut self,
        target: usize,
        items: &[T],
        on_reorder: impl FnOnce(Vec<T>),
    ) -> bool {
        let dragged = self.dragged_index;
        self.reset();

        let Some(from) = dragged else {
            return false;
        };
        if from == target || from >= items.len() {
            return false;
        }

        let reordered = move_item(items, from, target);
        log::debug!("Reordered item {} to {}", from, target.min(items.len() - 1));
        on_reorder(reordered);
        true
    }

    pub fn is_dragging(&self, index: usize) -> bool {
        self.dragged_index == Some(index)
    }

    pub fn is_dragged_over(&self, index: usize) -> bool {
        self.drag_over_index == Some(index)
    }

    pub fn is_active(&self) -> bool {
        self.dragged_index.is_some()
    }

    pub fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    pub fn drag_over_index(&self) -> Option<usize> {
        self.drag_over_index
    }

    fn reset(&mut self) {
        self.dragged_index = None;
        self.drag_over_index = None;
    }
}

/// Splice the item at `from` out and back in at `to`
///
/// `to` is clamped to the last position of the list after removal.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut reordered = items.to_vec();
    if from >= reordered.len() {
        return reordered;
    }
    let item = reordered.remove(from);
    let to = to.min(reordered.len());
    reordered.insert(to, item);
    reordered
}
