//! Outbound Ports (Driven Ports)

use shared_types::NumericId;
use std::collections::BTreeSet;

/// Source of the host's live element selection.
///
/// Only read when the selection rule actually needs it.
pub trait SelectionSource {
    /// Currently selected elements, or `None` when no selection can be read
    /// (no active view, no UI context).
    fn current_selection(&self) -> Option<BTreeSet<NumericId>>;
}

/// Selection source for contexts without a live selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelection;

impl SelectionSource for NoSelection {
    fn current_selection(&self) -> Option<BTreeSet<NumericId>> {
        None
    }
}

/// A fixed, known selection.
impl SelectionSource for BTreeSet<NumericId> {
    fn current_selection(&self) -> Option<BTreeSet<NumericId>> {
        Some(self.clone())
    }
}

impl<S: SelectionSource + ?Sized> SelectionSource for &S {
    fn current_selection(&self) -> Option<BTreeSet<NumericId>> {
        (**self).current_selection()
    }
}
