//! Selection state for the data table.
//!
//! Selection is tracked by [`RowId`] so it stays stable while rows are
//! filtered, sorted or paged.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::row::RowId;

/// Selection mode for the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// No selection allowed
    None,
    /// Single row selection
    Single,
    /// Any number of rows
    #[default]
    Multiple,
}

/// ID-based selection state.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Currently selected IDs
    selected: HashSet<RowId>,
}

impl Selection {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all selected IDs (sorted for deterministic ordering).
    pub fn selected(&self) -> Vec<RowId> {
        let mut ids: Vec<_> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Check if an ID is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Get the number of selected items.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clear all selection.
    /// Returns the IDs that were deselected.
    pub fn clear(&mut self) -> Vec<RowId> {
        self.selected.drain().collect()
    }

    /// Select a single ID (clears others).
    /// Returns (added, removed) IDs.
    pub fn select(&mut self, id: &RowId) -> (Vec<RowId>, Vec<RowId>) {
        let removed: Vec<_> = self.selected.iter().filter(|&i| i != id).cloned().collect();
        let was_selected = self.selected.contains(id);
        self.selected.clear();
        self.selected.insert(id.clone());
        let added = if was_selected { vec![] } else { vec![id.clone()] };
        (added, removed)
    }

    /// Toggle selection of an ID.
    /// Returns (added, removed) IDs.
    pub fn toggle(&mut self, id: &RowId) -> (Vec<RowId>, Vec<RowId>) {
        if self.selected.remove(id) {
            (vec![], vec![id.clone()])
        } else {
            self.selected.insert(id.clone());
            (vec![id.clone()], vec![])
        }
    }

    /// Select all of `ids`.
    /// Returns the IDs that were newly selected.
    pub fn select_all(&mut self, ids: &[RowId]) -> Vec<RowId> {
        ids.iter()
            .filter(|id| self.selected.insert((*id).clone()))
            .cloned()
            .collect()
    }

    /// Deselect all of `ids`, leaving other selected IDs alone.
    /// Returns the IDs that were deselected.
    pub fn deselect_all(&mut self, ids: &[RowId]) -> Vec<RowId> {
        ids.iter()
            .filter(|id| self.selected.remove(*id))
            .cloned()
            .collect()
    }

    /// Drop a single ID without reporting.
    pub fn forget(&mut self, id: &RowId) {
        self.selected.remove(id);
    }

    /// Keep only the IDs for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&RowId) -> bool) {
        self.selected.retain(|id| keep(id));
    }
}
