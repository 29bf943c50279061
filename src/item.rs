//! To-do items
//!
//! Persisted as `{"name": ..., "done": ...}` objects inside a JSON array.

use serde::{Deserialize, Serialize};

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Text label
    pub name: String,
    /// Completion flag
    pub done: bool,
}

impl Item {
    /// Create a not-yet-done item
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
        }
    }
}

/// Totals shown in the list footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemCounts {
    pub num_items: usize,
    pub num_done_items: usize,
}

impl ItemCounts {
    /// Count items and done items in one pass
    pub fn of(items: &[Item]) -> Self {
        Self {
            num_items: items.len(),
            num_done_items: items.iter().filter(|item| item.done).count(),
        }
    }

    /// Every item is done (vacuously true for an empty list)
    pub fn all_done(&self) -> bool {
        self.num_done_items == self.num_items
    }
}
