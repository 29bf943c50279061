//! What the page shows
//!
//! Pure layout decisions; the DOM code in the binary only applies them.

use crate::item::ItemCounts;
use crate::storage::KeyValueStore;
use crate::store::ItemStore;

/// One `<li>` of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// Store index, used as the element id
    pub index: usize,
    pub name: String,
    /// Checkbox state and label strikethrough
    pub done: bool,
}

impl ListRow {
    /// Element id of the row
    pub fn dom_id(&self) -> String {
        self.index.to_string()
    }
}

/// Everything needed to redraw the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Newest item first
    pub rows: Vec<ListRow>,
    pub counts: ItemCounts,
    pub show_toggle_all: bool,
    pub show_create_button: bool,
}

impl ListView {
    /// Build the view for the current store and the create input's text
    pub fn build<S: KeyValueStore>(store: &ItemStore<S>, draft: &str) -> Self {
        let rows = store
            .items()
            .iter()
            .enumerate()
            .rev()
            .map(|(index, item)| ListRow {
                index,
                name: item.name.clone(),
                done: item.done,
            })
            .collect();
        let counts = store.count_items();

        Self {
            rows,
            counts,
            show_toggle_all: counts.num_items > 0,
            show_create_button: !draft.is_empty(),
        }
    }

    /// Footer text
    pub fn summary(&self) -> String {
        let noun = if self.counts.num_items == 1 { "item" } else { "items" };
        format!(
            "{} {}, {} done",
            self.counts.num_items, noun, self.counts.num_done_items
        )
    }
}

/// Parse a row element id back into a store index
pub fn parse_dom_id(id: &str) -> Option<usize> {
    id.parse().ok()
}
