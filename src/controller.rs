//! User intents
//!
//! The page turns DOM events into an [`Intent`] and hands it to [`apply`].
//! Edit rules that belong to the page rather than the store live here.

use crate::consts::{ENTER_KEY, ESC_KEY};
use crate::error::Result;
use crate::storage::KeyValueStore;
use crate::store::ItemStore;

/// Something the user asked the list to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Submit the create form
    Create(String),
    /// ENTER in the rename input; ignored when `name` is empty
    Rename { index: usize, name: String },
    /// Rename input lost focus; an empty `name` deletes the item
    CommitEdit { index: usize, name: String },
    /// Row checkbox changed
    Toggle(usize),
    /// "Toggle all" button
    ToggleAll,
    /// Row delete button
    Delete(usize),
    /// "Delete all" button, after the confirmation dialog
    DeleteAll { confirmed: bool },
}

/// What a key press in the rename input does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditKey {
    /// ENTER with text: rename and close the editor
    Commit(String),
    /// ESC: put the stored name back and close the editor
    Revert,
    /// Keep editing. ENTER on an empty field lands here so that the
    /// following focus loss deletes the item.
    Continue,
}

impl EditKey {
    pub fn from_key(key_code: u32, value: &str) -> Self {
        match key_code {
            ENTER_KEY if !value.is_empty() => EditKey::Commit(value.to_string()),
            ESC_KEY => EditKey::Revert,
            _ => EditKey::Continue,
        }
    }
}

/// Apply an intent to the store
pub fn apply<S: KeyValueStore>(store: &mut ItemStore<S>, intent: Intent) -> Result<()> {
    match intent {
        Intent::Create(name) => {
            store.create_item(name.as_str())?;
        }
        Intent::Rename { index, name } => {
            if name.is_empty() {
                log::debug!("Rename of item {} ignored (empty name)", index);
            } else {
                store.change_item_name(index, name)?;
            }
        }
        Intent::CommitEdit { index, name } => {
            if name.is_empty() {
                store.delete_item(index)?;
            } else {
                store.change_item_name(index, name)?;
            }
        }
        Intent::Toggle(index) => {
            store.toggle_item(index)?;
        }
        Intent::ToggleAll => store.toggle_all_items()?,
        Intent::Delete(index) => {
            store.delete_item(index)?;
        }
        Intent::DeleteAll { confirmed } => {
            if confirmed {
                store.delete_all_items()?;
            } else {
                log::info!("Delete all cancelled");
            }
        }
    }
    Ok(())
}
