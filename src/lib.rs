//! Todo List - a single-page to-do list manager
//!
//! Core modules:
//! - `item`: The to-do record and list counts
//! - `store`: The item list, its mutations and its persisted mirror
//! - `storage`: Key-value persistence backends (LocalStorage on web)
//! - `controller`: User intents applied to the store
//! - `view`: What the page shows for a given store state

pub mod controller;
pub mod error;
pub mod item;
pub mod storage;
pub mod store;
pub mod view;

pub use controller::{EditKey, Intent};
pub use error::{Result, StoreError};
pub use item::{Item, ItemCounts};
pub use storage::{KeyValueStore, MemoryStorage};
pub use store::ItemStore;
pub use view::{ListRow, ListView};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

/// App configuration constants
pub mod consts {
    /// LocalStorage key holding the JSON-encoded item list
    pub const STORAGE_KEY: &str = "todoItems";

    /// Seed list installed when nothing has been persisted yet
    pub const DEFAULT_ITEMS_JSON: &str = r#"
    [
        {
            "name": "This item is done",
            "done": true
        },
        {
            "name": "This item is not done",
            "done": false
        }
    ]
    "#;

    /// Key codes handled by the rename input
    pub const ENTER_KEY: u32 = 13;
    pub const ESC_KEY: u32 = 27;
}
