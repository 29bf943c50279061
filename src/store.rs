//! The item store
//!
//! Owns the ordered item list and mirrors it into a key-value backend as a
//! JSON array. The in-memory list is authoritative; the backend is rewritten
//! in full on every mutation. A mutation whose write fails returns the error
//! and leaves the in-memory list as it was.
//!
//! Items are addressed by position. Deleting an item shifts every later item
//! down by one, so callers must not hold on to indices across deletes.

use crate::consts::{DEFAULT_ITEMS_JSON, STORAGE_KEY};
use crate::error::{Result, StoreError};
use crate::item::{Item, ItemCounts};
use crate::storage::KeyValueStore;

/// Ordered to-do list backed by a key-value store
#[derive(Debug)]
pub struct ItemStore<S: KeyValueStore> {
    items: Vec<Item>,
    storage: S,
    key: String,
}

impl<S: KeyValueStore> ItemStore<S> {
    /// Open the store under the default key and load its items
    pub fn open(storage: S) -> Result<Self> {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// Open the store under a custom key and load its items
    pub fn with_key(storage: S, key: impl Into<String>) -> Result<Self> {
        let mut store = Self {
            items: Vec::new(),
            storage,
            key: key.into(),
        };
        store.load()?;
        Ok(store)
    }

    /// Replace the in-memory list with the persisted one, or with the
    /// default seed when nothing has been persisted yet.
    ///
    /// On a parse failure the current list is kept.
    pub fn load(&mut self) -> Result<()> {
        match self.storage.get(&self.key)? {
            Some(json) => {
                self.items = parse_items(&json)?;
                log::info!("Loaded {} items from storage", self.items.len());
            }
            None => {
                self.items = parse_items(DEFAULT_ITEMS_JSON)?;
                log::info!("No stored items, using default list");
            }
        }
        Ok(())
    }

    /// Write the whole list to the backend
    pub fn save(&mut self) -> Result<()> {
        write_items(&mut self.storage, &self.key, &self.items)
    }

    /// Persist `items` and adopt them only once the write went through
    fn commit(&mut self, items: Vec<Item>) -> Result<()> {
        write_items(&mut self.storage, &self.key, &items)?;
        self.items = items;
        Ok(())
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn count_items(&self) -> ItemCounts {
        ItemCounts::of(&self.items)
    }

    /// Append a not-done item.
    ///
    /// Absent or empty names are ignored. Returns whether an item was added.
    pub fn create_item<'a>(&mut self, name: impl Into<Option<&'a str>>) -> Result<bool> {
        let name: Option<&str> = name.into();
        let Some(name) = name.filter(|name| !name.is_empty()) else {
            log::debug!("Ignoring empty item name");
            return Ok(false);
        };
        let mut items = self.items.clone();
        items.push(Item::new(name));
        self.commit(items)?;
        log::debug!("Created item {}: {:?}", self.items.len() - 1, name);
        Ok(true)
    }

    /// Overwrite the name at `index`. Any string is accepted, empty included.
    pub fn change_item_name(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        self.check_index(index)?;
        let mut items = self.items.clone();
        items[index].name = name.into();
        self.commit(items)?;
        log::debug!("Renamed item {} to {:?}", index, self.items[index].name);
        Ok(())
    }

    /// Remove the item at `index` and return it
    pub fn delete_item(&mut self, index: usize) -> Result<Item> {
        self.check_index(index)?;
        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.commit(items)?;
        log::debug!("Deleted item {}: {:?}", index, removed.name);
        Ok(removed)
    }

    pub fn delete_all_items(&mut self) -> Result<()> {
        self.commit(Vec::new())?;
        log::debug!("Deleted all items");
        Ok(())
    }

    /// Flip `done` at `index`, returning the new value
    pub fn toggle_item(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let mut items = self.items.clone();
        let done = !items[index].done;
        items[index].done = done;
        self.commit(items)?;
        log::debug!("Toggled item {} to done={}", index, done);
        Ok(done)
    }

    /// Mark everything done, unless everything already is, in which case
    /// mark everything not done.
    pub fn toggle_all_items(&mut self) -> Result<()> {
        let done = !self.count_items().all_done();
        let items = self
            .items
            .iter()
            .map(|item| Item {
                name: item.name.clone(),
                done,
            })
            .collect();
        self.commit(items)?;
        log::debug!("Set all {} items to done={}", self.items.len(), done);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(StoreError::InvalidIndex {
                index,
                len: self.items.len(),
            })
        }
    }
}

fn write_items<S: KeyValueStore>(storage: &mut S, key: &str, items: &[Item]) -> Result<()> {
    let json = serde_json::to_string(items).map_err(StoreError::Serialize)?;
    storage.set(key, &json)?;
    log::info!("Items saved ({} entries)", items.len());
    Ok(())
}

fn parse_items(json: &str) -> Result<Vec<Item>> {
    serde_json::from_str(json).map_err(StoreError::MalformedState)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use proptest::prelude::*;

    fn fresh_store() -> ItemStore<MemoryStorage> {
        ItemStore::open(MemoryStorage::new()).unwrap()
    }

    fn store_with(items: &[Item]) -> ItemStore<MemoryStorage> {
        let json = serde_json::to_string(items).unwrap();
        ItemStore::open(MemoryStorage::with_value(STORAGE_KEY, &json)).unwrap()
    }

    fn persisted(store: &ItemStore<MemoryStorage>) -> Option<Vec<Item>> {
        store
            .storage()
            .value(STORAGE_KEY)
            .map(|json| serde_json::from_str(json).unwrap())
    }

    /// Backend whose writes can be made to fail, like a full LocalStorage
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: bool,
    }

    impl KeyValueStore for FlakyStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(StoreError::Storage("QuotaExceededError".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn done_flags(store: &ItemStore<MemoryStorage>) -> Vec<bool> {
        store.items().iter().map(|item| item.done).collect()
    }

    #[test]
    fn test_default_seed() {
        let store = fresh_store();
        assert_eq!(
            store.count_items(),
            ItemCounts {
                num_items: 2,
                num_done_items: 1
            }
        );
        assert_eq!(store.items()[0].name, "This item is done");
        assert!(store.items()[0].done);
        assert_eq!(store.items()[1].name, "This item is not done");
        assert!(!store.items()[1].done);
        // Seed is not written back until something changes
        assert!(persisted(&store).is_none());
    }

    #[test]
    fn test_load_persisted_list() {
        let store = ItemStore::open(MemoryStorage::with_value(
            STORAGE_KEY,
            r#"[{"name":"only","done":false}]"#,
        ))
        .unwrap();
        assert_eq!(store.items(), &[Item::new("only")]);
    }

    #[test]
    fn test_load_empty_list_is_not_reseeded() {
        let store = ItemStore::open(MemoryStorage::with_value(STORAGE_KEY, "[]")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_state() {
        for bad in [
            "not json",
            r#"{"name":"x","done":false}"#,
            r#"[{"name":"x"}]"#,
            r#"[{"name":1,"done":false}]"#,
            r#"[{"name":"x","done":"yes"}]"#,
        ] {
            let result = ItemStore::open(MemoryStorage::with_value(STORAGE_KEY, bad));
            assert!(
                matches!(result, Err(StoreError::MalformedState(_))),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_failed_reload_keeps_list() {
        let mut store = fresh_store();
        store.create_item("Buy milk").unwrap();
        let mut storage = store.into_storage();
        storage.set(STORAGE_KEY, "[oops").unwrap();

        let mut store = ItemStore {
            items: vec![Item::new("kept")],
            storage,
            key: STORAGE_KEY.to_string(),
        };
        assert!(store.load().is_err());
        assert_eq!(store.items(), &[Item::new("kept")]);
    }

    #[test]
    fn test_custom_key() {
        let mut store = ItemStore::with_key(MemoryStorage::new(), "other").unwrap();
        store.create_item("a").unwrap();
        assert_eq!(store.key(), "other");
        assert!(store.storage().value("other").is_some());
        assert!(store.storage().value(STORAGE_KEY).is_none());
    }

    #[test]
    fn test_create_item_appends_and_saves() {
        let mut store = fresh_store();
        assert!(store.create_item("Buy milk").unwrap());
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2), Some(&Item::new("Buy milk")));
        assert_eq!(persisted(&store).unwrap(), store.items());
    }

    #[test]
    fn test_create_item_rejects_empty_and_absent() {
        let mut store = fresh_store();
        let before = store.items().to_vec();
        assert!(!store.create_item("").unwrap());
        assert!(!store.create_item(None::<&str>).unwrap());
        assert_eq!(store.items(), before.as_slice());
        assert!(persisted(&store).is_none());
    }

    #[test]
    fn test_change_item_name() {
        let mut store = fresh_store();
        store.change_item_name(1, "Renamed").unwrap();
        assert_eq!(store.items()[1].name, "Renamed");
        assert!(!store.items()[1].done);
        assert_eq!(persisted(&store).unwrap()[1].name, "Renamed");

        // No validation at this layer
        store.change_item_name(0, "").unwrap();
        assert_eq!(store.items()[0].name, "");
    }

    #[test]
    fn test_delete_item_returns_removed() {
        let mut store = fresh_store();
        let removed = store.delete_item(0).unwrap();
        assert_eq!(removed.name, "This item is done");
        assert_eq!(store.len(), 1);
        assert_eq!(store.items()[0].name, "This item is not done");
        assert_eq!(persisted(&store).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_all_items() {
        let mut store = fresh_store();
        store.delete_all_items().unwrap();
        assert_eq!(store.count_items(), ItemCounts::default());
        assert_eq!(store.storage().value(STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn test_create_then_toggle() {
        let mut store = fresh_store();
        store.create_item("Buy milk").unwrap();
        assert!(store.toggle_item(2).unwrap());
        let item = store.get(2).unwrap();
        assert_eq!(item.name, "Buy milk");
        assert!(item.done);
    }

    #[test]
    fn test_toggle_all_from_mixed() {
        let mut store = fresh_store();
        store.toggle_all_items().unwrap();
        assert_eq!(done_flags(&store), vec![true, true]);
        store.toggle_all_items().unwrap();
        assert_eq!(done_flags(&store), vec![false, false]);
        // All not-done is "not all done", so it goes back to all done
        store.toggle_all_items().unwrap();
        assert_eq!(done_flags(&store), vec![true, true]);
        assert!(persisted(&store).unwrap().iter().all(|item| item.done));
    }

    #[test]
    fn test_toggle_all_empty_list() {
        let mut store = store_with(&[]);
        store.toggle_all_items().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.storage().value(STORAGE_KEY), Some("[]"));
    }

    #[test]
    fn test_invalid_index_changes_nothing() {
        let mut store = fresh_store();
        let before = store.items().to_vec();

        assert!(matches!(
            store.toggle_item(2),
            Err(StoreError::InvalidIndex { index: 2, len: 2 })
        ));
        assert!(matches!(
            store.delete_item(5),
            Err(StoreError::InvalidIndex { index: 5, len: 2 })
        ));
        assert!(matches!(
            store.change_item_name(2, "x"),
            Err(StoreError::InvalidIndex { .. })
        ));

        assert_eq!(store.items(), before.as_slice());
        assert!(persisted(&store).is_none());
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let mut store = ItemStore::open(FlakyStorage::default()).unwrap();
        store.create_item("Buy milk").unwrap();
        let before = store.items().to_vec();
        let stored = store.storage().inner.value(STORAGE_KEY).map(str::to_string);

        let mut storage = store.into_storage();
        storage.fail_writes = true;
        let mut store = ItemStore::open(storage).unwrap();
        assert_eq!(store.items(), before.as_slice());

        let is_storage_err = |result: Result<()>| matches!(result, Err(StoreError::Storage(_)));
        assert!(is_storage_err(store.create_item("Walk dog").map(|_| ())));
        assert!(is_storage_err(store.change_item_name(0, "x")));
        assert!(is_storage_err(store.delete_item(0).map(|_| ())));
        assert!(is_storage_err(store.toggle_item(2).map(|_| ())));
        assert!(is_storage_err(store.toggle_all_items()));
        assert!(is_storage_err(store.delete_all_items()));

        assert_eq!(store.items(), before.as_slice());
        assert_eq!(
            store.storage().inner.value(STORAGE_KEY).map(str::to_string),
            stored
        );

        // Writes work again once the backend recovers
        let mut storage = store.into_storage();
        storage.fail_writes = false;
        let mut store = ItemStore::open(storage).unwrap();
        assert!(store.toggle_item(2).unwrap());
        assert!(store.items()[2].done);
    }

    #[test]
    fn test_save_then_reopen() {
        let mut store = fresh_store();
        store.create_item("Buy milk").unwrap();
        store.toggle_item(1).unwrap();
        let items = store.items().to_vec();

        let reopened = ItemStore::open(store.into_storage()).unwrap();
        assert_eq!(reopened.items(), items.as_slice());
    }

    fn items_strategy() -> impl Strategy<Value = Vec<Item>> {
        prop::collection::vec(
            ("[a-zA-Z0-9 ]{1,12}", any::<bool>()).prop_map(|(name, done)| Item { name, done }),
            0..10,
        )
    }

    proptest! {
        #[test]
        fn prop_create_appends_not_done(items in items_strategy(), name in "[a-z]{1,10}") {
            let mut store = store_with(&items);
            prop_assert!(store.create_item(name.as_str()).unwrap());
            prop_assert_eq!(store.count_items().num_items, items.len() + 1);
            prop_assert_eq!(store.items().last(), Some(&Item::new(name)));
        }

        #[test]
        fn prop_toggle_is_involution(items in items_strategy(), index in 0usize..10) {
            prop_assume!(index < items.len());
            let mut store = store_with(&items);
            store.toggle_item(index).unwrap();
            prop_assert_ne!(store.items()[index].done, items[index].done);
            store.toggle_item(index).unwrap();
            prop_assert_eq!(store.items(), items.as_slice());
        }

        #[test]
        fn prop_delete_shifts_left(items in items_strategy(), index in 0usize..10) {
            prop_assume!(index < items.len());
            let mut store = store_with(&items);
            let removed = store.delete_item(index).unwrap();
            prop_assert_eq!(&removed, &items[index]);

            let mut expected = items.clone();
            expected.remove(index);
            prop_assert_eq!(store.items(), expected.as_slice());
        }

        #[test]
        fn prop_toggle_all(items in items_strategy()) {
            let all_done = items.iter().all(|item| item.done);
            let mut store = store_with(&items);
            store.toggle_all_items().unwrap();
            prop_assert!(store.items().iter().all(|item| item.done != all_done));
            prop_assert_eq!(store.len(), items.len());
        }

        #[test]
        fn prop_save_load_round_trip(items in items_strategy()) {
            let mut store = store_with(&items);
            store.save().unwrap();
            let reopened = ItemStore::open(store.into_storage()).unwrap();
            prop_assert_eq!(reopened.items(), items.as_slice());
        }
    }
}
