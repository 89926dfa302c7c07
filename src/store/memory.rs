// SPDX-License-Identifier: MPL-2.0

use crate::store::{ChangeTracker, StorageChange, Store, StoreError};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// In-process store. Handles opened with [`MemoryStore::open_tab`] share the
/// same contents but each keeps its own change tracker, like browser tabs on
/// one origin.
pub struct MemoryStore {
    data: Rc<RefCell<BTreeMap<String, String>>>,
    tracker: ChangeTracker,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Rc::new(RefCell::new(BTreeMap::new())),
            tracker: ChangeTracker::default(),
        }
    }

    /// Another handle onto the same contents
    pub fn open_tab(&self) -> Self {
        let snapshot = self.snapshot();
        Self {
            data: Rc::clone(&self.data),
            tracker: ChangeTracker::new(snapshot),
        }
    }

    fn snapshot(&self) -> Vec<(String, String)> {
        self.data
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.tracker.record(key, Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.data.borrow_mut().remove(key);
        self.tracker.record(key, None);
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut data = self.data.borrow_mut();
        for key in keys {
            data.remove(*key);
            self.tracker.record(key, None);
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        Ok(self.snapshot())
    }

    fn poll_external(&self) -> Result<Vec<StorageChange>, StoreError> {
        Ok(self.tracker.diff(self.snapshot()))
    }
}
