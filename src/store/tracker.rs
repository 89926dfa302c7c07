// SPDX-License-Identifier: MPL-2.0

use crate::store::StorageChange;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Per-handle view of the store used to tell foreign writes from our own.
///
/// The tracker remembers the value of every key as this handle last saw or
/// wrote it. Diffing the live contents against that snapshot yields exactly
/// the changes made through some other handle.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    seen: RefCell<BTreeMap<String, String>>,
}

impl ChangeTracker {
    pub fn new(snapshot: Vec<(String, String)>) -> Self {
        Self {
            seen: RefCell::new(snapshot.into_iter().collect()),
        }
    }

    /// Record a write (or removal, with `None`) made through this handle
    pub fn record(&self, key: &str, value: Option<&str>) {
        let mut seen = self.seen.borrow_mut();
        match value {
            Some(v) => {
                seen.insert(key.to_string(), v.to_string());
            }
            None => {
                seen.remove(key);
            }
        }
    }

    /// Compare live contents with the snapshot, then adopt them
    pub fn diff(&self, current: Vec<(String, String)>) -> Vec<StorageChange> {
        let current: BTreeMap<String, String> = current.into_iter().collect();
        let mut seen = self.seen.borrow_mut();
        let mut changes = Vec::new();

        for (key, value) in &current {
            match seen.get(key) {
                Some(old) if old == value => {}
                old => changes.push(StorageChange {
                    key: key.clone(),
                    old_value: old.cloned(),
                    new_value: Some(value.clone()),
                }),
            }
        }

        for (key, old) in seen.iter() {
            if !current.contains_key(key) {
                changes.push(StorageChange {
                    key: key.clone(),
                    old_value: Some(old.clone()),
                    new_value: None,
                });
            }
        }

        *seen = current;
        changes
    }
}
