//! Key/value draft buffer for the secret dialogs.
//!
//! The editor owns the draft mapping being composed plus one pending entry
//! (the key and value inputs that have not been added yet). It lives only
//! as long as the dialog that owns it. No validation of key or value
//! content is done here beyond the non-empty check; the vault is the sole
//! validator of payload content.

use crate::model::{MASK, SecretData};

/// The (key, value) pair currently typed into the inputs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEntry {
    pub key: String,
    pub value: String,
}

impl PendingEntry {
    pub fn clear(&mut self) {
        self.key.clear();
        self.value.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueEditor {
    data: SecretData,
    pub pending: PendingEntry,
}

impl KeyValueEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor seeded with an owned copy of existing data
    pub fn with_data(data: SecretData) -> Self {
        Self {
            data,
            pending: PendingEntry::default(),
        }
    }

    /// Insert or overwrite `key`. No-op unless both key and value are
    /// non-empty. Clears the pending entry on success.
    pub fn add(&mut self, key: &str, value: &str) -> bool {
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.data.insert(key.to_string(), value.to_string());
        self.pending.clear();
        true
    }

    /// Add whatever is in the pending entry
    pub fn commit_pending(&mut self) -> bool {
        let PendingEntry { key, value } = std::mem::take(&mut self.pending);
        if self.add(&key, &value) {
            true
        } else {
            // Restore the inputs so the user can finish typing
            self.pending = PendingEntry { key, value };
            false
        }
    }

    /// Remove `key` from the draft. No-op if absent.
    pub fn remove(&mut self, key: &str) -> bool {
        // shift_remove keeps the remaining entries in display order
        self.data.shift_remove(key).is_some()
    }

    pub fn data(&self) -> &SecretData {
        &self.data
    }

    pub fn into_data(self) -> SecretData {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.data.get_index(index).map(|(k, _)| k.as_str())
    }

    /// Draft entries with every value replaced by the mask placeholder
    pub fn masked_entries(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.data.keys().map(|k| (k.as_str(), MASK))
    }
}
