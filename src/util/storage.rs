//! Key-value persistence backends for browser-scoped state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token store persists credentials through the `KeyValueStore` trait so
//! the same session code runs against `localStorage` in the browser and an
//! in-memory map in tests and non-browser builds.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

/// Failure writing to a persistence backend.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The backend is not reachable (no window, storage disabled).
    #[error("storage unavailable")]
    Unavailable,
    /// The backend refused the write (quota, private mode).
    #[error("storage write failed for `{key}`: {reason}")]
    WriteFailed { key: String, reason: String },
    /// The value could not be serialized before writing.
    #[error("could not serialize `{key}`: {reason}")]
    Serialize { key: String, reason: String },
}

/// Minimal string key-value store scoped to the browser origin.
///
/// Reads never fail: an unreachable backend reads as empty.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    reject_writes_for: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `key` fail, simulating a full quota.
    pub fn reject_writes_for(&self, key: &str) {
        *self.reject_writes_for.borrow_mut() = Some(key.to_owned());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes_for.borrow().as_deref() == Some(key) {
            return Err(StorageError::WriteFailed {
                key: key.to_owned(),
                reason: "quota exceeded".to_owned(),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// `window.localStorage` backend.
///
/// Outside the browser build every read is empty and every write reports
/// [`StorageError::Unavailable`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(feature = "csr")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        #[cfg(feature = "csr")]
        {
            local_storage()?.get_item(key).ok().flatten()
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = key;
            None
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "csr")]
        {
            let storage = local_storage().ok_or(StorageError::Unavailable)?;
            storage
                .set_item(key, value)
                .map_err(|e| StorageError::WriteFailed {
                    key: key.to_owned(),
                    reason: format!("{e:?}"),
                })
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = (key, value);
            Err(StorageError::Unavailable)
        }
    }

    fn remove(&self, key: &str) {
        #[cfg(feature = "csr")]
        {
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(key);
            }
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = key;
        }
    }
}
