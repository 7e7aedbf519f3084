use chatveil_core::{KeyValueStorage, StorageError};

use crate::error::js_error_text;

/// `window.localStorage`, or nothing when the page blocks it.
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn open(window: &web_sys::Window) -> Self {
        let inner = match window.local_storage() {
            Ok(storage) => storage,
            Err(e) => {
                tracing::warn!(error = %js_error_text(&e), "localStorage access threw");
                None
            }
        };
        if inner.is_none() {
            tracing::warn!("localStorage unavailable, hidden messages last for this page only");
        }
        Self { inner }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.inner.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| StorageError::Read(js_error_text(&e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(js_error_text(&e)))
    }
}
