use wasm_bindgen::JsValue;

use crate::{KeyValueStorage, Result, StorageError};

/// Browser storage backed by LocalStorage or SessionStorage
#[derive(Debug, Clone, Copy)]
pub struct SimpleStorage {
    use_session: bool,
}

impl SimpleStorage {
    /// Create storage using LocalStorage
    pub fn local() -> Self {
        Self { use_session: false }
    }

    /// Create storage using SessionStorage
    pub fn session() -> Self {
        Self { use_session: true }
    }

    fn get_storage(&self) -> Result<web_sys::Storage> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("No window object".to_string()))?;

        if self.use_session {
            window
                .session_storage()
                .map_err(|_| StorageError::Unavailable("SessionStorage not available".to_string()))?
                .ok_or_else(|| StorageError::Unavailable("SessionStorage not supported".to_string()))
        } else {
            window
                .local_storage()
                .map_err(|_| StorageError::Unavailable("LocalStorage not available".to_string()))?
                .ok_or_else(|| StorageError::Unavailable("LocalStorage not supported".to_string()))
        }
    }
}

impl KeyValueStorage for SimpleStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let storage = self.get_storage()?;
        storage.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let storage = self.get_storage()?;
        storage.set_item(key, value).map_err(|err| {
            // Browsers signal a full origin quota with a DOMException
            if format!("{err:?}").contains("QuotaExceeded") {
                log::error!("Storage quota exceeded writing {key} ({} bytes)", value.len());
                StorageError::QuotaExceeded {
                    key: key.to_string(),
                }
            } else {
                js_error(err)
            }
        })
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let storage = self.get_storage()?;
        storage.remove_item(key).map_err(js_error)
    }
}

fn js_error(err: JsValue) -> StorageError {
    StorageError::Js(format!("{err:?}"))
}
