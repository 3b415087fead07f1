//! Form State Persistence
//!
//! One JSON record under one local storage key. Best effort only: a missing,
//! unreadable or oddly shaped record means "no saved state", and write
//! failures are logged and dropped.

use crate::error::{FormError, FormResult};
use crate::models::FormState;

/// A single persistence slot
pub trait StateStore: Send + Sync {
    fn read(&self) -> Option<String>;
    fn write(&self, value: &str) -> FormResult<()>;
}

/// `window.localStorage[key]`
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> FormResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| FormError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(|_| FormError::Storage("local storage access denied".to_string()))?
            .ok_or_else(|| FormError::Storage("local storage unavailable".to_string()))
    }
}

impl StateStore for LocalStorageStore {
    fn read(&self) -> Option<String> {
        Self::storage().ok()?.get_item(&self.key).ok().flatten()
    }

    fn write(&self, value: &str) -> FormResult<()> {
        Self::storage()?
            .set_item(&self.key, value)
            .map_err(|e| FormError::Storage(crate::error::js_error_message(&e)))
    }
}

/// In-memory slot
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    value: std::sync::Mutex<Option<String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            value: std::sync::Mutex::new(Some(value.to_string())),
        }
    }
}

#[cfg(test)]
impl StateStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.value.lock().ok()?.clone()
    }

    fn write(&self, value: &str) -> FormResult<()> {
        let mut slot = self
            .value
            .lock()
            .map_err(|_| FormError::Storage("memory slot poisoned".to_string()))?;
        *slot = Some(value.to_string());
        Ok(())
    }
}

pub fn encode_state(state: &FormState) -> FormResult<String> {
    Ok(serde_json::to_string(state)?)
}

/// Parse a stored record; any mismatch counts as absent
pub fn decode_state(raw: &str) -> Option<FormState> {
    match serde_json::from_str::<FormState>(raw) {
        Ok(state) => Some(state),
        Err(err) => {
            log::warn!("discarding stored form state: {}", err);
            None
        }
    }
}

/// Saved state fitted to `item_count`, or the blank state
pub fn load_state(store: &dyn StateStore, item_count: usize, today: &str) -> FormState {
    store
        .read()
        .and_then(|raw| decode_state(&raw))
        .map(|state| state.fit_to(item_count))
        .unwrap_or_else(|| FormState::blank(item_count, today))
}

/// Write the state, swallowing failures
pub fn save_state(store: &dyn StateStore, state: &FormState) {
    let result = encode_state(state).and_then(|raw| store.write(&raw));
    if let Err(err) = result {
        log::warn!("form state not saved: {}", err);
    }
}
