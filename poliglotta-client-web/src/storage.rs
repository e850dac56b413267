use gloo_storage::{LocalStorage, Storage};
use poliglotta_core::{ChatError, PreferenceStore, Result};

/// Preferenze nel `localStorage` del browser, come stringhe semplici (non JSON).
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl PreferenceStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| ChatError::Storage(format!("{e:?}")))
    }
}
