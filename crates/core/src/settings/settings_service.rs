use std::sync::{Arc, RwLock};

use log::debug;

use super::PreferencesServiceTrait;
use crate::constants::PREFERENCES_KEY;
use crate::errors::{Error, Result};
use crate::settings::{DisplayPreferences, PreferencesUpdate};
use crate::storage::{read_json, write_json, ClientStore};

/// Sole writer of the persisted display preferences.
pub struct PreferencesService {
    store: Arc<dyn ClientStore>,
    current: RwLock<DisplayPreferences>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        let current: DisplayPreferences = read_json(store.as_ref(), PREFERENCES_KEY);
        Self {
            store,
            current: RwLock::new(current),
        }
    }
}

impl PreferencesServiceTrait for PreferencesService {
    fn get_preferences(&self) -> DisplayPreferences {
        self.current
            .read()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn update_preferences(&self, update: &PreferencesUpdate) -> Result<DisplayPreferences> {
        let mut current = self
            .current
            .write()
            .map_err(|_| Error::Unexpected("preferences lock poisoned".into()))?;

        let mut next = current.clone();
        next.apply(update);
        write_json(self.store.as_ref(), PREFERENCES_KEY, &next)?;

        debug!("Updated display preferences: {:?}", next);
        *current = next.clone();
        Ok(next)
    }

    fn toggle_dark_mode(&self) -> Result<bool> {
        let dark_mode = !self.get_preferences().dark_mode;
        self.update_preferences(&PreferencesUpdate {
            dark_mode: Some(dark_mode),
            ..PreferencesUpdate::default()
        })?;
        Ok(dark_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Language;
    use crate::storage::MemoryClientStore;

    #[test]
    fn test_absent_preferences_are_default() {
        let service = PreferencesService::new(Arc::new(MemoryClientStore::new()));
        assert_eq!(service.get_preferences(), DisplayPreferences::default());
    }

    #[test]
    fn test_update_persists() {
        let store = Arc::new(MemoryClientStore::new());
        let service = PreferencesService::new(store.clone());

        service
            .update_preferences(&PreferencesUpdate {
                language: Some(Language::En),
                ..PreferencesUpdate::default()
            })
            .unwrap();

        let reloaded = PreferencesService::new(store);
        assert_eq!(reloaded.get_preferences().language, Language::En);
    }

    #[test]
    fn test_toggle_dark_mode() {
        let service = PreferencesService::new(Arc::new(MemoryClientStore::new()));
        assert!(service.toggle_dark_mode().unwrap());
        assert!(!service.toggle_dark_mode().unwrap());
        assert!(!service.get_preferences().dark_mode);
    }

    #[test]
    fn test_corrupt_blob_is_default() {
        let store = Arc::new(MemoryClientStore::new());
        store.set_item(PREFERENCES_KEY, "dark").unwrap();
        let service = PreferencesService::new(store);
        assert_eq!(service.get_preferences(), DisplayPreferences::default());
    }
}
