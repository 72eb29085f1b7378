//! Preferences service trait.

use crate::errors::Result;
use crate::settings::{DisplayPreferences, PreferencesUpdate};

/// Read and change the display preferences of the settings view.
pub trait PreferencesServiceTrait: Send + Sync {
    fn get_preferences(&self) -> DisplayPreferences;

    /// Apply `update` and persist. Returns the new preferences.
    fn update_preferences(&self, update: &PreferencesUpdate) -> Result<DisplayPreferences>;

    /// Flip dark mode. Returns the new value.
    fn toggle_dark_mode(&self) -> Result<bool>;
}
