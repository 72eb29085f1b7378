use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Bahasa Indonesia
    #[default]
    Id,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Id => "id",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(Language::Id),
            "en" => Ok(Language::En),
            other => Err(ValidationError::InvalidConfig(format!(
                "unsupported language '{}'",
                other
            ))),
        }
    }
}

/// Persisted display preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayPreferences {
    pub dark_mode: bool,
    pub notifications_enabled: bool,
    pub language: Language,
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub language: Option<Language>,
}

impl DisplayPreferences {
    pub fn apply(&mut self, update: &PreferencesUpdate) {
        if let Some(dark_mode) = update.dark_mode {
            self.dark_mode = dark_mode;
        }
        if let Some(enabled) = update.notifications_enabled {
            self.notifications_enabled = enabled;
        }
        if let Some(language) = update.language {
            self.language = language;
        }
    }
}
