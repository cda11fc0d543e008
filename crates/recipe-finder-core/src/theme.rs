//! Light/dark theme preference, persisted under the `theme` key.

use tracing::warn;

use crate::storage::{KeyValueStore, StorageError};

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Only an exact `"dark"` selects the dark theme.
    pub fn parse(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub struct ThemePreference<S> {
    storage: S,
}

impl<S: KeyValueStore> ThemePreference<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn load(&self) -> Theme {
        match self.storage.get_item(THEME_KEY) {
            Ok(Some(value)) => Theme::parse(&value),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Theme preference unreadable, using light");
                Theme::default()
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<(), StorageError> {
        self.storage.set_item(THEME_KEY, theme.as_str())
    }

    /// Persist the theme opposite to `current`, the one on screen, and
    /// return it.
    pub fn toggle(&self, current: Theme) -> Result<Theme, StorageError> {
        let next = current.toggled();
        self.save(next)?;
        Ok(next)
    }
}
