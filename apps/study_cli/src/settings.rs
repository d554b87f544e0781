//! Persisted presentation preferences (the theme survives restarts; nothing else does).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::domain::Theme;
use tracing::warn;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedPreferences {
    pub theme: Option<Theme>,
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> PersistedPreferences {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return PersistedPreferences::default(),
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(
                "ignoring unreadable settings file '{}': {err}",
                self.path.display()
            );
            PersistedPreferences::default()
        })
    }

    pub fn theme(&self) -> Theme {
        self.load().theme.unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) -> anyhow::Result<()> {
        let mut prefs = self.load();
        prefs.theme = Some(theme);
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create settings directory '{}'", parent.display())
            })?;
        }
        let raw = serde_json::to_string_pretty(&prefs)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write settings file '{}'", self.path.display()))?;
        Ok(())
    }
}
