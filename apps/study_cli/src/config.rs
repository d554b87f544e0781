use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::DEFAULT_MESSAGE_LIMIT;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "rayan.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base: String,
    pub session_cookie: Option<String>,
    pub message_limit: u32,
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000".into(),
            session_cookie: None,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            data_dir: default_data_dir(),
            log_filter: "warn".into(),
        }
    }
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub api_base: Option<String>,
    pub session_cookie: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub log_filter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_base: Option<String>,
    session_cookie: Option<String>,
    message_limit: Option<u32>,
    data_dir: Option<PathBuf>,
    log_filter: Option<String>,
}

fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("rayan_study"))
        .unwrap_or_else(|| PathBuf::from(".rayan_study"))
}

pub fn load_settings(overrides: Overrides) -> anyhow::Result<Settings> {
    load_settings_with_env(overrides, |key| std::env::var(key).ok())
}

pub fn load_settings_with_env(
    overrides: Overrides,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match &overrides.config_path {
        Some(path) => apply_file(&mut settings, read_config(path)?),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                apply_file(&mut settings, read_config(path)?);
            }
        }
    }

    apply_env(&mut settings, env);

    if let Some(v) = overrides.api_base {
        settings.api_base = v;
    }
    if let Some(v) = overrides.session_cookie {
        settings.session_cookie = Some(v);
    }
    if let Some(v) = overrides.data_dir {
        settings.data_dir = v;
    }
    if let Some(v) = overrides.log_filter {
        settings.log_filter = v;
    }

    settings.api_base = settings.api_base.trim().trim_end_matches('/').to_string();
    Ok(settings)
}

fn read_config(path: &Path) -> anyhow::Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn apply_file(settings: &mut Settings, file: FileConfig) {
    if let Some(v) = file.api_base {
        settings.api_base = v;
    }
    if let Some(v) = file.session_cookie {
        settings.session_cookie = Some(v);
    }
    if let Some(v) = file.message_limit {
        settings.message_limit = v;
    }
    if let Some(v) = file.data_dir {
        settings.data_dir = v;
    }
    if let Some(v) = file.log_filter {
        settings.log_filter = v;
    }
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("RAYAN_API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Some(v) = env("RAYAN_SESSION_COOKIE") {
        settings.session_cookie = Some(v);
    }

    if let Some(v) = env("RAYAN_MESSAGE_LIMIT") {
        match v.parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.message_limit = parsed,
            _ => tracing::warn!("ignoring invalid RAYAN_MESSAGE_LIMIT '{v}'"),
        }
    }

    if let Some(v) = env("RAYAN_DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
