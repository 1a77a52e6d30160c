use std::{fs, path::Path};

use serde::Deserialize;
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_filter: String,
    pub animation_step_ms: u64,
    pub print_tree: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".into(),
            animation_step_ms: 150,
            print_tree: true,
        }
    }
}

/// Keys accepted in the settings file; anything missing keeps its default.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    log_filter: Option<String>,
    animation_step_ms: Option<u64>,
    print_tree: Option<bool>,
}

/// Settings plus the problems met while reading them. Loading happens before
/// logging is up, so the caller reports `warnings` once it is.
pub fn load_settings(path: &Path) -> (Settings, Vec<String>) {
    load_settings_with(path, |name| std::env::var(name).ok())
}

pub(crate) fn load_settings_with(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> (Settings, Vec<String>) {
    let mut settings = Settings::default();
    let mut warnings = Vec::new();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.log_filter {
                    settings.log_filter = v;
                }
                if let Some(v) = file_cfg.animation_step_ms {
                    settings.animation_step_ms = v;
                }
                if let Some(v) = file_cfg.print_tree {
                    settings.print_tree = v;
                }
            }
            Err(error) => warnings.push(format!(
                "ignoring unreadable settings file {}: {error}",
                path.display()
            )),
        }
    }

    if let Some(v) = env("INSERTER_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    if let Some(v) = env("APP__ANIMATION_STEP_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.animation_step_ms = parsed,
            Err(_) => warnings.push(format!("ignoring APP__ANIMATION_STEP_MS={v}")),
        }
    }

    if let Some(v) = env("APP__PRINT_TREE") {
        match v.parse::<bool>() {
            Ok(parsed) => settings.print_tree = parsed,
            Err(_) => warnings.push(format!("ignoring APP__PRINT_TREE={v}")),
        }
    }

    (settings, warnings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
