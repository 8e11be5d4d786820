//! Persisted command-line preferences.
//!
//! Stored as TOML in the platform config directory. A missing or unreadable
//! file yields the defaults; command-line flags override whatever is loaded.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::LogFormat;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub filter: FilterSettings,
    pub display: DisplaySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Record field date ranges apply to.
    pub date_field: String,
    /// Entity name records are listed under.
    pub entity: String,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            date_field: "createdAt".to_string(),
            entity: "patients".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Rows printed before the table is truncated.
    pub max_rows: usize,
    /// Columns to print; empty shows every field in first-seen order.
    pub columns: Vec<String>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_rows: 50,
            columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub log_data: bool,
}

impl Settings {
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|content| match toml::from_str(&content) {
                Ok(settings) => Some(settings),
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "ignoring unreadable settings"
                    );
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))
    }

    /// Default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "Clinic", "clinic")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let settings: Settings = toml::from_str("[display]\nmax_rows = 5\n").unwrap();
        assert_eq!(settings.display.max_rows, 5);
        assert_eq!(settings.filter, FilterSettings::default());
        assert_eq!(settings.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/clinic/settings.toml"));
        assert_eq!(settings, Settings::default());
    }
}
