use crate::models::settings::Settings;
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

pub const API_URL_ENV: &str = "ROOM_DESK_API_URL";
pub const TOKEN_ENV: &str = "ROOM_DESK_TOKEN";

/// Loads and stores [`Settings`] as a TOML file.
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service backed by `settings.toml` in the platform config directory
    pub fn from_project_dirs() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "RoomDesk", "RoomDesk")
            .ok_or_else(|| anyhow!("Could not determine a configuration directory"))?;
        Ok(Self::new(dirs.config_dir().join("settings.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the current settings. A missing file yields the defaults.
    ///
    /// Only connection fields are checked here, so a file that has no acting
    /// user yet still loads.
    pub fn get(&self) -> Result<Settings> {
        if !self.path.exists() {
            return Ok(Settings::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse settings in {}", self.path.display()))?;

        settings
            .validate_connection()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        Ok(settings)
    }

    /// Update settings
    pub fn update(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let raw = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;

        Ok(())
    }
}

/// Overlay the API URL and token from the environment.
///
/// `lookup` is usually `std::env::var(..).ok()`.
pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
        settings.api_base_url = url;
    }
    if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
        settings.access_token = Some(token);
    }
}

/// Load settings, falling back to defaults when the file is unusable
pub fn load_settings_or_default(service: &SettingsService) -> Settings {
    let mut settings = match service.get() {
        Ok(settings) => settings,
        Err(err) => {
            log::warn!("Falling back to default settings: {:#}", err);
            Settings::default()
        }
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
}
