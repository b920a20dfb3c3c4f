use crate::i18n::LocaleStore;
use crate::locale::Locale;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Client-side settings kept in the user's config directory
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Locale code chosen by the visitor
    #[serde(rename = "portfolio-locale", default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("portafolio").join("config.json"))
    }
}

/// Locale persistence backed by the config file
#[derive(Debug, Clone)]
pub struct ConfigLocaleStore {
    path: PathBuf,
}

impl ConfigLocaleStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store in the default config location.
    pub fn user() -> Result<Self> {
        Ok(Self::new(Config::get_config_path()?))
    }
}

impl LocaleStore for ConfigLocaleStore {
    fn load(&self) -> Option<String> {
        Config::load_from(&self.path).ok().and_then(|c| c.locale)
    }

    fn save(&self, locale: Locale) -> Result<()> {
        // Keep other settings; a corrupt file is replaced rather than blocking the switch
        let mut config = Config::load_from(&self.path).unwrap_or_default();
        config.locale = Some(locale.as_str().to_string());
        config.save_to(&self.path)
    }
}
