use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::site::Layout;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "savethedate";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    /// 1-indexed slide to open on when the fragment names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_slide: Option<usize>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `savethedate config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# savethedate configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn layout(&self) -> Option<Layout> {
        self.defaults
            .as_ref()
            .and_then(|d| d.layout.as_deref())
            .and_then(Layout::from_name)
    }

    pub fn start_slide(&self) -> Option<usize> {
        self.defaults.as_ref().and_then(|d| d.start_slide)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.layout" => {
                if Layout::from_name(value).is_none() {
                    anyhow::bail!("Invalid layout: {value}. Must be 'deck' or 'gallery'.");
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .layout = Some(value.to_string());
            }
            "defaults.start_slide" => {
                let slide = match value.parse::<usize>() {
                    Ok(n) if n >= 1 => n,
                    _ => anyhow::bail!(
                        "Invalid start_slide: {value}. Must be a slide number starting at 1."
                    ),
                };
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_slide = Some(slide);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.layout, defaults.start_slide"
            ),
        }
        Ok(())
    }
}
