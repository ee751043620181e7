use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::DEFAULT_SAVE_DELAY;
use crate::engine::theme::Theme;
use crate::runtime::DEFAULT_FRAME_INTERVAL;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "deckpane";
const STORE_DIR: &str = "store";

pub const VALID_KEYS: &str = "preview.save_delay_ms, preview.frame_interval_ms, preview.theme, \
    export.width, export.height, store.dir";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_delay_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_interval_ms: Option<u64>,

    /// Theme for decks whose front-matter does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
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
                anyhow::anyhow!("No config found. Run `deckpane config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
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
        let contents = format!("# deckpane configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "preview.save_delay_ms" => {
                self.preview
                    .get_or_insert_with(PreviewConfig::default)
                    .save_delay_ms = Some(parse_positive(key, value)?);
            }
            "preview.frame_interval_ms" => {
                self.preview
                    .get_or_insert_with(PreviewConfig::default)
                    .frame_interval_ms = Some(parse_positive(key, value)?);
            }
            "preview.theme" => {
                if !Theme::is_known(value) {
                    anyhow::bail!("Invalid theme: {value}. Must be 'default', 'gaia', or 'dark'.");
                }
                self.preview.get_or_insert_with(PreviewConfig::default).theme =
                    Some(value.to_string());
            }
            "export.width" => {
                let width = u32::try_from(parse_positive(key, value)?)?;
                self.export.get_or_insert_with(ExportConfig::default).width = Some(width);
            }
            "export.height" => {
                let height = u32::try_from(parse_positive(key, value)?)?;
                self.export.get_or_insert_with(ExportConfig::default).height = Some(height);
            }
            "store.dir" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid store.dir: must not be empty.");
                }
                self.store.get_or_insert_with(StoreConfig::default).dir =
                    Some(PathBuf::from(value));
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {VALID_KEYS}"),
        }
        Ok(())
    }

    pub fn save_delay(&self) -> Duration {
        self.preview
            .as_ref()
            .and_then(|p| p.save_delay_ms)
            .map_or(DEFAULT_SAVE_DELAY, Duration::from_millis)
    }

    pub fn frame_interval(&self) -> Duration {
        self.preview
            .as_ref()
            .and_then(|p| p.frame_interval_ms)
            .map_or(DEFAULT_FRAME_INTERVAL, Duration::from_millis)
    }

    pub fn default_theme(&self) -> &str {
        self.preview
            .as_ref()
            .and_then(|p| p.theme.as_deref())
            .unwrap_or("default")
    }

    /// Export page size in px.
    pub fn page_size(&self) -> (u32, u32) {
        let export = self.export.as_ref();
        (
            export.and_then(|e| e.width).unwrap_or(1280),
            export.and_then(|e| e.height).unwrap_or(720),
        )
    }

    pub fn store_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.store.as_ref().and_then(|s| s.dir.clone()) {
            return Ok(dir);
        }
        default_store_dir()
    }

    /// Every setting with defaults filled in, as `config show` prints it.
    pub fn effective(&self) -> Result<Self> {
        let (width, height) = self.page_size();
        Ok(Self {
            preview: Some(PreviewConfig {
                save_delay_ms: Some(self.save_delay().as_millis() as u64),
                frame_interval_ms: Some(self.frame_interval().as_millis() as u64),
                theme: Some(self.default_theme().to_string()),
            }),
            export: Some(ExportConfig {
                width: Some(width),
                height: Some(height),
            }),
            store: Some(StoreConfig {
                dir: Some(self.store_dir()?),
            }),
        })
    }
}

pub fn default_store_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR).join(STORE_DIR))
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => anyhow::bail!("Invalid {key}: {value}. Must be a positive integer."),
    }
}
