use crate::render::{PanelStyle, RenderOptions};
use crate::table::InputFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for render options not given on the command line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Tab bar width: "default", "fill" or "justified"
    #[serde(default)]
    pub panel_style: PanelStyle,

    #[serde(default)]
    pub pills: bool,

    /// Layout div wrapped around every content block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// "auto" (by extension), "json" or "csv"
    #[serde(default)]
    pub format: InputFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive, used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl RenderConfig {
    /// Fill options left unset with these defaults
    pub fn apply(&self, mut options: RenderOptions) -> RenderOptions {
        if options.layout.is_none() {
            options.layout = self.layout.clone();
        }
        options
    }
}

impl Config {
    /// Get the platform-specific config file path
    /// - macOS: ~/Library/Application Support/tabset/config.toml
    /// - Linux: ~/.config/tabset/config.toml
    /// - Windows: %APPDATA%/tabset/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tabset").join("config.toml"))
    }

    /// Load config from the default path, or return default if it doesn't exist
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<PathBuf, Box<dyn std::error::Error + Send + Sync>> {
        let path = Self::config_path().ok_or("Could not determine config directory")?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to an explicit file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Remember the style of `options` as the new render defaults
    pub fn remember(&mut self, options: &RenderOptions) {
        self.render.panel_style = options.panel_style;
        self.render.pills = options.pills;
        self.render.layout = options.layout.clone();
    }
}
