use crate::error::{Result, SearchError};
use crate::output::{ColorMode, OutputFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "sift";
const CONFIG_FILE: &str = "config.json";

/// Application configuration, read from `<config dir>/sift/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Result format for query streams
    #[serde(default)]
    pub output: OutputFormat,

    /// Color mode for text output
    #[serde(default)]
    pub color: ColorMode,

    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Tokenize large rebuild batches in parallel
    #[serde(default = "default_parallel_build")]
    pub parallel_build: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_parallel_build() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            color: ColorMode::default(),
            log_level: default_log_level(),
            parallel_build: default_parallel_build(),
        }
    }
}

impl AppConfig {
    /// Load from the default location, or defaults if there is no file
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            SearchError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// `<config dir>/sift/config.json`, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
}
