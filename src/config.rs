use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::DEFAULT_YEAR_RANGE;

/// Looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "dashboard.json";

/// Decorative layer painted behind the panels.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundKind {
    #[default]
    Particles,
    Bubbles,
    None,
}

/// Startup settings. Every field has a default, so a partial file is fine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory holding the CSV / JSON resources.
    pub data_dir: PathBuf,
    /// Year span selected initially and restored on reset.
    pub default_year_range: (i32, i32),
    /// Initial window size in logical pixels.
    pub window_size: [f32; 2],
    /// Background animation, or `none` to switch it off.
    pub background: BackgroundKind,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            default_year_range: DEFAULT_YEAR_RANGE,
            window_size: [1200.0, 800.0],
            background: BackgroundKind::Particles,
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Config from `path` when it exists; defaults otherwise or on error.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No {} found, using defaults", path.display());
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring invalid configuration: {e:#}");
                Self::default()
            }
        }
    }
}
