use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Optional user settings from `~/.config/visitflow/config.toml`.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub arcs: ArcSettings,
    #[serde(default)]
    pub globe: GlobeSettings,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct DataSettings {
    pub url: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct ArcSettings {
    pub samples: Option<usize>,
    pub max_total_lines: Option<u32>,
    pub max_lines_per_country: Option<u32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct GlobeSettings {
    pub tilt: Option<f64>,   // Degrees of latitude the view starts centred on
    pub speed: Option<f32>,  // Seconds per frame
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`. A missing file gives defaults silently; an
    /// unreadable or malformed one gives defaults with a warning.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    debug!(path = %path.display(), "settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid settings, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read settings, using defaults");
                Self::default()
            }
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("visitflow")
            .join("config.toml")
    }
}
