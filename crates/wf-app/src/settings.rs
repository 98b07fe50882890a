//! Application settings loaded from `washflow.yaml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wf_core::CanvasRect;
use wf_graph::PlacementRules;

use crate::error::{AppError, AppResult};

pub const SETTINGS_FILE: &str = "washflow.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Directory holding the catalog tables.
    pub catalog_dir: PathBuf,
    pub canvas: CanvasSettings,
    pub icons: IconSettings,
    /// Period of the circuit synthesis check, in milliseconds.
    pub synthesis_period_ms: u64,
    /// Distance in canvas units within which a click selects a pipe.
    pub pick_tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub reset_button_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconSettings {
    pub pump: f64,
    pub component: f64,
    pub connector: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            catalog_dir: PathBuf::from("catalog"),
            canvas: CanvasSettings::default(),
            icons: IconSettings::default(),
            synthesis_period_ms: 2000,
            pick_tolerance: 6.0,
        }
    }
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            margin: 4.0,
            reset_button_size: 28.0,
        }
    }
}

impl Default for IconSettings {
    fn default() -> Self {
        let rules = PlacementRules::default();
        Self {
            pump: rules.pump_icon,
            component: rules.component_icon,
            connector: rules.connector_icon,
        }
    }
}

impl AppSettings {
    /// Read settings from `path`.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| AppError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Settings from `path` if present; defaults otherwise. Unreadable files are logged.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "using default settings");
                Self::default()
            }
        }
    }

    pub fn canvas_rect(&self) -> CanvasRect {
        CanvasRect::new(self.canvas.width, self.canvas.height)
    }

    pub fn placement_rules(&self) -> PlacementRules {
        PlacementRules {
            pump_icon: self.icons.pump,
            component_icon: self.icons.component,
            connector_icon: self.icons.connector,
            margin: self.canvas.margin,
        }
    }

    pub fn synthesis_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.synthesis_period_ms)
    }
}
