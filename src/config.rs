// Editor tunables and the save/load session.
//
// `EditorConfig` is read from `water_town.toml` in the working directory when
// present. Every section is `#[serde(default)]`, so a file only needs the keys
// it wants to override.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::engine::boat::BoatTuning;
use crate::error::Result;

pub const CONFIG_FILE: &str = "water_town.toml";
pub const SCENE_EXTENSION: &str = "scene";

// =============================================================================
// Camera / input tuning
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Initial visible width of the plan view, in world units.
    pub ortho_view_size: f32,
    pub ortho_height: f32,
    pub ortho_min_zoom: f32,
    pub ortho_max_zoom: f32,
    /// World units per pixel of right-drag in terrain mode.
    pub ortho_pan_speed: f32,

    pub orbit_distance: f32,
    pub orbit_yaw: f32,
    pub orbit_pitch: f32,
    pub orbit_rotate_sensitivity: f32,
    /// World units per pixel of middle-drag in building mode.
    pub orbit_pan_speed: f32,
    /// Distance change per scroll notch.
    pub orbit_zoom_speed: f32,

    pub follow_offset: [f32; 3],
    pub follow_smoothing: f32,
    pub follow_look_sensitivity: f32,

    /// Vertical field of view (degrees) shared by the perspective cameras.
    pub fov: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            ortho_view_size: 30.0,
            ortho_height: 50.0,
            ortho_min_zoom: 2.0,
            ortho_max_zoom: 100.0,
            ortho_pan_speed: 0.05,
            orbit_distance: 35.0,
            orbit_yaw: 45.0,
            orbit_pitch: 55.0,
            orbit_rotate_sensitivity: 0.3,
            orbit_pan_speed: 0.02,
            orbit_zoom_speed: 0.5,
            follow_offset: [0.0, 2.5, -5.0],
            follow_smoothing: 5.0,
            follow_look_sensitivity: 0.3,
            fov: 45.0,
        }
    }
}

// =============================================================================
// Editor configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Seconds for the building/game camera blend.
    pub transition_duration: f32,
    /// Pick radius for ctrl-click removal in building mode.
    pub remove_radius: f32,
    pub camera: CameraTuning,
    pub boat: BoatTuning,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            transition_duration: 0.5,
            remove_radius: 1.0,
            camera: CameraTuning::default(),
            boat: BoatTuning::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read `path`, falling back to defaults if it is missing or unparsable.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => {
                info!("no config at {}, using defaults", path.display());
                return Self::default();
            }
        };
        match Self::from_toml_str(&text) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("ignoring {}: {e}", path.display());
                Self::default()
            }
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Scene name and directory the UI edits and hands to save/load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorSession {
    pub scene_dir: PathBuf,
    pub scene_name: String,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self {
            scene_dir: PathBuf::from("."),
            scene_name: "test_scene".to_string(),
        }
    }
}

impl EditorSession {
    pub fn new(scene_dir: impl Into<PathBuf>, scene_name: impl Into<String>) -> Self {
        Self {
            scene_dir: scene_dir.into(),
            scene_name: scene_name.into(),
        }
    }

    pub fn scene_path(&self) -> PathBuf {
        self.scene_dir.join(&self.scene_name).with_extension(SCENE_EXTENSION)
    }
}
