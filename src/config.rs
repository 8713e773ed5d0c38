use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Viewer settings, loadable from an optional JSON file next to the
/// binary. Every field has a default matching the reference character, so
/// a partial file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model_path: String,
    /// Separate base-color texture; `None` renders untextured.
    pub texture_path: Option<String>,
    pub idle_clip: String,
    pub neck_bone: String,
    pub waist_bone: String,
    pub neck_limit_degrees: f32,
    pub waist_limit_degrees: f32,
    pub fade_in_seconds: f32,
    pub fade_out_seconds: f32,
    pub model_scale: f32,
    pub model_offset_y: f32,
    pub camera_position: [f32; 3],
    pub camera_fov_degrees: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: "assets/models/mascot.gltf".to_string(),
            texture_path: Some("assets/textures/mascot_diffuse.jpg".to_string()),
            idle_clip: "idle".to_string(),
            neck_bone: "mixamorigNeck".to_string(),
            waist_bone: "mixamorigSpine".to_string(),
            neck_limit_degrees: 50.0,
            waist_limit_degrees: 30.0,
            fade_in_seconds: 0.25,
            fade_out_seconds: 0.25,
            model_scale: 0.1,
            model_offset_y: -11.0,
            camera_position: [0.0, -2.0, 30.0],
            camera_fov_degrees: 50.0,
        }
    }
}

impl Settings {
    /// Read settings from `path`, falling back to defaults when the file
    /// is absent or malformed. A broken file is worth a warning; a missing
    /// one is routine.
    pub fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    info!("loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("ignoring malformed settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
