use std::path::Path;

use macroquad::prelude::*;
use serde::Deserialize;

use crate::error::MapError;

/// Viewport and label settings. Every field is optional in the JSON form.
///
/// ```json
/// { "screen_width": 1280, "screen_height": 720, "zoom": 2.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Viewport width in pixels.
    pub screen_width: f32,
    /// Viewport height in pixels.
    pub screen_height: f32,
    /// World-to-screen scale, values <= 0 behave as 1.
    pub zoom: f32,
    /// Font size used for text objects.
    pub label_font_size: f32,
    /// RGBA, 0..1.
    pub label_color: [f32; 4],
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            screen_width: 800.0,
            screen_height: 450.0,
            zoom: 1.0,
            label_font_size: 16.0,
            label_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl ViewConfig {
    /// Parses a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&txt)
    }

    /// Viewport size.
    pub fn screen_size(&self) -> Vec2 {
        vec2(self.screen_width, self.screen_height)
    }

    /// Label color as a macroquad [`Color`].
    pub fn label_color(&self) -> Color {
        let [r, g, b, a] = self.label_color;
        Color::new(r, g, b, a)
    }
}
