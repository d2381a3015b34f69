use serde::{Deserialize, Serialize};

/// Paint applied to every overlay a placer emits.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// RGBA, expected semi-transparent so terrain shows through.
    pub fill: [f32; 4],
    pub outline: [f32; 4],
    /// Outline width in pixels.
    pub outline_width: f32,
}

impl OverlayStyle {
    pub const fn new(fill: [f32; 4], outline: [f32; 4], outline_width: f32) -> Self {
        Self {
            fill,
            outline,
            outline_width,
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill: [1.0, 1.0, 0.0, 0.5],
            outline: [1.0, 1.0, 0.0, 1.0],
            outline_width: 2.0,
        }
    }
}
