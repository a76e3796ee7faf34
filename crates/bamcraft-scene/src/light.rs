//! Light source data

use serde::{Deserialize, Serialize};

/// A light datablock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Light {
    #[serde(default)]
    pub kind: LightKind,
    #[serde(default = "default_white")]
    pub color: [f32; 3],
    #[serde(default = "default_energy")]
    pub energy: f32,
}

fn default_white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_energy() -> f32 {
    1.0
}

/// Kind-specific light parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightKind {
    Point {
        /// Falloff radius
        #[serde(default)]
        radius: f32,
    },
    /// Directional sun light
    Sun,
    Spot {
        /// Full cone angle in radians
        spot_size: f32,
        #[serde(default)]
        spot_blend: f32,
    },
    Area {
        /// Unscaled rectangle size; the object transform scales it
        size: [f32; 2],
    },
}

impl Default for LightKind {
    fn default() -> Self {
        LightKind::Point { radius: 0.0 }
    }
}
