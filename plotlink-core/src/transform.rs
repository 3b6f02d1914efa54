//! Logical → device coordinate mapping.

use serde::{Deserialize, Serialize};

/// Uniform scale followed by a translation.
///
/// Each axis is mapped as `trunc(trunc(v * scale) + translate)`. Both
/// truncations go toward zero, the same way on both axes. Out-of-range
/// results saturate at the `i64` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub const fn new(translate_x: f64, translate_y: f64, scale: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    /// Map a logical point to device coordinates.
    pub fn apply(&self, x: i32, y: i32) -> (i64, i64) {
        (
            Self::axis(x, self.scale, self.translate_x),
            Self::axis(y, self.scale, self.translate_y),
        )
    }

    fn axis(v: i32, scale: f64, translate: f64) -> i64 {
        let scaled = (f64::from(v) * scale) as i64;
        (scaled as f64 + translate) as i64
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
