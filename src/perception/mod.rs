//! Per-frame percepts for Labyrinth
//!
//! Readings consumed by the navigation engine and the extractor contract
//! that produces them. Readings are normalised here so the engine never
//! sees out-of-range values.

pub mod color;
mod vision;

pub use color::HsvRange;
pub use vision::{Blob, ColorFeatureExtractor, VisionConfig};

use crate::navigation::NavigationConfig;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Target percept for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetReading {
    /// Whether a usable target blob was found
    pub visible: bool,
    /// Centroid offset from the frame center in [-0.5, 0.5], negative = left
    pub offset: f32,
    /// Blob area as a fraction of the frame, in [0, 1]
    pub area: f32,
}

impl TargetReading {
    /// Visible target, clamped into the normalised ranges
    pub fn new(offset: f32, area: f32) -> Self {
        TargetReading {
            visible: true,
            offset: offset.clamp(-0.5, 0.5),
            area: area.clamp(0.0, 1.0),
        }
    }

    /// No target in view; offset and area are zero
    pub fn none() -> Self {
        TargetReading::default()
    }

    /// Observation vector `[visible, offset, area]` for learned policies
    pub fn observation(&self) -> [f32; 3] {
        if self.visible {
            [1.0, self.offset, self.area]
        } else {
            [0.0, 0.0, 0.0]
        }
    }
}

/// Wall percept over the analysis band for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObstacleReading {
    /// Wall density in the left half of the band
    pub left_ratio: f32,
    /// Wall density in the right half of the band
    pub right_ratio: f32,
    /// Center sub-band density exceeds the blockage threshold
    pub center_blocked: bool,
    /// Raw `right_ratio - left_ratio` for this frame
    pub diff: f32,
    /// Wall density over the whole band
    pub wall_ratio: f32,
    /// Center blocked and both flanks above the dead-end side threshold
    pub is_dead_end: bool,
}

impl ObstacleReading {
    /// Build a reading from region densities, applying the blockage and
    /// dead-end thresholds
    pub fn from_densities(left: f32, right: f32, center: f32, wall: f32, config: &NavigationConfig) -> Self {
        let left_ratio = left.clamp(0.0, 1.0);
        let right_ratio = right.clamp(0.0, 1.0);
        let center_blocked = center.clamp(0.0, 1.0) > config.blockage_threshold;
        let side = config.dead_end_side_ratio;

        ObstacleReading {
            left_ratio,
            right_ratio,
            center_blocked,
            diff: right_ratio - left_ratio,
            wall_ratio: wall.clamp(0.0, 1.0),
            is_dead_end: center_blocked && left_ratio > side && right_ratio > side,
        }
    }

    /// No walls in the band
    pub fn clear() -> Self {
        ObstacleReading::default()
    }
}

/// Everything the engine reads from one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    /// Target blob percept
    pub target: TargetReading,
    /// Wall density percept
    pub obstacles: ObstacleReading,
}

impl Features {
    /// Empty frame: no target, no walls
    pub fn empty() -> Self {
        Features::default()
    }
}

/// Turns a decoded frame into features.
///
/// Implementations keep no state between calls, and degrade to
/// [`TargetReading::none`] and zero densities instead of failing.
pub trait FeatureExtractor {
    /// Extract target and wall readings from one frame
    fn extract(&self, image: &RgbImage) -> Features;
}
