// perception/vision.rs

// Colour-based feature extractor: the largest red blob is the target, blue
// pixels in the lower analysis band are walls.

// Dependencies
use super::color::{count_set, segment, HsvRange};
use super::{FeatureExtractor, Features, ObstacleReading, TargetReading};
use crate::navigation::NavigationConfig;
use crate::{LabyrinthError, Result};
use image::{GrayImage, RgbImage};
use log::trace;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Segmentation colours and analysis band geometry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Target hue ranges; red needs two because it wraps around hue 0
    pub target_ranges: Vec<HsvRange>,
    /// Wall hue ranges
    pub wall_ranges: Vec<HsvRange>,
    /// Blobs with at most this many pixels are treated as noise
    pub min_blob_pixels: u32,
    /// Top of the analysis band as a fraction of the frame height
    pub band_start: f32,
    /// Left edge of the center sub-band as a fraction of the width
    pub center_start: f32,
    /// Right edge of the center sub-band as a fraction of the width
    pub center_end: f32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            target_ranges: vec![
                HsvRange::new([0, 100, 80], [10, 255, 255]),
                HsvRange::new([170, 100, 80], [180, 255, 255]),
            ],
            wall_ranges: vec![HsvRange::new([95, 80, 60], [135, 255, 255])],
            min_blob_pixels: 50,
            band_start: 0.5,
            center_start: 0.4,
            center_end: 0.6,
        }
    }
}

impl VisionConfig {
    /// Check colour ranges and band fractions
    pub fn validate(&self) -> Result<()> {
        if self.target_ranges.is_empty() || self.wall_ranges.is_empty() {
            return Err(LabyrinthError::InvalidConfig(
                "vision needs at least one target and one wall range".to_string(),
            ));
        }
        if let Some(range) = self
            .target_ranges
            .iter()
            .chain(&self.wall_ranges)
            .find(|range| !range.is_valid())
        {
            return Err(LabyrinthError::InvalidConfig(format!(
                "vision range {:?} is inverted or outside the hue scale",
                range
            )));
        }
        if !(0.0..1.0).contains(&self.band_start) {
            return Err(LabyrinthError::InvalidConfig(format!(
                "vision.band_start must be within [0, 1), got {}",
                self.band_start
            )));
        }
        if !(0.0 <= self.center_start && self.center_start < self.center_end && self.center_end <= 1.0) {
            return Err(LabyrinthError::InvalidConfig(format!(
                "vision center band [{}, {}) is empty or outside the frame",
                self.center_start, self.center_end
            )));
        }
        Ok(())
    }
}

/// Connected region of a mask
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blob {
    /// Pixel count
    pub pixels: u32,
    /// Mean pixel position
    pub centroid: Point2<f32>,
}

/// Largest 8-connected region of set pixels, if any
pub fn largest_blob(mask: &GrayImage) -> Option<Blob> {
    let (w, h) = mask.dimensions();
    let mut visited = vec![false; (w as usize) * (h as usize)];
    let mut queue = VecDeque::new();
    let mut best: Option<Blob> = None;

    for start_y in 0..h {
        for start_x in 0..w {
            let start = (start_y * w + start_x) as usize;
            if visited[start] || mask.get_pixel(start_x, start_y).0[0] == 0 {
                continue;
            }

            visited[start] = true;
            queue.push_back((start_x, start_y));
            let mut pixels = 0u32;
            let mut sum = Vector2::<f32>::zeros();

            while let Some((x, y)) = queue.pop_front() {
                pixels += 1;
                sum += Vector2::new(x as f32, y as f32);

                for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                    for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                        let idx = (ny * w + nx) as usize;
                        if !visited[idx] && mask.get_pixel(nx, ny).0[0] != 0 {
                            visited[idx] = true;
                            queue.push_back((nx, ny));
                        }
                    }
                }
            }

            if best.is_none_or(|b| pixels > b.pixels) {
                best = Some(Blob {
                    pixels,
                    centroid: Point2::from(sum / pixels as f32),
                });
            }
        }
    }
    best
}

/// Feature extractor based on HSV colour segmentation
#[derive(Clone, Debug)]
pub struct ColorFeatureExtractor {
    vision: VisionConfig,
    navigation: NavigationConfig,
}

impl ColorFeatureExtractor {
    /// Create an extractor; blockage and dead-end thresholds come from
    /// `navigation`
    pub fn new(vision: &VisionConfig, navigation: &NavigationConfig) -> Self {
        ColorFeatureExtractor {
            vision: vision.clone(),
            navigation: navigation.clone(),
        }
    }

    /// Locate the target blob
    pub fn find_target(&self, image: &RgbImage) -> TargetReading {
        let (w, h) = image.dimensions();
        let mask = segment(image, &self.vision.target_ranges);
        let Some(blob) = largest_blob(&mask) else {
            return TargetReading::none();
        };
        if blob.pixels <= self.vision.min_blob_pixels {
            trace!("target blob of {} px ignored as noise", blob.pixels);
            return TargetReading::none();
        }

        let offset = blob.centroid.x / w as f32 - 0.5;
        let area = blob.pixels as f32 / (w as f32 * h as f32);
        TargetReading::new(offset, area)
    }

    /// Measure wall density in the analysis band
    pub fn measure_walls(&self, image: &RgbImage) -> ObstacleReading {
        let (w, h) = image.dimensions();
        let mask = segment(image, &self.vision.wall_ranges);

        let y0 = ((h as f32 * self.vision.band_start) as u32).min(h);
        let mid = w / 2;
        let cx0 = (w as f32 * self.vision.center_start) as u32;
        let cx1 = (w as f32 * self.vision.center_end) as u32;

        let density = |x0: u32, x1: u32| -> f32 {
            let area = x1.saturating_sub(x0) as u64 * (h - y0) as u64;
            if area == 0 {
                return 0.0;
            }
            count_set(&mask, x0, x1, y0, h) as f32 / area as f32
        };

        ObstacleReading::from_densities(
            density(0, mid),
            density(mid, w),
            density(cx0, cx1),
            density(0, w),
            &self.navigation,
        )
    }
}

impl FeatureExtractor for ColorFeatureExtractor {
    fn extract(&self, image: &RgbImage) -> Features {
        if image.width() == 0 || image.height() == 0 {
            return Features::empty();
        }
        Features {
            target: self.find_target(image),
            obstacles: self.measure_walls(image),
        }
    }
}
