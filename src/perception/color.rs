//! Colour segmentation primitives
//!
//! HSV thresholding on the 8-bit scale (hue in `[0, 180)`, saturation and
//! value in `[0, 255]`) and 3×3 binary morphology over `GrayImage` masks,
//! where 255 marks a set pixel.

use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

/// Value of a set mask pixel
pub const MASK_ON: u8 = 255;

/// Inclusive HSV box
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    /// Lower bound `[h, s, v]`
    pub lower: [u8; 3],
    /// Upper bound `[h, s, v]`
    pub upper: [u8; 3],
}

impl HsvRange {
    /// Create a range from lower and upper `[h, s, v]` bounds
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        HsvRange { lower, upper }
    }

    /// Whether `hsv` lies inside the box on every channel
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    /// Whether the bounds are ordered and the hue fits the 8-bit scale
    pub fn is_valid(&self) -> bool {
        (0..3).all(|c| self.lower[c] <= self.upper[c]) && self.upper[0] <= 180
    }
}

/// Convert one RGB pixel to 8-bit HSV
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { delta / max * 255.0 } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0
    }

    [
        ((h / 2.0).round() as u16 % 180) as u8,
        s.round() as u8,
        max as u8,
    ]
}

/// Threshold an image into a mask of pixels inside any of `ranges`
pub fn threshold(image: &RgbImage, ranges: &[HsvRange]) -> GrayImage {
    let mut mask = GrayImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let hsv = rgb_to_hsv(pixel.0);
        if ranges.iter().any(|range| range.contains(hsv)) {
            mask.put_pixel(x, y, Luma([MASK_ON]));
        }
    }
    mask
}

/// 3×3 erosion: a pixel stays set only if every in-frame neighbour is set
pub fn erode(mask: &GrayImage) -> GrayImage {
    morph(mask, true)
}

/// 3×3 dilation: a pixel becomes set if any in-frame neighbour is set
pub fn dilate(mask: &GrayImage) -> GrayImage {
    morph(mask, false)
}

fn morph(mask: &GrayImage, erode: bool) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut out = GrayImage::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let mut all = true;
            let mut any = false;
            for ny in y.saturating_sub(1)..=(y + 1).min(h.saturating_sub(1)) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w.saturating_sub(1)) {
                    let on = mask.get_pixel(nx, ny).0[0] != 0;
                    all &= on;
                    any |= on;
                }
            }
            if (erode && all) || (!erode && any) {
                out.put_pixel(x, y, Luma([MASK_ON]));
            }
        }
    }
    out
}

/// Noise cleanup: opening with two iterations, then one extra dilation
pub fn clean(mask: &GrayImage) -> GrayImage {
    let opened = dilate(&dilate(&erode(&erode(mask))));
    dilate(&opened)
}

/// Threshold and clean in one step
pub fn segment(image: &RgbImage, ranges: &[HsvRange]) -> GrayImage {
    clean(&threshold(image, ranges))
}

/// Count set pixels in the `[x0, x1) × [y0, y1)` window
pub fn count_set(mask: &GrayImage, x0: u32, x1: u32, y0: u32, y1: u32) -> u32 {
    let mut count = 0;
    for y in y0..y1.min(mask.height()) {
        for x in x0..x1.min(mask.width()) {
            if mask.get_pixel(x, y).0[0] != 0 {
                count += 1;
            }
        }
    }
    count
}
