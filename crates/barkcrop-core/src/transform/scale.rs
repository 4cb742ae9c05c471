//! Mapping between the scaled preview and the original image.
//!
//! The operator clicks on a preview that is `s` times the size of the source
//! photograph. Clicks are converted to original pixel coordinates once, when
//! they happen; stored points are never rebuilt from display values.
//!
//! Both directions truncate:
//!
//! - `display = floor(original * s)`
//! - `original = floor(display / s)`
//!
//! so a round trip is not exact. `to_original(to_display(p))` never exceeds
//! `p` and falls short by less than one display pixel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Point;

/// Invalid display scale.
#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("Display scale must be in (0, 1], got {0}")]
    OutOfRange(f64),
}

/// Scale factor from original pixels to display pixels, `0 < s <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct DisplayScale(f64);

impl DisplayScale {
    pub fn new(factor: f64) -> Result<Self, ScaleError> {
        if factor.is_finite() && factor > 0.0 && factor <= 1.0 {
            Ok(Self(factor))
        } else {
            Err(ScaleError::OutOfRange(factor))
        }
    }

    #[inline]
    pub fn factor(self) -> f64 {
        self.0
    }

    /// Original-space coordinate to display space.
    #[inline]
    pub fn to_display(self, original: u32) -> u32 {
        (original as f64 * self.0).floor() as u32
    }

    /// Display-space coordinate to original space.
    #[inline]
    pub fn to_original(self, display: u32) -> u32 {
        // `as` saturates, which only matters for absurd display values
        (display as f64 / self.0).floor() as u32
    }

    /// Size of the preview surface for an image of `width x height`.
    /// Each side is at least one pixel.
    pub fn display_size(self, width: u32, height: u32) -> (u32, u32) {
        (
            self.to_display(width).max(1),
            self.to_display(height).max(1),
        )
    }

    /// Convert a click on the preview into a stored point.
    pub fn click_to_point(self, display_x: u32, display_y: u32) -> Point {
        Point::new(self.to_original(display_x), self.to_original(display_y))
    }

    /// Where a stored point is drawn on the preview.
    pub fn point_to_display(self, point: Point) -> (u32, u32) {
        (self.to_display(point.x), self.to_display(point.y))
    }

    /// Half of the crop edge in display pixels. Kept fractional; overlay
    /// rectangles are only a visual guide.
    pub fn half_extent(self, crop_size: u32) -> f64 {
        (crop_size / 2) as f64 * self.0
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self(0.5)
    }
}

impl TryFrom<f64> for DisplayScale {
    type Error = ScaleError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayScale> for f64 {
    fn from(scale: DisplayScale) -> Self {
        scale.0
    }
}
