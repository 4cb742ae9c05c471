//! Geometry between the preview, the source image and the crop.
//!
//! # Coordinate System
//!
//! - Points are stored in original image pixels, origin at the top-left
//! - The preview is the original scaled by a fixed factor `0 < s <= 1`
//! - Crop regions are half-open pixel rectangles clamped to the image

mod crop;
mod scale;

pub use crop::{copy_region, extract_crop, CropRegion};
pub use scale::{DisplayScale, ScaleError};
