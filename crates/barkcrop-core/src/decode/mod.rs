//! Image decoding pipeline for barkcrop.
//!
//! This module provides functionality for:
//! - Reading JPEG and PNG source photographs from disk
//! - Applying EXIF orientation so pixel coordinates match what the operator sees
//! - Resizing for preview surfaces and normalized crop output
//!
//! All operations are synchronous; one source image is held in memory at a time.

mod file;
mod resize;
mod types;

pub use file::{decode_bytes, decode_file};
pub use resize::resize;
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
