//! Image encoding pipeline for barkcrop.
//!
//! This module provides functionality for:
//! - Encoding crops to JPEG (configurable quality) or PNG
//! - Writing encoded crops to their output path

mod writer;

pub use writer::{encode_image, write_image, EncodeError, OutputFormat};
