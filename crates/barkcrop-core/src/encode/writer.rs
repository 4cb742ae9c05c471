//! JPEG and PNG encoding for extracted crops.
//!
//! Crops are written in the same format as the photograph they came from.
//! JPEG output uses a configurable quality; PNG output is lossless.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use thiserror::Error;

/// Errors that can occur during encoding or writing.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Writing the encoded bytes failed
    #[error("Failed to write {path}: {message}")]
    WriteFailed { path: String, message: String },
}

/// On-disk format of an extracted crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Pick the output format for a source file. Anything that is not PNG is
    /// written as JPEG.
    pub fn for_source(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        }
    }

    /// Canonical extension of the format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// File extension used for output names of `path`'s crops.
    ///
    /// Always one the encoder actually writes. A JPEG source keeps its
    /// spelling (`jpg` or `jpeg`); anything else gets the canonical extension
    /// of `for_source`, so a `.tif` source yields `.jpg` crops.
    pub fn extension_for(path: &Path) -> String {
        let format = Self::for_source(path);
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
        {
            Some(ext) if format == OutputFormat::Jpeg && (ext == "jpg" || ext == "jpeg") => ext,
            _ => format.extension().to_string(),
        }
    }
}

/// Encode RGB pixel data in the given format.
///
/// `quality` only applies to JPEG and is clamped to 1..=100.
pub fn encode_image(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());

    let result = match format {
        OutputFormat::Jpeg => JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
            .write_image(pixels, width, height, ExtendedColorType::Rgb8),
        OutputFormat::Png => {
            PngEncoder::new(&mut buffer).write_image(pixels, width, height, ExtendedColorType::Rgb8)
        }
    };
    result.map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode and write an image to `path`. Parent directories must exist.
pub fn write_image(
    path: &Path,
    pixels: &[u8],
    width: u32,
    height: u32,
    format: OutputFormat,
    quality: u8,
) -> Result<(), EncodeError> {
    let bytes = encode_image(pixels, width, height, format, quality)?;
    std::fs::write(path, bytes).map_err(|e| EncodeError::WriteFailed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_encode_jpeg_markers() {
        let pixels = vec![128u8; 100 * 100 * 3];
        let jpeg = encode_image(&pixels, 100, 100, OutputFormat::Jpeg, 90).unwrap();

        // SOI and EOI markers
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_png_signature() {
        let pixels = vec![10u8; 8 * 8 * 3];
        let png = encode_image(&pixels, 8, 8, OutputFormat::Png, 90).unwrap();

        assert_eq!(&png[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encode_quality_clamping() {
        let pixels = vec![128u8; 10 * 10 * 3];

        assert!(encode_image(&pixels, 10, 10, OutputFormat::Jpeg, 0).is_ok());
        assert!(encode_image(&pixels, 10, 10, OutputFormat::Jpeg, 255).is_ok());
    }

    #[test]
    fn test_encode_invalid_pixel_data() {
        let pixels = vec![128u8; 99 * 100 * 3]; // One row short

        let result = encode_image(&pixels, 100, 100, OutputFormat::Jpeg, 90);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidPixelData {
                expected: 30000,
                actual: 29700
            })
        ));
    }

    #[test]
    fn test_encode_zero_dimensions() {
        let result = encode_image(&[], 0, 10, OutputFormat::Png, 90);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidDimensions { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_format_for_source() {
        assert_eq!(
            OutputFormat::for_source(&PathBuf::from("a/b.PNG")),
            OutputFormat::Png
        );
        assert_eq!(
            OutputFormat::for_source(&PathBuf::from("a/b.jpeg")),
            OutputFormat::Jpeg
        );
        assert_eq!(
            OutputFormat::for_source(&PathBuf::from("a/b")),
            OutputFormat::Jpeg
        );
    }

    #[test]
    fn test_extension_keeps_source_spelling() {
        assert_eq!(OutputFormat::extension_for(&PathBuf::from("x.JPG")), "jpg");
        assert_eq!(OutputFormat::extension_for(&PathBuf::from("x.jpeg")), "jpeg");
        assert_eq!(OutputFormat::extension_for(&PathBuf::from("x.png")), "png");
        assert_eq!(OutputFormat::extension_for(&PathBuf::from("x")), "jpg");
    }

    #[test]
    fn test_extension_matches_written_format() {
        for name in ["x.tif", "x.TIFF", "x.webp", "x.bmp"] {
            let path = PathBuf::from(name);
            assert_eq!(OutputFormat::for_source(&path), OutputFormat::Jpeg);
            assert_eq!(OutputFormat::extension_for(&path), "jpg");
        }
        assert_eq!(OutputFormat::Png.extension(), "png");
    }

    #[test]
    fn test_write_image_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.jpg");
        let pixels = vec![50u8; 16 * 16 * 3];

        write_image(&path, &pixels, 16, 16, OutputFormat::Jpeg, 90).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_write_image_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("1.jpg");
        let pixels = vec![50u8; 4 * 4 * 3];

        let result = write_image(&path, &pixels, 4, 4, OutputFormat::Jpeg, 90);
        assert!(matches!(result, Err(EncodeError::WriteFailed { .. })));
    }
}
