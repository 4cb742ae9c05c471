//! Decoding of source photographs with EXIF orientation handling.

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::DynamicImage;
use image::ImageReader;

use super::{DecodeError, DecodedImage, Orientation};

/// Read and decode an image file, applying EXIF orientation correction.
///
/// The returned pixel buffer is upright, so coordinates picked on the preview
/// line up with the pixels that get cropped.
///
/// # Errors
///
/// Returns `DecodeError::IoError` if the file cannot be read and
/// `DecodeError::CorruptedFile` if its contents do not decode.
pub fn decode_file(path: &Path) -> Result<DecodedImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|e| DecodeError::IoError(e.to_string()))?;
    decode_bytes(&bytes)
}

/// Decode an encoded image (JPEG, PNG) from bytes, applying EXIF orientation.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for empty input and
/// `DecodeError::CorruptedFile` if the bytes cannot be decoded.
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    // Read orientation before the decoder consumes the buffer
    let orientation = extract_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let rgb_img = apply_orientation(img, orientation).into_rgb8();
    Ok(DecodedImage::from_rgb_image(rgb_img))
}

/// Returns `Orientation::Normal` if no EXIF data is found.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_image, OutputFormat};

    fn encoded_test_image(width: u32, height: u32, format: OutputFormat) -> Vec<u8> {
        let pixels = vec![200u8; (width * height * 3) as usize];
        encode_image(&pixels, width, height, format, 95).unwrap()
    }

    #[test]
    fn test_decode_jpeg_bytes() {
        let bytes = encoded_test_image(40, 30, OutputFormat::Jpeg);
        let img = decode_bytes(&bytes).unwrap();

        assert_eq!(img.width, 40);
        assert_eq!(img.height, 30);
        assert_eq!(img.pixels.len(), 40 * 30 * 3);
    }

    #[test]
    fn test_decode_png_bytes() {
        let bytes = encoded_test_image(7, 5, OutputFormat::Png);
        let img = decode_bytes(&bytes).unwrap();

        assert_eq!((img.width, img.height), (7, 5));
        // PNG is lossless
        assert_eq!(img.pixel(3, 2), Some([200, 200, 200]));
    }

    #[test]
    fn test_decode_garbage_is_corrupted() {
        match decode_bytes(&[0x00, 0x01, 0x02, 0x03]) {
            Err(DecodeError::CorruptedFile(_)) => {}
            other => panic!("Expected CorruptedFile error, got: {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_bytes() {
        assert!(matches!(decode_bytes(&[]), Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated_jpeg() {
        let bytes = encoded_test_image(40, 30, OutputFormat::Jpeg);
        assert!(decode_bytes(&bytes[..20]).is_err());
    }

    #[test]
    fn test_decode_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = decode_file(&dir.path().join("missing.jpg"));
        assert!(matches!(result, Err(DecodeError::IoError(_))));
    }

    #[test]
    fn test_orientation_without_exif_is_normal() {
        let bytes = encoded_test_image(4, 4, OutputFormat::Jpeg);
        assert_eq!(extract_orientation(&bytes), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_swaps_dimensions() {
        let img = DynamicImage::new_rgb8(6, 4);
        let rotated = apply_orientation(img.clone(), Orientation::Rotate90CW);
        assert_eq!((rotated.width(), rotated.height()), (4, 6));

        let flipped = apply_orientation(img, Orientation::FlipHorizontal);
        assert_eq!((flipped.width(), flipped.height()), (6, 4));
    }
}
