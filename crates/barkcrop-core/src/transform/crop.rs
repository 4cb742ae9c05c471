//! Fixed-size crop extraction around an annotated point.
//!
//! A point marks the centre of a square of edge `crop_size` in original pixel
//! coordinates. The square is clamped to the image, so points near a border
//! produce a smaller, possibly non-square region. That region is then
//! resized to the canonical `output_size x output_size`; border crops are
//! stretched rather than padded.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left pixel
//! - Regions are half-open: `x1..x2`, `y1..y2`

use crate::decode::{resize, DecodeError, DecodedImage, FilterType};
use crate::Point;

/// A clamped crop rectangle in original pixel coordinates.
///
/// Always satisfies `x1 <= x2 <= width` and `y1 <= y2 <= height` for the
/// image it was computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropRegion {
    /// Square of edge `crop_size` centred on `center`, clamped to a
    /// `width x height` image.
    ///
    /// Uses `half = crop_size / 2` on each side, so odd sizes lose one pixel.
    /// Points outside the image clamp to an empty region instead of wrapping.
    pub fn around(center: Point, crop_size: u32, width: u32, height: u32) -> Self {
        let half = crop_size / 2;

        let x1 = center.x.saturating_sub(half).min(width);
        let y1 = center.y.saturating_sub(half).min(height);
        let x2 = center.x.saturating_add(half).min(width).max(x1);
        let y2 = center.y.saturating_add(half).min(height).max(y1);

        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// A zero-area region yields no output.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Copy the pixels of `region` out of `image`.
///
/// Returns `None` for an empty region. The region must lie inside the image,
/// which `CropRegion::around` guarantees.
pub fn copy_region(image: &DecodedImage, region: CropRegion) -> Option<DecodedImage> {
    if region.is_empty() || region.x2 > image.width || region.y2 > image.height {
        return None;
    }

    let out_width = region.width() as usize;
    let out_height = region.height() as usize;
    let src_stride = image.width as usize * 3;
    let row_bytes = out_width * 3;

    let mut output = Vec::with_capacity(out_width * out_height * 3);

    // Copy pixel data row by row
    for y in region.y1 as usize..region.y2 as usize {
        let start = y * src_stride + region.x1 as usize * 3;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    Some(DecodedImage::new(
        region.width(),
        region.height(),
        output,
    ))
}

/// Extract the crop around `center` and resize it to `output_size` square.
///
/// Returns `Ok(None)` when the clamped region is empty, e.g. a point lying
/// outside the image.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if `output_size` is zero.
pub fn extract_crop(
    image: &DecodedImage,
    center: Point,
    crop_size: u32,
    output_size: u32,
    filter: FilterType,
) -> Result<Option<DecodedImage>, DecodeError> {
    let region = CropRegion::around(center, crop_size, image.width, image.height);

    match copy_region(image, region) {
        Some(cropped) => resize(&cropped, output_size, output_size, filter).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 256) as u8;
                pixels.push(v); // R
                pixels.push(v); // G
                pixels.push(v); // B
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_region_interior() {
        let r = CropRegion::around(Point::new(300, 300), 700, 1000, 1000);
        assert_eq!(r, CropRegion { x1: 0, y1: 0, x2: 650, y2: 650 });

        let r = CropRegion::around(Point::new(500, 500), 200, 1000, 1000);
        assert_eq!(r, CropRegion { x1: 400, y1: 400, x2: 600, y2: 600 });
    }

    #[test]
    fn test_region_clamped_bottom_right() {
        let r = CropRegion::around(Point::new(900, 900), 700, 1000, 1000);
        assert_eq!(r, CropRegion { x1: 550, y1: 550, x2: 1000, y2: 1000 });
    }

    #[test]
    fn test_region_non_square_at_edge() {
        let r = CropRegion::around(Point::new(10, 500), 100, 1000, 1000);
        assert_eq!(r.width(), 60);
        assert_eq!(r.height(), 100);
    }

    #[test]
    fn test_region_odd_size() {
        let r = CropRegion::around(Point::new(50, 50), 7, 100, 100);
        assert_eq!(r, CropRegion { x1: 47, y1: 47, x2: 53, y2: 53 });
    }

    #[test]
    fn test_region_outside_image_is_empty() {
        let r = CropRegion::around(Point::new(5000, 20), 100, 1000, 1000);
        assert!(r.is_empty());
        assert!(r.x2 <= 1000);
    }

    #[test]
    fn test_region_crop_size_one_is_empty() {
        // half == 0 gives a degenerate region
        let r = CropRegion::around(Point::new(10, 10), 1, 100, 100);
        assert!(r.is_empty());
    }

    #[test]
    fn test_region_extreme_point_does_not_overflow() {
        let r = CropRegion::around(Point::new(u32::MAX, u32::MAX), 700, 100, 100);
        assert_eq!(r, CropRegion { x1: 100, y1: 100, x2: 100, y2: 100 });
    }

    #[test]
    fn test_copy_region_pixel_values() {
        let img = test_image(10, 10);
        let region = CropRegion { x1: 3, y1: 3, x2: 7, y2: 7 };
        let out = copy_region(&img, region).unwrap();

        assert_eq!((out.width, out.height), (4, 4));
        // First pixel from (3, 3): (3 * 10 + 3) % 256 = 33
        assert_eq!(out.pixel(0, 0), Some([33, 33, 33]));
        // Last pixel from (6, 6): 66
        assert_eq!(out.pixel(3, 3), Some([66, 66, 66]));
    }

    #[test]
    fn test_copy_region_rejects_empty() {
        let img = test_image(10, 10);
        let region = CropRegion { x1: 3, y1: 3, x2: 3, y2: 7 };
        assert!(copy_region(&img, region).is_none());
    }

    #[test]
    fn test_extract_crop_output_size() {
        let img = test_image(1000, 1000);
        let out = extract_crop(&img, Point::new(900, 900), 700, 500, FilterType::Bilinear)
            .unwrap()
            .unwrap();

        assert_eq!((out.width, out.height), (500, 500));
        assert_eq!(out.pixels.len(), 500 * 500 * 3);
    }

    #[test]
    fn test_extract_crop_stretches_border_region() {
        let img = test_image(200, 200);
        let out = extract_crop(&img, Point::new(0, 100), 100, 64, FilterType::Nearest)
            .unwrap()
            .unwrap();

        assert_eq!((out.width, out.height), (64, 64));
    }

    #[test]
    fn test_extract_crop_outside_yields_none() {
        let img = test_image(50, 50);
        let out = extract_crop(&img, Point::new(500, 500), 20, 10, FilterType::Bilinear).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_extract_crop_zero_output_size_errors() {
        let img = test_image(50, 50);
        assert!(extract_crop(&img, Point::new(25, 25), 20, 0, FilterType::Bilinear).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
