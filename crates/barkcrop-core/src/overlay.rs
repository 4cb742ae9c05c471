//! Display-space markers for the annotated points.
//!
//! Each point is drawn as a dot at its scaled position and an outline of the
//! region that will be cropped. Everything is clamped to the preview surface,
//! so markers for points near or beyond the border stay drawable. The outline
//! is approximate; the saved crop is always computed in original space.

use crate::transform::DisplayScale;
use crate::Point;

/// Inclusive pixel rectangle on the preview surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

/// Marker for one annotated point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayMarker {
    /// Dot position, clamped to the surface.
    pub center: (u32, u32),
    /// Outline of the crop region.
    pub outline: DisplayRect,
}

/// Markers for `points` on a surface of `display_width x display_height`.
pub fn overlay_markers(
    points: &[Point],
    scale: DisplayScale,
    crop_size: u32,
    display_width: u32,
    display_height: u32,
) -> Vec<OverlayMarker> {
    let half = scale.half_extent(crop_size);
    let max_x = display_width.saturating_sub(1) as f64;
    let max_y = display_height.saturating_sub(1) as f64;

    points
        .iter()
        .map(|&point| {
            let (cx, cy) = scale.point_to_display(point);
            let (cx, cy) = (cx as f64, cy as f64);

            let outline = DisplayRect {
                x1: (cx - half).clamp(0.0, max_x) as u32,
                y1: (cy - half).clamp(0.0, max_y) as u32,
                x2: (cx + half).clamp(0.0, max_x) as u32,
                y2: (cy + half).clamp(0.0, max_y) as u32,
            };

            OverlayMarker {
                center: (cx.min(max_x) as u32, cy.min(max_y) as u32),
                outline,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half() -> DisplayScale {
        DisplayScale::new(0.5).unwrap()
    }

    #[test]
    fn test_interior_marker() {
        let markers = overlay_markers(&[Point::new(500, 500)], half(), 200, 500, 500);

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].center, (250, 250));
        assert_eq!(
            markers[0].outline,
            DisplayRect { x1: 200, y1: 200, x2: 300, y2: 300 }
        );
    }

    #[test]
    fn test_marker_clamped_to_surface() {
        let markers = overlay_markers(&[Point::new(900, 900)], half(), 700, 500, 500);

        assert_eq!(markers[0].center, (450, 450));
        assert_eq!(
            markers[0].outline,
            DisplayRect { x1: 275, y1: 275, x2: 499, y2: 499 }
        );
    }

    #[test]
    fn test_point_beyond_image_stays_on_surface() {
        let markers = overlay_markers(&[Point::new(5000, 10)], half(), 100, 400, 300);

        let m = markers[0];
        assert_eq!(m.center, (399, 5));
        assert!(m.outline.x1 <= m.outline.x2 && m.outline.x2 <= 399);
        assert!(m.outline.y1 <= m.outline.y2 && m.outline.y2 <= 299);
    }

    #[test]
    fn test_markers_keep_point_order() {
        let points = [Point::new(10, 10), Point::new(600, 20), Point::new(10, 10)];
        let markers = overlay_markers(&points, half(), 20, 500, 500);

        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0], markers[2]);
        assert_eq!(markers[1].center, (300, 10));
    }

    #[test]
    fn test_no_points_no_markers() {
        assert!(overlay_markers(&[], half(), 700, 10, 10).is_empty());
    }
}
