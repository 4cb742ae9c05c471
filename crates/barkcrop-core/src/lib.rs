//! barkcrop core - point-driven crop extraction
//!
//! This crate provides everything behind the barkcrop window: source discovery,
//! the preview/original coordinate mapping, clamped crop extraction,
//! sequential output naming and the per-run annotation session.

pub mod config;
pub mod decode;
pub mod encode;
pub mod enumerate;
pub mod naming;
pub mod overlay;
pub mod session;
pub mod transform;

pub use config::{ConfigError, CropSettings, Settings};
pub use enumerate::{enumerate_sources, EnumerateError};
pub use overlay::{DisplayRect, OverlayMarker};
pub use session::{Command, CommitReport, Outcome, Session, SessionError, SessionState};
pub use transform::{extract_crop, CropRegion, DisplayScale};

/// Annotated crop centre in original image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let p = Point::new(3, 9);
        assert_eq!((p.x, p.y), (3, 9));
    }

    #[test]
    fn test_duplicate_points_are_equal() {
        assert_eq!(Point::new(1, 2), Point::new(1, 2));
        assert_ne!(Point::new(1, 2), Point::new(2, 1));
    }
}
