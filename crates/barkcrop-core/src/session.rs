//! The per-run annotation session.
//!
//! A `Session` walks the enumerated sources one at a time. For each image the
//! operator adds points by clicking the preview, may clear them, and finally
//! commits (extract, write, advance) or quits the whole run.
//!
//! ```text
//! Idle --advance--> Collecting --commit--> Collecting (next image)
//!                       |                   \-> Finished (no images left)
//!                       +--quit--> Quit (from any state)
//! ```
//!
//! Sources that fail to decode are skipped without entering `Collecting`.
//! Nothing is kept across images except what is on disk; output numbering is
//! re-read from the destination folder on every commit.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::CropSettings;
use crate::decode::{decode_file, resize, DecodeError, DecodedImage, FilterType};
use crate::encode::{write_image, EncodeError, OutputFormat};
use crate::naming::{output_folder, OutputNamer};
use crate::overlay::{overlay_markers, OverlayMarker};
use crate::transform::{extract_crop, CropRegion};
use crate::Point;

/// Errors raised while committing. The session stays on the current image.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to prepare output folder {path}: {message}")]
    OutputFolder { path: String, message: String },

    #[error("Failed to extract crop: {0}")]
    Extract(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Operator input, in display coordinates where applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pointer click on the preview.
    Click { x: u32, y: u32 },
    /// Drop all points of the current image.
    Clear,
    /// Extract and save the current points, then move on.
    Commit,
    /// End the run, discarding unsaved points.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded yet.
    Idle,
    /// An image is loaded and accepting points.
    Collecting,
    /// Every source has been visited.
    Finished,
    /// The operator ended the run.
    Quit,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Finished | SessionState::Quit)
    }
}

/// Files written by one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Output paths in point order.
    pub written: Vec<PathBuf>,
    /// Points whose clamped region was empty.
    pub skipped: usize,
}

/// Result of a handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added(Point),
    Cleared(usize),
    Committed(CommitReport),
    Quit,
    /// The command is not accepted in the current state.
    Ignored,
}

struct ActiveImage {
    index: usize,
    path: PathBuf,
    image: DecodedImage,
    preview: DecodedImage,
    points: Vec<Point>,
}

/// Interaction state for one run.
pub struct Session {
    settings: CropSettings,
    sources: Vec<PathBuf>,
    next: usize,
    current: Option<ActiveImage>,
    state: SessionState,
}

impl Session {
    /// Create a session over `sources`. Call `advance` to load the first image.
    pub fn new(settings: CropSettings, sources: Vec<PathBuf>) -> Self {
        Self {
            settings,
            sources,
            next: 0,
            current: None,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn settings(&self) -> &CropSettings {
        &self.settings
    }

    /// Points of the current image, in insertion order.
    pub fn points(&self) -> &[Point] {
        self.current
            .as_ref()
            .map(|c| c.points.as_slice())
            .unwrap_or_default()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|c| c.path.as_path())
    }

    /// 1-based position of the current image and the number of sources.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current
            .as_ref()
            .map(|c| (c.index + 1, self.sources.len()))
    }

    /// Scaled preview of the current image.
    pub fn preview(&self) -> Option<&DecodedImage> {
        self.current.as_ref().map(|c| &c.preview)
    }

    /// Crop outlines and dots for the current points, in preview pixels.
    pub fn overlay(&self) -> Vec<OverlayMarker> {
        match &self.current {
            Some(current) => overlay_markers(
                &current.points,
                self.settings.display_scale,
                self.settings.crop_size,
                current.preview.width,
                current.preview.height,
            ),
            None => Vec::new(),
        }
    }

    /// Load the next decodable source.
    ///
    /// Undecodable files are logged and skipped. When no sources remain the
    /// session becomes `Finished`.
    pub fn advance(&mut self) -> SessionState {
        if self.state == SessionState::Quit {
            return self.state;
        }
        self.current = None;

        while self.next < self.sources.len() {
            let index = self.next;
            self.next += 1;
            let path = self.sources[index].clone();

            match self.load(&path) {
                Ok((image, preview)) => {
                    info!(
                        "[{}/{}] Processing: {}",
                        index + 1,
                        self.sources.len(),
                        path.display()
                    );
                    self.current = Some(ActiveImage {
                        index,
                        path,
                        image,
                        preview,
                        points: Vec::new(),
                    });
                    self.state = SessionState::Collecting;
                    return self.state;
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        info!("Done.");
        self.state = SessionState::Finished;
        self.state
    }

    fn load(&self, path: &Path) -> Result<(DecodedImage, DecodedImage), DecodeError> {
        let image = decode_file(path)?;
        if image.is_empty() {
            return Err(DecodeError::InvalidFormat);
        }
        let (width, height) = self
            .settings
            .display_scale
            .display_size(image.width, image.height);
        let preview = resize(&image, width, height, FilterType::Bilinear)?;
        Ok((image, preview))
    }

    /// Apply one operator command.
    ///
    /// # Errors
    ///
    /// Only `Commit` can fail, when a crop cannot be written. The current
    /// image and its points are kept so the commit can be retried.
    pub fn handle(&mut self, command: Command) -> Result<Outcome, SessionError> {
        if command != Command::Quit && self.state != SessionState::Collecting {
            debug!("Ignoring {:?} in state {:?}", command, self.state);
            return Ok(Outcome::Ignored);
        }

        match command {
            Command::Quit => {
                self.quit();
                Ok(Outcome::Quit)
            }
            Command::Click { x, y } => {
                let point = self.settings.display_scale.click_to_point(x, y);
                let Some(current) = self.current.as_mut() else {
                    return Ok(Outcome::Ignored);
                };
                current.points.push(point);
                info!("Added point (original coords): ({}, {})", point.x, point.y);
                Ok(Outcome::Added(point))
            }
            Command::Clear => {
                let Some(current) = self.current.as_mut() else {
                    return Ok(Outcome::Ignored);
                };
                let cleared = current.points.len();
                current.points.clear();
                info!("Cleared points.");
                Ok(Outcome::Cleared(cleared))
            }
            Command::Commit => {
                let report = self.commit_current()?;
                self.advance();
                Ok(Outcome::Committed(report))
            }
        }
    }

    fn quit(&mut self) {
        if let Some(current) = self.current.take() {
            if !current.points.is_empty() {
                info!(
                    "Discarding {} unsaved point(s) for {}",
                    current.points.len(),
                    current.path.display()
                );
            }
        }
        self.state = SessionState::Quit;
    }

    fn commit_current(&self) -> Result<CommitReport, SessionError> {
        let mut report = CommitReport::default();
        let Some(current) = self.current.as_ref() else {
            return Ok(report);
        };
        if current.points.is_empty() {
            return Ok(report);
        }

        let settings = &self.settings;
        let folder = output_folder(&settings.input_root, &settings.output_root, &current.path);
        let extension = OutputFormat::extension_for(&current.path);
        let format = OutputFormat::for_source(&current.path);

        let folder_error = |e: std::io::Error| SessionError::OutputFolder {
            path: folder.display().to_string(),
            message: e.to_string(),
        };
        let mut namer = OutputNamer::open(folder.clone(), &extension, &settings.extensions)
            .map_err(folder_error)?;

        for &point in &current.points {
            let crop = extract_crop(
                &current.image,
                point,
                settings.crop_size,
                settings.output_size,
                settings.filter,
            )?;

            let Some(crop) = crop else {
                let region = CropRegion::around(
                    point,
                    settings.crop_size,
                    current.image.width,
                    current.image.height,
                );
                warn!(
                    "Point ({}, {}) has an empty crop region {:?}, skipped",
                    point.x, point.y, region
                );
                report.skipped += 1;
                continue;
            };

            let path = namer.reserve().map_err(folder_error)?;
            write_image(
                &path,
                &crop.pixels,
                crop.width,
                crop.height,
                format,
                settings.jpeg_quality,
            )?;
            info!("Saved: {}", path.display());
            report.written.push(path);
        }

        Ok(report)
    }
}
