//! Run settings.
//!
//! Settings come from defaults, an optional JSON file and command-line
//! overrides, in that order of precedence (lowest first). They are validated
//! once at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::transform::{DisplayScale, ScaleError};

/// Crop edge length in original pixels.
pub const DEFAULT_CROP_SIZE: u32 = 700;
/// Edge length every crop is resized to.
pub const DEFAULT_OUTPUT_SIZE: u32 = 500;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Configuration errors. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("No input directory configured")]
    MissingInput,

    #[error("{field} must be greater than zero")]
    ZeroSize { field: &'static str },

    #[error("JPEG quality must be in 1..=100, got {0}")]
    Quality(u8),

    #[error("At least one image extension is required")]
    NoExtensions,

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Everything a run needs, as loaded from file/CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the source photographs.
    pub input: Option<PathBuf>,
    /// Root of the crop tree. Defaults to `<input>/crop/<label>`.
    pub output: Option<PathBuf>,
    /// Name of the output subfolder. Defaults to the input directory's name.
    pub label: Option<String>,
    /// Recognized source extensions, without the dot.
    pub extensions: Vec<String>,
    pub crop_size: u32,
    pub output_size: u32,
    pub display_scale: DisplayScale,
    pub jpeg_quality: u8,
    pub filter: FilterType,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            label: None,
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            crop_size: DEFAULT_CROP_SIZE,
            output_size: DEFAULT_OUTPUT_SIZE,
            display_scale: DisplayScale::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            filter: FilterType::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Check the settings and resolve defaults that depend on the input root.
    pub fn validate(self) -> Result<CropSettings, ConfigError> {
        let input_root = self.input.ok_or(ConfigError::MissingInput)?;

        if self.crop_size == 0 {
            return Err(ConfigError::ZeroSize { field: "crop_size" });
        }
        if self.output_size == 0 {
            return Err(ConfigError::ZeroSize { field: "output_size" });
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Quality(self.jpeg_quality));
        }

        let extensions: Vec<String> = self
            .extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }

        // Re-check in case the value was built without going through serde
        let display_scale = DisplayScale::new(self.display_scale.factor())?;

        let output_root = match self.output {
            Some(output) => output,
            None => {
                let label = self.label.or_else(|| {
                    input_root
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                });
                match label {
                    Some(label) => input_root.join("crop").join(label),
                    None => input_root.join("crop"),
                }
            }
        };

        Ok(CropSettings {
            input_root,
            output_root,
            extensions,
            crop_size: self.crop_size,
            output_size: self.output_size,
            display_scale,
            jpeg_quality: self.jpeg_quality,
            filter: self.filter,
        })
    }
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSettings {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub extensions: Vec<String>,
    pub crop_size: u32,
    pub output_size: u32,
    pub display_scale: DisplayScale,
    pub jpeg_quality: u8,
    pub filter: FilterType,
}
