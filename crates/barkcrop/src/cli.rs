//! Command-line arguments.

use std::path::PathBuf;

use barkcrop_core::decode::FilterType;
use barkcrop_core::{ConfigError, DisplayScale, Settings};
use clap::Parser;

/// Mark square patches on photographs and save them as fixed-size crops.
///
/// Click to add a crop centre, `c` to clear, `n` or Enter to save and move to
/// the next photograph, `q` or Esc to quit.
#[derive(Debug, Parser)]
#[command(name = "barkcrop", version)]
pub struct Args {
    /// Root directory of the source photographs.
    pub input: Option<PathBuf>,

    /// Root of the crop tree [default: <INPUT>/crop/<LABEL>].
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output subfolder name [default: name of the input directory].
    #[arg(short, long)]
    pub label: Option<String>,

    /// JSON settings file; explicit flags take precedence.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Recognized source extensions, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Crop edge length in original pixels.
    #[arg(long)]
    pub crop_size: Option<u32>,

    /// Edge length every crop is resized to.
    #[arg(long)]
    pub output_size: Option<u32>,

    /// Preview scale, 0 < SCALE <= 1.
    #[arg(short, long)]
    pub scale: Option<f64>,

    /// JPEG quality for saved crops (1-100).
    #[arg(long)]
    pub quality: Option<u8>,

    /// Resize filter: nearest, bilinear or lanczos3.
    #[arg(long)]
    pub filter: Option<FilterType>,
}

impl Args {
    /// Layer the arguments over the config file (if any) and the defaults.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_json_file(path)?,
            None => Settings::default(),
        };

        if let Some(input) = self.input {
            settings.input = Some(input);
        }
        if let Some(output) = self.output {
            settings.output = Some(output);
        }
        if let Some(label) = self.label {
            settings.label = Some(label);
        }
        if let Some(extensions) = self.extensions {
            settings.extensions = extensions;
        }
        if let Some(crop_size) = self.crop_size {
            settings.crop_size = crop_size;
        }
        if let Some(output_size) = self.output_size {
            settings.output_size = output_size;
        }
        if let Some(scale) = self.scale {
            settings.display_scale = DisplayScale::new(scale)?;
        }
        if let Some(quality) = self.quality {
            settings.jpeg_quality = quality;
        }
        if let Some(filter) = self.filter {
            settings.filter = filter;
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_input_only() {
        let args = Args::try_parse_from(["barkcrop", "/photos/red-gum"]).unwrap();
        let settings = args.into_settings().unwrap();

        assert_eq!(settings.input, Some(PathBuf::from("/photos/red-gum")));
        assert_eq!(settings.crop_size, 700);
        assert_eq!(settings.output_size, 500);
    }

    #[test]
    fn test_flags_override() {
        let args = Args::try_parse_from([
            "barkcrop",
            "/in",
            "--crop-size",
            "300",
            "--output-size",
            "128",
            "--scale",
            "0.25",
            "--extensions",
            "jpg,tif",
            "--filter",
            "lanczos3",
            "--quality",
            "80",
        ])
        .unwrap();
        let settings = args.into_settings().unwrap();

        assert_eq!(settings.crop_size, 300);
        assert_eq!(settings.output_size, 128);
        assert_eq!(settings.display_scale.factor(), 0.25);
        assert_eq!(settings.extensions, vec!["jpg", "tif"]);
        assert_eq!(settings.filter, FilterType::Lanczos3);
        assert_eq!(settings.jpeg_quality, 80);
    }

    #[test]
    fn test_bad_scale_rejected() {
        let args = Args::try_parse_from(["barkcrop", "/in", "--scale", "1.5"]).unwrap();
        assert!(matches!(args.into_settings(), Err(ConfigError::Scale(_))));
    }

    #[test]
    fn test_unknown_filter_is_a_parse_error() {
        assert!(Args::try_parse_from(["barkcrop", "/in", "--filter", "cubic"]).is_err());
    }

    #[test]
    fn test_flags_beat_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("barkcrop.json");
        std::fs::write(&path, r#"{ "input": "/from-file", "crop_size": 400, "label": "ironbark" }"#)
            .unwrap();

        let args = Args::try_parse_from([
            "barkcrop",
            "--config",
            path.to_str().unwrap(),
            "--crop-size",
            "900",
        ])
        .unwrap();
        let settings = args.into_settings().unwrap();

        assert_eq!(settings.input, Some(PathBuf::from("/from-file")));
        assert_eq!(settings.label.as_deref(), Some("ironbark"));
        assert_eq!(settings.crop_size, 900);
    }
}
