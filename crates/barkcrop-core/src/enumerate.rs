//! Discovery of source photographs.
//!
//! The input tree is walked recursively and every file with a recognized
//! extension becomes a candidate, sorted by full path. The output root is
//! never treated as input, even when it lives inside the input root, so
//! previously written crops are not offered for cropping again.

use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that abort a run before any interaction begins.
#[derive(Debug, Error)]
pub enum EnumerateError {
    /// The input root does not exist or is not a directory.
    #[error("Input directory not found: {}", .0.display())]
    InputRootMissing(PathBuf),

    /// Nothing to process.
    #[error("No images found in {}", .0.display())]
    NoImages(PathBuf),
}

/// Case-insensitive extension check. `extensions` are given without the dot.
pub fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Walk `input_root` and collect candidate images, excluding `output_root`.
///
/// Paths are returned as found under `input_root` (not canonicalized) and
/// sorted lexicographically by the full path string, not component-wise.
///
/// # Errors
///
/// `EnumerateError::InputRootMissing` if `input_root` is not a directory and
/// `EnumerateError::NoImages` if no candidate remains.
pub fn enumerate_sources(
    input_root: &Path,
    output_root: &Path,
    extensions: &[String],
) -> Result<Vec<PathBuf>, EnumerateError> {
    if !input_root.is_dir() {
        return Err(EnumerateError::InputRootMissing(input_root.to_path_buf()));
    }

    let excluded = OutputExclusion::new(output_root);

    let mut paths: Vec<PathBuf> = WalkDir::new(input_root)
        .follow_links(true)
        .into_iter()
        // Do not descend into the output tree at all
        .filter_entry(|entry| !excluded.contains(entry.path()))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_image_extension(path, extensions))
        .collect();

    if paths.is_empty() {
        return Err(EnumerateError::NoImages(input_root.to_path_buf()));
    }

    // Whole-string order, so `site-2/` sorts before `site/`
    paths.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    Ok(paths)
}

/// The output root in both its given and resolved spelling.
struct OutputExclusion {
    lexical: PathBuf,
    resolved: Option<PathBuf>,
}

impl OutputExclusion {
    fn new(output_root: &Path) -> Self {
        Self {
            lexical: output_root.to_path_buf(),
            resolved: std::fs::canonicalize(output_root).ok(),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        if path.starts_with(&self.lexical) {
            return true;
        }
        match &self.resolved {
            Some(resolved) => std::fs::canonicalize(path)
                .map(|p| p.starts_with(resolved))
                .unwrap_or(false),
            // An output root that does not exist yet holds no files
            None => false,
        }
    }
}
