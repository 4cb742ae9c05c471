//! Sequential output naming per destination folder.
//!
//! Crops are written as `1.jpg`, `2.jpg`, ... in a folder that mirrors the
//! source's subdirectory. The next number is always derived from what is on
//! disk: `max(existing) + 1`. Gaps are never refilled, so an interrupted or
//! repeated run continues after the highest existing file instead of
//! overwriting anything. Only one writer may target a folder at a time.

use std::io;
use std::path::{Path, PathBuf};

use crate::enumerate::has_image_extension;

/// Folder that receives the crops of `source`.
///
/// Mirrors the source's parent directory relative to `input_root` under
/// `output_root`. A source directly in the input root (or one that is not
/// under it at all) maps to the output root itself.
pub fn output_folder(input_root: &Path, output_root: &Path, source: &Path) -> PathBuf {
    let relative = source
        .parent()
        .and_then(|parent| parent.strip_prefix(input_root).ok())
        .unwrap_or_else(|| Path::new(""));

    if relative.as_os_str().is_empty() {
        output_root.to_path_buf()
    } else {
        output_root.join(relative)
    }
}

/// Parse a numeric output name such as `12.jpg`.
///
/// Only all-digit stems with a recognized image extension count.
fn parse_index(path: &Path, extensions: &[String]) -> Option<u32> {
    if !has_image_extension(path, extensions) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Next free index in `folder`: one past the highest numeric name, or 1.
///
/// A missing folder counts as empty. Fails when the highest name is already
/// `u32::MAX`, since every further name would collide.
pub fn next_index(folder: &Path, extensions: &[String]) -> io::Result<u32> {
    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
        Err(e) => return Err(e),
    };

    let mut highest = 0u32;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(index) = parse_index(&entry.path(), extensions) {
            highest = highest.max(index);
        }
    }

    highest.checked_add(1).ok_or_else(|| exhausted(folder))
}

fn exhausted(folder: &Path) -> io::Error {
    io::Error::other(format!(
        "no output index left after {} in {}",
        u32::MAX,
        folder.display()
    ))
}

/// Hands out consecutive output paths for one commit.
#[derive(Debug)]
pub struct OutputNamer {
    folder: PathBuf,
    extension: String,
    next: u32,
}

impl OutputNamer {
    /// Create `folder` if needed and scan it for the starting index.
    ///
    /// Names with `extension` always count towards the index, even when it is
    /// not among `known_extensions`.
    pub fn open(folder: PathBuf, extension: &str, known_extensions: &[String]) -> io::Result<Self> {
        std::fs::create_dir_all(&folder)?;

        let mut counted = known_extensions.to_vec();
        if !counted.iter().any(|known| known.eq_ignore_ascii_case(extension)) {
            counted.push(extension.to_string());
        }
        let next = next_index(&folder, &counted)?;
        Ok(Self {
            folder,
            extension: extension.to_string(),
            next,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Index the next `reserve` call will use, 0 once exhausted.
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Path for the next crop; advances the counter.
    ///
    /// Fails instead of reusing a name once the index space is used up.
    pub fn reserve(&mut self) -> io::Result<PathBuf> {
        if self.next == 0 {
            return Err(exhausted(&self.folder));
        }
        let path = self
            .folder
            .join(format!("{}.{}", self.next, self.extension));
        // Wraps to 0 after u32::MAX, which marks the namer as exhausted
        self.next = self.next.wrapping_add(1);
        Ok(path)
    }
}
