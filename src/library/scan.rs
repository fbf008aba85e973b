use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PlayerError, Result};
use crate::format::FormatTable;

/// Supported files directly inside `dir`, sorted by file name.
///
/// Subdirectories are not entered.
pub fn scan_folder(dir: &Path, formats: &FormatTable) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PlayerError::NotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| PlayerError::Io(e.into()))?;
        let path = entry.path();
        if entry.file_type().is_file() && formats.is_supported(path) {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Name shown for a folder group.
pub fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
