//! Extended M3U playlist files.
//!
//! Lines starting with `#` are comments (the `#EXTM3U` header included) and
//! blank lines are skipped. Every other line is a path, taken verbatim apart
//! from its line terminator; relative paths are resolved against the
//! playlist's own directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PlayerError, Result};

const HEADER: &str = "#EXTM3U";

/// Entries of the playlist at `path`, in file order, existing or not.
pub fn read_entries(path: &Path) -> Result<Vec<PathBuf>> {
    let text = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(parse(&text, base))
}

pub(crate) fn parse(text: &str, base: &Path) -> Vec<PathBuf> {
    text.lines()
        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
        .map(|l| {
            let p = Path::new(l);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        })
        .collect()
}

/// Write the header followed by one absolute path per line.
///
/// Nothing is written unless every entry can be represented, so a failed
/// save leaves an existing playlist intact.
pub fn write_entries<'a>(path: &Path, entries: impl IntoIterator<Item = &'a Path>) -> Result<()> {
    let mut text = format!("{HEADER}\n");
    for entry in entries {
        let abs = std::path::absolute(entry)?;
        let line = abs
            .to_str()
            .filter(|l| !l.contains(['\n', '\r']))
            .ok_or_else(|| PlayerError::Playlist(format!("unwritable path {}", abs.display())))?;
        text.push_str(line);
        text.push('\n');
    }
    fs::write(path, text)?;
    Ok(())
}
