use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub path: PathBuf,
    /// Cached duration in whole seconds; 0 when unknown.
    pub duration_secs: u64,
    pub display: String,
}

impl Track {
    pub fn new(path: PathBuf, duration_secs: u64) -> Self {
        let display = display_name(&path);
        Self {
            path,
            duration_secs,
            display,
        }
    }
}

/// File name shown in listings.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// A named run of tracks. Folder groups remember where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub origin: Option<PathBuf>,
    pub tracks: Vec<Track>,
}

impl Group {
    pub fn contains(&self, path: &Path) -> bool {
        self.tracks.iter().any(|t| t.path == path)
    }
}
