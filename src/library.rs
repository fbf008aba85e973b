//! Track groups and the flat playlist built from them.
//!
//! Groups own the tracks. The flat playlist is the concatenation of every
//! group's tracks in order and is recomputed after each mutation; the
//! current index is cleared whenever it falls outside it.

mod model;
mod playlist_file;
mod scan;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::format::FormatTable;
use crate::metadata::MetadataProvider;

pub use model::{Group, Track};

#[derive(Debug, Default)]
pub struct Library {
    groups: Vec<Group>,
    playlist: Vec<Track>,
    current: Option<usize>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.playlist.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.playlist.get(i))
    }

    /// Make `index` current. Out of range leaves the selection alone.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.playlist.len() {
            return false;
        }
        self.current = Some(index);
        true
    }

    pub fn has_origin(&self, dir: &Path) -> bool {
        self.groups
            .iter()
            .any(|g| g.origin.as_deref() == Some(dir))
    }

    /// Append a group with the supported files directly inside `dir`.
    ///
    /// False when `dir` is missing, already added, or has nothing playable.
    pub fn add_folder(
        &mut self,
        dir: &Path,
        formats: &FormatTable,
        metadata: &dyn MetadataProvider,
    ) -> bool {
        match self.try_add_folder(dir, formats, metadata) {
            Ok(added) => added,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot add folder");
                false
            }
        }
    }

    fn try_add_folder(
        &mut self,
        dir: &Path,
        formats: &FormatTable,
        metadata: &dyn MetadataProvider,
    ) -> Result<bool> {
        let origin = dir
            .canonicalize()
            .map_err(|_| PlayerError::NotFound(dir.to_path_buf()))?;
        if self.has_origin(&origin) {
            debug!(dir = %origin.display(), "folder already in library");
            return Ok(false);
        }

        let files = scan::scan_folder(&origin, formats)?;
        if files.is_empty() {
            debug!(dir = %origin.display(), "no supported files");
            return Ok(false);
        }

        let tracks = files
            .into_iter()
            .map(|p| {
                let secs = metadata.probe_duration(&p);
                Track::new(p, secs)
            })
            .collect::<Vec<_>>();
        info!(dir = %origin.display(), tracks = tracks.len(), "folder added");
        self.groups.push(Group {
            name: scan::folder_name(&origin),
            origin: Some(origin),
            tracks,
        });
        self.rebuild();
        Ok(true)
    }

    /// Add existing, supported `paths` to the group called `name`, creating it
    /// if needed. Paths already in that group are skipped.
    pub fn add_files_group(
        &mut self,
        name: &str,
        paths: &[PathBuf],
        formats: &FormatTable,
        metadata: &dyn MetadataProvider,
    ) -> bool {
        let idx = match self
            .groups
            .iter()
            .position(|g| g.origin.is_none() && g.name == name)
        {
            Some(i) => i,
            None => {
                self.groups.push(Group {
                    name: name.to_string(),
                    origin: None,
                    tracks: Vec::new(),
                });
                self.groups.len() - 1
            }
        };

        let mut added = 0usize;
        for p in paths {
            if !p.is_file() || !formats.is_supported(p) {
                debug!(path = %p.display(), "skipping file");
                continue;
            }
            let Ok(abs) = std::path::absolute(p) else {
                continue;
            };
            if self.groups[idx].contains(&abs) {
                continue;
            }
            let secs = metadata.probe_duration(&abs);
            self.groups[idx].tracks.push(Track::new(abs, secs));
            added += 1;
        }

        if self.groups[idx].tracks.is_empty() {
            self.groups.remove(idx);
        }
        if added == 0 {
            return false;
        }
        self.rebuild();
        true
    }

    /// Import a playlist file as a new group named after the file.
    ///
    /// Entries that no longer exist (or cannot be played) are dropped; an
    /// import that ends up empty fails.
    pub fn load_playlist_file(
        &mut self,
        path: &Path,
        formats: &FormatTable,
        metadata: &dyn MetadataProvider,
    ) -> bool {
        match self.try_load_playlist_file(path, formats, metadata) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot load playlist");
                false
            }
        }
    }

    fn try_load_playlist_file(
        &mut self,
        path: &Path,
        formats: &FormatTable,
        metadata: &dyn MetadataProvider,
    ) -> Result<()> {
        let entries = playlist_file::read_entries(path)?;
        let total = entries.len();

        let mut tracks: Vec<Track> = Vec::new();
        for entry in entries {
            if !entry.is_file() || !formats.is_supported(&entry) {
                continue;
            }
            let abs = std::path::absolute(&entry)?;
            if tracks.iter().any(|t| t.path == abs) {
                continue;
            }
            let secs = metadata.probe_duration(&abs);
            tracks.push(Track::new(abs, secs));
        }
        if tracks.is_empty() {
            return Err(PlayerError::Playlist(format!(
                "no playable entries in {}",
                path.display()
            )));
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "playlist".to_string());
        info!(name = %name, kept = tracks.len(), total, "playlist loaded");
        self.groups.push(Group {
            name,
            origin: None,
            tracks,
        });
        self.rebuild();
        Ok(())
    }

    /// Write the flat playlist to `path`.
    pub fn save_playlist_file(&self, path: &Path) -> bool {
        match playlist_file::write_entries(path, self.playlist.iter().map(|t| t.path.as_path())) {
            Ok(()) => {
                info!(path = %path.display(), tracks = self.playlist.len(), "playlist saved");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot save playlist");
                false
            }
        }
    }

    /// Drop every group and the selection.
    pub fn reset(&mut self) {
        self.groups.clear();
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.playlist = self
            .groups
            .iter()
            .flat_map(|g| g.tracks.iter().cloned())
            .collect();
        if self.current.is_some_and(|i| i >= self.playlist.len()) {
            self.current = None;
        }
    }
}
