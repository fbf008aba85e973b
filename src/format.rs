//! Format classification and duration probing.
//!
//! Extensions decide how a file is played (natively, through the transcoder,
//! or not at all) and how its duration is read.

use std::path::Path;

use lofty::prelude::*;
use tracing::debug;

use crate::audio::Transcoder;
use crate::config::FormatSettings;

/// How the player treats a file, decided purely by its extension.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormatClass {
    /// The native mixer decodes it straight from disk.
    Native,
    /// Decoded to PCM by the external transcoder first.
    Transcoded,
    /// DRM-wrapped; rejected without decoding.
    Protected,
    Unsupported,
}

impl FormatClass {
    pub fn is_playable(self) -> bool {
        matches!(self, Self::Native | Self::Transcoded)
    }
}

/// Lowercased extension without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn normalize(exts: &[String]) -> Vec<String> {
    exts.iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Extension lookup tables built once from `FormatSettings`.
#[derive(Debug, Clone)]
pub struct FormatTable {
    native: Vec<String>,
    transcoded: Vec<String>,
    protected: Vec<String>,
    uncompressed: Vec<String>,
}

impl Default for FormatTable {
    fn default() -> Self {
        Self::from_settings(&FormatSettings::default())
    }
}

impl FormatTable {
    pub fn from_settings(settings: &FormatSettings) -> Self {
        Self {
            native: normalize(&settings.native),
            transcoded: normalize(&settings.transcoded),
            protected: normalize(&settings.protected),
            uncompressed: normalize(&settings.uncompressed),
        }
    }

    pub fn classify(&self, path: &Path) -> FormatClass {
        let Some(ext) = extension_of(path) else {
            return FormatClass::Unsupported;
        };
        // Protected wins so a misconfigured table can never decode DRM files.
        if self.protected.contains(&ext) {
            FormatClass::Protected
        } else if self.native.contains(&ext) {
            FormatClass::Native
        } else if self.transcoded.contains(&ext) {
            FormatClass::Transcoded
        } else {
            FormatClass::Unsupported
        }
    }

    /// Whether `path` belongs to the supported (native or transcoded) set.
    pub fn is_supported(&self, path: &Path) -> bool {
        self.classify(path).is_playable()
    }

    pub fn is_compressed(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| !self.uncompressed.contains(&ext))
    }
}

/// Read the structured duration with lofty, whole seconds.
fn read_tagged_duration(path: &Path) -> Option<u64> {
    let tagged = lofty::read_from_path(path).ok()?;
    let secs = tagged.properties().duration().as_secs_f64().round() as u64;
    Some(secs)
}

/// Duration in whole seconds; `0` means unknown or failed.
///
/// Compressed formats whose metadata cannot be read are fully decoded through
/// the transcoder and measured.
pub fn probe_duration(table: &FormatTable, transcoder: &Transcoder, path: &Path) -> u64 {
    let class = table.classify(path);
    if !class.is_playable() {
        debug!(path = %path.display(), ?class, "not probing duration");
        return 0;
    }
    if !path.is_file() {
        return 0;
    }

    match read_tagged_duration(path) {
        Some(secs) if secs > 0 => secs,
        _ if table.is_compressed(path) => match transcoder.measure(path) {
            Ok(d) => d.as_secs_f64().round() as u64,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "duration fallback failed");
                0
            }
        },
        other => other.unwrap_or(0),
    }
}
