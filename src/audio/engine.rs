//! Playback engine: one loaded source, a Stopped/Playing/Paused state machine
//! and a derived position.
//!
//! Every public operation reports success as a `bool`. Failures are logged
//! and leave the engine exactly as it was, so the caller can retry.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{PlayerError, Result};
use crate::format::FormatClass;
use crate::metadata::MetadataProvider;

use super::clock::PlaybackClock;
use super::output::AudioOutput;
use super::transcode::Transcoder;
use super::types::PlaybackStatus;

pub struct PlaybackEngine<O: AudioOutput> {
    output: O,
    transcoder: Transcoder,
    metadata: Arc<dyn MetadataProvider>,
    source: Option<PathBuf>,
    duration: Duration,
    clock: PlaybackClock,
    volume: f32,
}

impl<O: AudioOutput> PlaybackEngine<O> {
    pub fn new(output: O, transcoder: Transcoder, metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            output,
            transcoder,
            metadata,
            source: None,
            duration: Duration::ZERO,
            clock: PlaybackClock::default(),
            volume: 1.0,
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn status(&self) -> PlaybackStatus {
        self.clock.status()
    }

    pub fn is_playing(&self) -> bool {
        self.status() == PlaybackStatus::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.status() == PlaybackStatus::Paused
    }

    pub fn current_source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// File name of the loaded source, without its directory.
    pub fn current_filename(&self) -> Option<String> {
        self.source
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Probed duration; zero when unknown.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn position(&self) -> Duration {
        self.clock.position(Instant::now(), self.duration)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.output.set_volume(self.volume);
    }

    /// Playing and the mixer ran out of audio.
    pub fn is_finished(&self) -> bool {
        self.is_playing() && self.output.is_drained()
    }

    /// Make `path` the current source. Does not start playback.
    pub fn load(&mut self, path: &Path) -> bool {
        self.load_with_duration(path, 0)
    }

    /// Like `load`, trusting an already known duration in whole seconds.
    /// `0` means unknown and probes the file.
    pub fn load_with_duration(&mut self, path: &Path, known_secs: u64) -> bool {
        match self.try_load(path, known_secs) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "load failed");
                false
            }
        }
    }

    fn try_load(&mut self, path: &Path, known_secs: u64) -> Result<()> {
        if !path.is_file() {
            return Err(PlayerError::NotFound(path.to_path_buf()));
        }
        match self.transcoder.formats().classify(path) {
            FormatClass::Protected => return Err(PlayerError::Protected(path.to_path_buf())),
            FormatClass::Unsupported => return Err(PlayerError::Unsupported(path.to_path_buf())),
            FormatClass::Native | FormatClass::Transcoded => {}
        }

        let secs = match known_secs {
            0 => self.metadata.probe_duration(path),
            secs => secs,
        };
        self.output.stop();
        self.clock.stop();
        self.source = Some(path.to_path_buf());
        self.duration = Duration::from_secs(secs);
        debug!(path = %path.display(), secs, "loaded");
        Ok(())
    }

    /// Start from the beginning, or resume when paused.
    pub fn play(&mut self) -> bool {
        match self.try_play() {
            Ok(()) => true,
            Err(e) => {
                warn!(source = ?self.source, error = %e, "play failed");
                false
            }
        }
    }

    fn try_play(&mut self) -> Result<()> {
        let path = self.source.clone().ok_or(PlayerError::NothingLoaded)?;

        if self.clock.status() == PlaybackStatus::Paused {
            self.output.resume();
            self.clock.resume(Instant::now());
            return Ok(());
        }

        let source = self.transcoder.to_pcm(&path, Duration::ZERO)?;
        self.output.start(source, Duration::ZERO, false)?;
        self.clock.start_at(Duration::ZERO, Instant::now());
        info!(path = %path.display(), "playing");
        Ok(())
    }

    /// Playing -> Paused.
    pub fn pause(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.output.pause();
        self.clock.pause(Instant::now(), self.duration)
    }

    /// Back to Stopped; the source stays loaded.
    pub fn stop(&mut self) {
        self.output.stop();
        self.clock.stop();
    }

    /// Jump to `target`, clamped to the known duration.
    pub fn seek(&mut self, target: Duration) -> bool {
        match self.try_seek(target) {
            Ok(()) => true,
            Err(e) => {
                warn!(source = ?self.source, error = %e, "seek failed");
                false
            }
        }
    }

    fn try_seek(&mut self, target: Duration) -> Result<()> {
        if self.clock.status() == PlaybackStatus::Stopped {
            return Err(PlayerError::InvalidState("seek needs Playing or Paused"));
        }
        let path = self.source.clone().ok_or(PlayerError::NothingLoaded)?;
        let target = if self.duration.is_zero() {
            target
        } else {
            target.min(self.duration)
        };

        // Native sources get the offset at the mixer; transcoded ones are
        // decoded from the offset and played from their own start.
        let source = self.transcoder.to_pcm(&path, target)?;
        let paused = self.clock.status() == PlaybackStatus::Paused;
        self.output.start(source, target, paused)?;
        self.clock.seek(target, Instant::now());
        debug!(secs = target.as_secs_f64(), "seeked");
        Ok(())
    }

    /// Unload everything.
    pub fn reset(&mut self) {
        self.stop();
        self.source = None;
        self.duration = Duration::ZERO;
    }
}
