//! `App`: library + engine + shuffle/repeat + radio.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::audio::{AudioOutput, PlaybackEngine, RepeatMode, ShuffleState, Transcoder, Volume};
use crate::config::{RadioSettings, Settings};
use crate::format::FormatTable;
use crate::library::{Library, Track};
use crate::metadata::{MetadataProvider, TrackMetadata};
use crate::radio::RadioSession;
use crate::store::{Favourite, Store};

/// What a call to [`App::tick`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    /// The track ended and the next one started.
    Advanced,
    /// The track ended and there was nothing to advance to.
    Ended,
    /// The radio decoder closed its output.
    StreamEnded,
}

pub struct App<O: AudioOutput> {
    library: Library,
    engine: PlaybackEngine<O>,
    shuffle: ShuffleState,
    repeat: RepeatMode,
    radio: Option<RadioSession>,
    volume: Volume,
    metadata: Arc<dyn MetadataProvider>,
    formats: FormatTable,
    radio_settings: RadioSettings,
    store: Option<Store>,
    rng: StdRng,
}

impl<O: AudioOutput> App<O> {
    pub fn new(
        output: O,
        settings: &Settings,
        metadata: Arc<dyn MetadataProvider>,
        store: Option<Store>,
    ) -> Self {
        let transcoder = Transcoder::from_settings(settings);
        let formats = transcoder.formats().clone();
        let mut engine = PlaybackEngine::new(output, transcoder, metadata.clone());
        engine.set_volume(settings.audio.volume);

        let mut app = Self {
            library: Library::new(),
            engine,
            shuffle: ShuffleState::default(),
            repeat: settings.playback.repeat.into(),
            radio: None,
            volume: Volume::new(settings.audio.volume),
            metadata,
            formats,
            radio_settings: settings.radio.clone(),
            store,
            rng: StdRng::seed_from_u64(rand::random()),
        };
        if settings.playback.shuffle {
            app.enable_shuffle();
        }
        app
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn engine(&self) -> &PlaybackEngine<O> {
        &self.engine
    }

    pub fn shuffle(&self) -> &ShuffleState {
        &self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycled();
        self.repeat
    }

    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    /// Applies to both the file engine and a running stream.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume.set(volume);
        self.engine.set_volume(volume);
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.library.current_track()
    }

    /// Tags of the current track.
    pub fn current_metadata(&self) -> Option<TrackMetadata> {
        self.current_track()
            .map(|t| self.metadata.get_metadata(&t.path))
    }

    // ---- library ----

    pub fn add_folder(&mut self, dir: &Path) -> bool {
        if !self
            .library
            .add_folder(dir, &self.formats, self.metadata.as_ref())
        {
            return false;
        }
        self.library_changed();
        if let Some(store) = &self.store {
            let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
            if let Err(e) = store.set_last_folder(&dir) {
                warn!(error = %e, "cannot remember folder");
            }
        }
        true
    }

    pub fn add_files_group(&mut self, name: &str, paths: &[PathBuf]) -> bool {
        let added = self
            .library
            .add_files_group(name, paths, &self.formats, self.metadata.as_ref());
        if added {
            self.library_changed();
        }
        added
    }

    pub fn load_playlist_file(&mut self, path: &Path) -> bool {
        let loaded = self
            .library
            .load_playlist_file(path, &self.formats, self.metadata.as_ref());
        if loaded {
            self.library_changed();
        }
        loaded
    }

    pub fn save_playlist_file(&self, path: &Path) -> bool {
        self.library.save_playlist_file(path)
    }

    fn library_changed(&mut self) {
        self.shuffle.sync_len(self.library.len(), &mut self.rng);
    }

    /// Stop everything and forget the library.
    pub fn reset(&mut self) {
        self.stop_stream();
        self.engine.reset();
        self.library.reset();
        self.library_changed();
        info!("library reset");
    }

    // ---- transport ----

    /// Select `index` in the flat playlist, load it and play it.
    pub fn play_track_at(&mut self, index: usize) -> bool {
        if !self.library.select(index) {
            debug!(index, "no such track");
            return false;
        }
        self.start_current()
    }

    fn start_current(&mut self) -> bool {
        let Some((path, secs)) = self
            .library
            .current_track()
            .map(|t| (t.path.clone(), t.duration_secs))
        else {
            return false;
        };
        self.stop_stream();
        self.engine.load_with_duration(&path, secs) && self.engine.play()
    }

    /// Resume, restart the loaded track, or start the selection.
    pub fn play(&mut self) -> bool {
        if self.engine.current_source().is_some() {
            self.stop_stream();
            return self.engine.play();
        }
        match self.library.current_index() {
            Some(i) => self.play_track_at(i),
            None if self.shuffle.is_enabled() => self.advance(),
            None => self.play_track_at(0),
        }
    }

    pub fn pause(&mut self) -> bool {
        self.engine.pause()
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn seek(&mut self, target: std::time::Duration) -> bool {
        self.engine.seek(target)
    }

    /// Move to the next track according to repeat and shuffle.
    pub fn advance(&mut self) -> bool {
        match self.next_index() {
            Some(i) => self.play_track_at(i),
            None => {
                debug!("end of playlist");
                false
            }
        }
    }

    fn next_index(&mut self) -> Option<usize> {
        let len = self.library.len();
        if len == 0 {
            return None;
        }
        let current = self.library.current_index();

        if self.repeat == RepeatMode::RepeatOne && current.is_some() {
            return current;
        }

        if self.shuffle.is_enabled() {
            if let Some(i) = self.shuffle.advance() {
                return Some(i);
            }
            if self.repeat == RepeatMode::RepeatAll {
                self.shuffle.rebuild(len, &mut self.rng);
                return self.shuffle.advance();
            }
            return None;
        }

        match current {
            None => Some(0),
            Some(c) if c + 1 < len => Some(c + 1),
            Some(_) if self.repeat == RepeatMode::RepeatAll => Some(0),
            Some(_) => None,
        }
    }

    /// Move back: through the shuffle history, or to the previous index.
    pub fn retreat(&mut self) -> bool {
        let prev = if self.shuffle.is_enabled() {
            self.shuffle.retreat()
        } else {
            self.library.current_index().and_then(|c| c.checked_sub(1))
        };
        match prev {
            Some(i) => self.play_track_at(i),
            None => false,
        }
    }

    pub fn enable_shuffle(&mut self) {
        self.shuffle.enable(
            self.library.len(),
            self.library.current_index(),
            &mut self.rng,
        );
    }

    pub fn disable_shuffle(&mut self) {
        self.shuffle.disable();
    }

    /// Returns the new state.
    pub fn toggle_shuffle(&mut self) -> bool {
        if self.shuffle.is_enabled() {
            self.disable_shuffle();
        } else {
            self.enable_shuffle();
        }
        self.shuffle.is_enabled()
    }

    /// Poll hook for the runtime loop: auto-advance finished tracks and
    /// clean up streams whose decoder went away.
    pub fn tick(&mut self) -> TickOutcome {
        if self.radio.as_ref().is_some_and(|r| !r.is_streaming()) {
            info!("stream ended");
            self.stop_stream();
            return TickOutcome::StreamEnded;
        }
        if !self.engine.is_finished() {
            return TickOutcome::Idle;
        }
        if self.advance() {
            TickOutcome::Advanced
        } else {
            self.engine.stop();
            TickOutcome::Ended
        }
    }

    // ---- radio ----

    pub fn stream_url(&self) -> Option<&str> {
        self.radio.as_ref().map(|r| r.url())
    }

    pub fn is_streaming(&self) -> bool {
        self.radio.as_ref().is_some_and(RadioSession::is_streaming)
    }

    /// Stop local playback and any previous stream, then start `url`.
    pub fn play_stream(&mut self, url: &str) -> bool {
        self.stop_stream();
        self.engine.stop();

        let channel = match self.engine.output().open_channel() {
            Ok(ch) => ch,
            Err(e) => {
                warn!(error = %e, "cannot open stream channel");
                return false;
            }
        };
        match RadioSession::start(url, &self.radio_settings, channel, self.volume.clone()) {
            Ok(session) => {
                self.radio = Some(session);
                true
            }
            Err(e) => {
                warn!(url, error = %e, "cannot start stream");
                false
            }
        }
    }

    pub fn stop_stream(&mut self) {
        if let Some(session) = self.radio.take() {
            let stats = session.stop();
            debug!(?stats, "stream torn down");
        }
    }

    // ---- favourites ----

    pub fn favourites(&self) -> Vec<Favourite> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        store.favourites().unwrap_or_else(|e| {
            warn!(error = %e, "cannot read favourites");
            Vec::new()
        })
    }

    pub fn add_favourite(&self, name: &str, url: &str) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.add_favourite(name, url) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "cannot save favourite");
                false
            }
        }
    }

    /// Forget the favourite called `name`. False when there was none.
    pub fn remove_favourite(&self, name: &str) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.remove_favourite(name) {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "cannot remove favourite");
                false
            }
        }
    }

    /// Start the favourite called `name`.
    pub fn play_favourite(&mut self, name: &str) -> bool {
        let Some(fav) = self.favourites().into_iter().find(|f| f.name == name) else {
            return false;
        };
        self.play_stream(&fav.url)
    }

    pub fn last_folder(&self) -> Option<PathBuf> {
        self.store.as_ref()?.last_folder().ok().flatten()
    }
}
