//! Small audio types shared between the engine, the app and the radio feeder.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::RepeatSetting;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RepeatMode {
    /// Stop at the end of the playlist (or shuffle pass).
    #[default]
    Off,
    /// Wrap to the start, reshuffling when shuffle is on.
    RepeatAll,
    /// Replay the current track forever.
    RepeatOne,
}

impl RepeatMode {
    /// `Off -> RepeatAll -> RepeatOne -> Off`.
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::RepeatAll,
            Self::RepeatAll => Self::RepeatOne,
            Self::RepeatOne => Self::Off,
        }
    }
}

impl From<RepeatSetting> for RepeatMode {
    fn from(s: RepeatSetting) -> Self {
        match s {
            RepeatSetting::Off => Self::Off,
            RepeatSetting::RepeatAll => Self::RepeatAll,
            RepeatSetting::RepeatOne => Self::RepeatOne,
        }
    }
}

/// The playback state of the engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Volume shared between the control thread and the radio feeder.
///
/// Stored as `f32` bits so reads never lock.
#[derive(Debug, Clone)]
pub struct Volume(Arc<AtomicU32>);

impl Volume {
    pub fn new(v: f32) -> Self {
        Self(Arc::new(AtomicU32::new(v.clamp(0.0, 1.0).to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, v: f32) {
        self.0.store(v.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0)
    }
}
