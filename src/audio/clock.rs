//! Wall-clock position model.
//!
//! The mixer offers no trustworthy position query, so elapsed time is always
//! `now - play_start`. Pausing records the position and the moment of the
//! pause; resuming shifts `play_start` forward by exactly the paused interval.
//! Every method takes `now` so the model can be driven without real time.

use std::time::{Duration, Instant};

use super::types::PlaybackStatus;

#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    status: PlaybackStatus,
    play_start: Option<Instant>,
    pause_position: Duration,
    pause_start: Option<Instant>,
}

impl PlaybackClock {
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Enter Playing with `pos` already elapsed.
    pub fn start_at(&mut self, pos: Duration, now: Instant) {
        self.play_start = Some(now.checked_sub(pos).unwrap_or(now));
        self.pause_position = Duration::ZERO;
        self.pause_start = None;
        self.status = PlaybackStatus::Playing;
    }

    /// Playing -> Paused. Returns false in any other state.
    pub fn pause(&mut self, now: Instant, duration: Duration) -> bool {
        if self.status != PlaybackStatus::Playing {
            return false;
        }
        self.pause_position = self.position(now, duration);
        self.pause_start = Some(now);
        self.status = PlaybackStatus::Paused;
        true
    }

    /// Paused -> Playing without touching the position.
    pub fn resume(&mut self, now: Instant) -> bool {
        if self.status != PlaybackStatus::Paused {
            return false;
        }
        let paused_for = self
            .pause_start
            .map_or(Duration::ZERO, |p| now.saturating_duration_since(p));
        self.play_start = self.play_start.map(|s| s + paused_for);
        self.pause_start = None;
        self.status = PlaybackStatus::Playing;
        true
    }

    pub fn stop(&mut self) {
        self.play_start = None;
        self.pause_position = Duration::ZERO;
        self.pause_start = None;
        self.status = PlaybackStatus::Stopped;
    }

    /// Jump to `pos`, staying Paused if we were Paused.
    pub fn seek(&mut self, pos: Duration, now: Instant) {
        let was_paused = self.status == PlaybackStatus::Paused;
        self.start_at(pos, now);
        if was_paused {
            self.pause_position = pos;
            self.pause_start = Some(now);
            self.status = PlaybackStatus::Paused;
        }
    }

    /// Elapsed playback time. `duration` of zero means unknown and disables
    /// the upper clamp.
    pub fn position(&self, now: Instant, duration: Duration) -> Duration {
        match self.status {
            PlaybackStatus::Stopped => Duration::ZERO,
            PlaybackStatus::Paused => self.pause_position,
            PlaybackStatus::Playing => {
                let elapsed = self
                    .play_start
                    .map_or(Duration::ZERO, |s| now.saturating_duration_since(s));
                if duration.is_zero() {
                    elapsed
                } else {
                    elapsed.min(duration)
                }
            }
        }
    }
}
