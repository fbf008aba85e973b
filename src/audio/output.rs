//! The native mixer seam.
//!
//! The engine only needs "load one source and play it from an offset" plus
//! pause/resume/stop. Keeping that behind a trait lets the state machine run
//! in tests without an audio device.

use std::time::Duration;

use crate::error::Result;
use crate::radio::StreamChannel;

use super::transcode::PcmSource;

pub trait AudioOutput {
    /// Dedicated channel handed to the radio feeder thread.
    type Channel: StreamChannel + 'static;

    /// Replace whatever is playing with `source`, playing from `start_at`.
    ///
    /// `start_at` applies to file sources only; PCM sources were already
    /// decoded from the right offset. With `paused` the new source is queued
    /// but silent until `resume`. On error the previous source keeps playing.
    fn start(&mut self, source: PcmSource, start_at: Duration, paused: bool) -> Result<()>;

    fn pause(&mut self);

    fn resume(&mut self);

    fn stop(&mut self);

    fn set_volume(&mut self, volume: f32);

    /// True when nothing is left to play.
    fn is_drained(&self) -> bool;

    /// Open a second channel on the same mixer for live streams.
    fn open_channel(&self) -> Result<Self::Channel>;
}
