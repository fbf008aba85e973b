//! Local-file playback: engine, position clock, transcoding bridge, shuffle
//! order and the rodio output.

mod clock;
mod engine;
mod output;
mod pcm;
mod queue;
mod sink;
mod transcode;
mod types;

pub use clock::PlaybackClock;
pub use engine::PlaybackEngine;
pub use output::AudioOutput;
pub use pcm::PcmBuffer;
pub use queue::ShuffleState;
pub use sink::RodioOutput;
pub use transcode::{PcmSource, Transcoder};
pub use types::{PlaybackStatus, RepeatMode, Volume};

#[cfg(test)]
mod tests;
