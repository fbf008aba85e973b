//! The stream channel: a playback queue that holds at most one buffer
//! besides the one playing.

use rodio::Sink;

use crate::audio::PcmBuffer;

pub trait StreamChannel: Send + Sync {
    /// Play `chunk` now if idle, otherwise queue it in the single free slot.
    /// When the slot is taken the chunk is handed back untouched.
    fn try_submit(&self, chunk: PcmBuffer) -> Result<(), PcmBuffer>;

    /// Drop everything queued and go silent.
    fn halt(&self);
}

/// Stream channel backed by its own sink on the shared mixer.
pub struct RodioChannel {
    sink: Sink,
}

impl RodioChannel {
    pub fn new(sink: Sink) -> Self {
        Self { sink }
    }
}

impl StreamChannel for RodioChannel {
    fn try_submit(&self, chunk: PcmBuffer) -> Result<(), PcmBuffer> {
        // len() counts the playing source too: 0 idle, 1 playing, 2 full.
        if self.sink.len() > 1 {
            return Err(chunk);
        }
        self.sink.append(chunk.into_source());
        self.sink.play();
        Ok(())
    }

    fn halt(&self) {
        self.sink.stop();
    }
}
