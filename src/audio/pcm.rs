//! Raw interleaved PCM buffers shared by the transcoder and the radio feeder.

use std::time::Duration;

use rodio::buffer::SamplesBuffer;

/// Signed 16-bit interleaved PCM held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl PcmBuffer {
    /// Interpret `bytes` as s16le. A trailing odd byte is dropped.
    pub fn from_le_bytes(bytes: &[u8], channels: u16, sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        Self {
            channels,
            sample_rate,
            samples,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Scale every sample by `gain` (clamped to 0..=1).
    pub fn apply_gain(&mut self, gain: f32) {
        let gain = gain.clamp(0.0, 1.0);
        if gain >= 1.0 {
            return;
        }
        for s in &mut self.samples {
            *s = (*s as f32 * gain).round() as i16;
        }
    }

    /// Build a playable rodio source.
    pub fn into_source(self) -> SamplesBuffer {
        let data: Vec<f32> = self
            .samples
            .iter()
            .map(|&s| s as f32 / i16::MAX as f32)
            .collect();
        SamplesBuffer::new(self.channels, self.sample_rate, data)
    }
}
