//! Feeder loop: decoder pipe -> fixed-size chunks -> stream channel.
//!
//! Reading stops while a chunk waits for the channel's slot, so the
//! accumulator never holds more than one chunk plus one read, and network
//! consumption follows playback. The running flag is checked between reads
//! and between slot polls.

use std::io::{ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::audio::{PcmBuffer, Volume};
use crate::config::RadioSettings;

use super::channel::StreamChannel;

#[derive(Debug, Clone)]
pub struct FeederConfig {
    /// Bytes per submitted chunk; a whole number of frames.
    pub chunk_bytes: usize,
    pub read_size: usize,
    pub poll: Duration,
    pub channels: u16,
    pub sample_rate: u32,
}

impl From<&RadioSettings> for FeederConfig {
    fn from(s: &RadioSettings) -> Self {
        Self {
            chunk_bytes: s.chunk_bytes(),
            read_size: s.read_size,
            poll: Duration::from_millis(s.poll_ms),
            channels: s.channels,
            sample_rate: s.sample_rate,
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FeedEnd {
    /// The decoder closed its output.
    #[default]
    EndOfStream,
    /// The running flag was cleared.
    Stopped,
    /// Reading the pipe failed.
    ReadError,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub chunks: usize,
    /// Largest accumulator size observed, in bytes.
    pub max_pending_bytes: usize,
    pub end: FeedEnd,
}

/// Block until `channel` takes `chunk` or the flag is cleared.
fn submit<C: StreamChannel + ?Sized>(
    channel: &C,
    mut chunk: PcmBuffer,
    running: &AtomicBool,
    poll: Duration,
) -> bool {
    loop {
        match channel.try_submit(chunk) {
            Ok(()) => return true,
            Err(back) => chunk = back,
        }
        if !running.load(Ordering::Acquire) {
            return false;
        }
        thread::sleep(poll);
    }
}

pub fn run_feeder<R: Read, C: StreamChannel + ?Sized>(
    mut reader: R,
    channel: &C,
    volume: &Volume,
    running: &AtomicBool,
    cfg: &FeederConfig,
) -> FeedStats {
    let mut stats = FeedStats::default();
    let mut pending: Vec<u8> = Vec::with_capacity(cfg.chunk_bytes + cfg.read_size);
    let mut buf = vec![0u8; cfg.read_size.max(1)];

    loop {
        if !running.load(Ordering::Acquire) {
            stats.end = FeedEnd::Stopped;
            break;
        }

        let n = match reader.read(&mut buf) {
            Ok(0) => {
                stats.end = FeedEnd::EndOfStream;
                break;
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "stream read failed");
                stats.end = FeedEnd::ReadError;
                break;
            }
        };
        pending.extend_from_slice(&buf[..n]);
        stats.max_pending_bytes = stats.max_pending_bytes.max(pending.len());

        while pending.len() >= cfg.chunk_bytes {
            let mut chunk =
                PcmBuffer::from_le_bytes(&pending[..cfg.chunk_bytes], cfg.channels, cfg.sample_rate);
            pending.drain(..cfg.chunk_bytes);
            chunk.apply_gain(volume.get());

            if !submit(channel, chunk, running, cfg.poll) {
                stats.end = FeedEnd::Stopped;
                debug!(chunks = stats.chunks, "feeder stopped while waiting for a slot");
                return stats;
            }
            stats.chunks += 1;
        }
    }

    debug!(chunks = stats.chunks, end = ?stats.end, "feeder finished");
    stats
}
