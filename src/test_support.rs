//! Fixtures shared by unit tests: tiny WAV files and hardware-free fakes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audio::{AudioOutput, PcmBuffer, PcmSource};
use crate::error::{PlayerError, Result};
use crate::metadata::{MetadataProvider, TrackMetadata};
use crate::radio::StreamChannel;

/// Write `secs` seconds of 8 kHz mono 16-bit silence.
pub fn write_wav(path: &Path, secs: u32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..spec.sample_rate * secs {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

/// Stand-in for the external decoder: a shell script that emits `total_secs`
/// of silent 1 kHz mono s16le, minus whatever `-ss` skips (whole seconds).
#[cfg(unix)]
pub fn write_fake_decoder(dir: &Path, total_secs: u32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        r#"#!/bin/sh
from=0
prev=
for a in "$@"; do
  if [ "$prev" = "-ss" ]; then from=${{a%%.*}}; fi
  prev=$a
done
left=$(({total_secs} - from))
if [ "$left" -gt 0 ]; then head -c $((left * 2000)) /dev/zero; fi
"#
    );
    let p = dir.join("fake-decoder");
    std::fs::write(&p, script).unwrap();
    std::fs::set_permissions(&p, std::fs::Permissions::from_mode(0o755)).unwrap();
    p
}

/// Create an (empty) file and return its path.
pub fn touch(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, b"").unwrap();
    p
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    StartFile { at: Duration, paused: bool },
    StartPcm { frames: usize, paused: bool },
    Pause,
    Resume,
    Stop,
    Volume(f32),
}

/// Records what the engine asked the mixer to do.
#[derive(Default)]
pub struct FakeOutput {
    pub events: Vec<OutputEvent>,
    pub drained: Arc<AtomicBool>,
    pub channels: Arc<Mutex<Vec<FakeChannel>>>,
    /// Free slots of each opened channel; 0 keeps it permanently full.
    pub channel_slots: usize,
}

impl FakeOutput {
    pub fn starts(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, OutputEvent::StartFile { .. } | OutputEvent::StartPcm { .. }))
            .count()
    }
}

impl AudioOutput for FakeOutput {
    type Channel = FakeChannel;

    fn start(&mut self, source: PcmSource, start_at: Duration, paused: bool) -> Result<()> {
        let event = match source {
            PcmSource::File(_) => OutputEvent::StartFile {
                at: start_at,
                paused,
            },
            PcmSource::Pcm(pcm) => OutputEvent::StartPcm {
                frames: pcm.frames(),
                paused,
            },
        };
        self.events.push(event);
        self.drained.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&mut self) {
        self.events.push(OutputEvent::Pause);
    }

    fn resume(&mut self) {
        self.events.push(OutputEvent::Resume);
    }

    fn stop(&mut self) {
        self.events.push(OutputEvent::Stop);
    }

    fn set_volume(&mut self, volume: f32) {
        self.events.push(OutputEvent::Volume(volume));
    }

    fn is_drained(&self) -> bool {
        self.drained.load(Ordering::SeqCst)
    }

    fn open_channel(&self) -> Result<FakeChannel> {
        let ch = FakeChannel::with_slots(self.channel_slots);
        self.channels
            .lock()
            .map_err(|_| PlayerError::Output("poisoned".into()))?
            .push(ch.clone());
        Ok(ch)
    }
}

/// Stream channel with a fixed number of free slots that never drain on
/// their own.
#[derive(Clone, Default)]
pub struct FakeChannel {
    pub slots: Arc<AtomicUsize>,
    pub received: Arc<Mutex<Vec<PcmBuffer>>>,
    pub halted: Arc<AtomicBool>,
}

impl FakeChannel {
    pub fn with_slots(n: usize) -> Self {
        Self {
            slots: Arc::new(AtomicUsize::new(n)),
            ..Self::default()
        }
    }

    pub fn unbounded() -> Self {
        Self::with_slots(usize::MAX)
    }

    pub fn received(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl StreamChannel for FakeChannel {
    fn try_submit(&self, chunk: PcmBuffer) -> std::result::Result<(), PcmBuffer> {
        let took = self
            .slots
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !took {
            return Err(chunk);
        }
        self.received.lock().unwrap().push(chunk);
        Ok(())
    }

    fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }
}

/// Durations by path; everything else reports `default_secs`.
pub struct StubMetadata {
    pub default_secs: u64,
    pub durations: HashMap<PathBuf, u64>,
    pub probes: AtomicUsize,
}

impl StubMetadata {
    pub fn new(default_secs: u64) -> Self {
        Self {
            default_secs,
            durations: HashMap::new(),
            probes: AtomicUsize::new(0),
        }
    }
}

impl MetadataProvider for StubMetadata {
    fn probe_duration(&self, path: &Path) -> u64 {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.durations
            .get(path)
            .copied()
            .unwrap_or(self.default_secs)
    }

    fn get_metadata(&self, _path: &Path) -> TrackMetadata {
        TrackMetadata::default()
    }

    fn get_album_art(&self, _path: &Path) -> Option<Vec<u8>> {
        None
    }

    fn embed_album_art(&self, _path: &Path, _image: &[u8], _mime: &str) -> bool {
        false
    }
}
