//! `rodio`-backed output: one sink for local files on the default device.
//!
//! The helper here encapsulates opening/decoding a source and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::mixer::Mixer;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::debug;

use crate::error::{PlayerError, Result};
use crate::radio::RodioChannel;

use super::output::AudioOutput;
use super::transcode::PcmSource;

/// Create a paused `Sink` for `source` that starts playback at `start_at`.
fn create_sink_at(mixer: &Mixer, source: PcmSource, start_at: Duration) -> Result<Sink> {
    let sink = Sink::connect_new(mixer);
    match source {
        PcmSource::File(path) => {
            let file = File::open(&path)?;
            // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
            let decoded = Decoder::new(BufReader::new(file))?.skip_duration(start_at);
            sink.append(decoded);
        }
        PcmSource::Pcm(pcm) => sink.append(pcm.into_source()),
    }
    sink.pause();
    Ok(sink)
}

pub struct RodioOutput {
    stream: OutputStream,
    sink: Option<Sink>,
    volume: f32,
}

impl RodioOutput {
    /// Open the system default output device.
    pub fn open_default() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped; noisy for a CLI.
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            sink: None,
            volume: 1.0,
        })
    }
}

impl AudioOutput for RodioOutput {
    type Channel = RodioChannel;

    fn start(&mut self, source: PcmSource, start_at: Duration, paused: bool) -> Result<()> {
        let new_sink = create_sink_at(self.stream.mixer(), source, start_at)?;
        new_sink.set_volume(self.volume);
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        if !paused {
            new_sink.play();
        }
        self.sink = Some(new_sink);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
    }

    fn resume(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.play();
        }
    }

    fn stop(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
    }

    fn is_drained(&self) -> bool {
        self.sink.as_ref().is_none_or(|s| s.empty())
    }

    fn open_channel(&self) -> Result<RodioChannel> {
        debug!("opening stream channel");
        Ok(RodioChannel::new(Sink::connect_new(self.stream.mixer())))
    }
}
