//! A running radio stream: decoder process, feeder thread, output channel.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::audio::Volume;
use crate::config::RadioSettings;
use crate::error::{PlayerError, Result};

use super::channel::StreamChannel;
use super::feeder::{FeedStats, FeederConfig, run_feeder};
use super::process::{DecoderProcess, decoder_args};

pub struct RadioSession {
    url: String,
    process: DecoderProcess,
    running: Arc<AtomicBool>,
    feeder: Option<JoinHandle<FeedStats>>,
    channel: Arc<dyn StreamChannel>,
}

impl RadioSession {
    /// Spawn the decoder for `url` and start feeding `channel`.
    ///
    /// A decoder that dies within the startup grace period is a transport
    /// failure; the process is reaped before returning.
    pub fn start<C: StreamChannel + 'static>(
        url: &str,
        settings: &RadioSettings,
        channel: C,
        volume: Volume,
    ) -> Result<Self> {
        let mut process = DecoderProcess::spawn(
            Path::new(&settings.program),
            decoder_args(settings, url),
            Duration::from_millis(settings.stop_timeout_ms),
        )?;
        let stdout = process
            .take_stdout()
            .ok_or_else(|| PlayerError::Stream("decoder has no output pipe".to_string()))?;

        thread::sleep(Duration::from_millis(settings.startup_grace_ms));
        if process.has_exited() {
            return Err(PlayerError::Stream(format!("decoder exited immediately for {url}")));
        }

        let channel: Arc<dyn StreamChannel> = Arc::new(channel);
        let running = Arc::new(AtomicBool::new(true));
        let cfg = FeederConfig::from(settings);

        let feeder = {
            let channel = channel.clone();
            let running = running.clone();
            thread::Builder::new()
                .name("radio-feeder".to_string())
                .spawn(move || run_feeder(stdout, channel.as_ref(), &volume, &running, &cfg))?
        };

        info!(url, "stream started");
        Ok(Self {
            url: url.to_string(),
            process,
            running,
            feeder: Some(feeder),
            channel,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True while the feeder is still pulling audio.
    pub fn is_streaming(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.feeder.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Tear the stream down. Best effort; never fails.
    pub fn stop(mut self) -> Option<FeedStats> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<FeedStats> {
        let handle = self.feeder.take()?;
        // Flag first: the feeder leaves after its current read or poll.
        self.running.store(false, Ordering::Release);
        self.process.terminate();
        let stats = match handle.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                warn!("feeder thread panicked");
                None
            }
        };
        self.channel.halt();
        debug!(url = %self.url, ?stats, "stream stopped");
        stats
    }
}

impl Drop for RadioSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
