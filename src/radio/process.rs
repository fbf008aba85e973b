//! External decoder process for live streams.
//!
//! `DecoderProcess` owns the child for its whole life: dropping it always
//! asks the decoder to quit, waits a bounded time, then kills and reaps it.

use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::RadioSettings;
use crate::error::{PlayerError, Result};

const REAP_POLL: Duration = Duration::from_millis(20);

/// Decoder arguments: reconnecting input, raw interleaved s16le on stdout.
pub(crate) fn decoder_args(settings: &RadioSettings, url: &str) -> Vec<OsString> {
    let rate = settings.sample_rate.to_string();
    let channels = settings.channels.to_string();
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-reconnect",
        "1",
        "-reconnect_streamed",
        "1",
        "-reconnect_delay_max",
        "5",
        "-i",
        url,
        "-vn",
        "-f",
        "s16le",
        "-acodec",
        "pcm_s16le",
        "-ar",
        rate.as_str(),
        "-ac",
        channels.as_str(),
        "-",
    ]
    .into_iter()
    .map(OsString::from)
    .collect()
}

pub struct DecoderProcess {
    child: Child,
    stop_timeout: Duration,
    reaped: bool,
}

impl DecoderProcess {
    pub fn spawn(program: &Path, args: Vec<OsString>, stop_timeout: Duration) -> Result<Self> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PlayerError::Stream(format!("cannot start {}: {e}", program.display())))?;
        debug!(pid = child.id(), "decoder started");
        Ok(Self {
            child,
            stop_timeout,
            reaped: false,
        })
    }

    /// The PCM pipe. Available once.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn has_exited(&mut self) -> bool {
        if self.reaped {
            return true;
        }
        matches!(self.child.try_wait(), Ok(Some(_)))
    }

    /// Ask politely, wait up to `stop_timeout`, then kill. Errors are ignored.
    pub fn terminate(&mut self) {
        if self.reaped {
            return;
        }
        // ffmpeg-style decoders quit cleanly on `q`.
        if let Some(mut stdin) = self.child.stdin.take() {
            let _ = stdin.write_all(b"q");
            let _ = stdin.flush();
        }

        let deadline = Instant::now() + self.stop_timeout;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    debug!(%status, "decoder exited");
                    self.reaped = true;
                    return;
                }
                Ok(None) => thread::sleep(REAP_POLL),
                Err(_) => break,
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();
        self.reaped = true;
        debug!("decoder killed");
    }
}

impl Drop for DecoderProcess {
    fn drop(&mut self) {
        self.terminate();
    }
}
