//! Transcoding bridge: turns formats the native mixer cannot play into
//! in-memory PCM by running an external decoder to completion.
//!
//! There is no incremental path. A seek on a transcoded file decodes again
//! from the seek point to the end.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::debug;

use crate::config::Settings;
use crate::error::{PlayerError, Result};
use crate::format::{FormatClass, FormatTable};

use super::pcm::PcmBuffer;

/// What the output should play for a given file.
#[derive(Debug)]
pub enum PcmSource {
    /// Natively decodable; read straight from disk.
    File(PathBuf),
    /// Fully decoded audio, starting at the requested offset.
    Pcm(PcmBuffer),
}

#[derive(Debug, Clone)]
pub struct Transcoder {
    formats: FormatTable,
    program: PathBuf,
    sample_rate: u32,
    channels: u16,
}

impl Transcoder {
    pub fn new(
        formats: FormatTable,
        program: impl Into<PathBuf>,
        sample_rate: u32,
        channels: u16,
    ) -> Self {
        Self {
            formats,
            program: program.into(),
            sample_rate,
            channels,
        }
    }

    /// Transcoder for the configured format tables and decoder program.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            FormatTable::from_settings(&settings.formats),
            &settings.transcode.program,
            settings.transcode.sample_rate,
            settings.transcode.channels,
        )
    }

    pub fn formats(&self) -> &FormatTable {
        &self.formats
    }

    /// Decoder arguments: read `path` from `from`, write raw s16le to stdout.
    pub(crate) fn args(&self, path: &Path, from: Duration) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-nostdin".into(),
        ];
        if !from.is_zero() {
            args.push("-ss".into());
            args.push(format!("{:.3}", from.as_secs_f64()).into());
        }
        args.push("-i".into());
        args.push(path.as_os_str().to_owned());
        let rate = self.sample_rate.to_string();
        let channels = self.channels.to_string();
        args.extend(
            [
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
            .map(OsString::from),
        );
        args
    }

    /// Decode the whole file (from `from` onwards) into memory.
    ///
    /// An offset at or past the real end yields an empty buffer, which plays
    /// as an already drained source.
    pub fn decode(&self, path: &Path, from: Duration) -> Result<PcmBuffer> {
        let fail = |reason: String| PlayerError::Transcode {
            path: path.to_path_buf(),
            reason,
        };

        debug!(path = %path.display(), from = from.as_secs_f64(), "transcoding");
        let output = Command::new(&self.program)
            .args(self.args(path, from))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| fail(format!("cannot run {}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("{} ({})", stderr.trim(), output.status)));
        }

        let pcm = PcmBuffer::from_le_bytes(&output.stdout, self.channels, self.sample_rate);
        if pcm.is_empty() && from.is_zero() {
            return Err(fail("decoder produced no audio".to_string()));
        }
        Ok(pcm)
    }

    /// Resolve `path` into something the output can play, starting at `from`.
    ///
    /// Native files pass through untouched; the caller seeks within them.
    pub fn to_pcm(&self, path: &Path, from: Duration) -> Result<PcmSource> {
        if !path.is_file() {
            return Err(PlayerError::NotFound(path.to_path_buf()));
        }
        match self.formats.classify(path) {
            FormatClass::Native => Ok(PcmSource::File(path.to_path_buf())),
            FormatClass::Transcoded => self.decode(path, from).map(PcmSource::Pcm),
            FormatClass::Protected => Err(PlayerError::Protected(path.to_path_buf())),
            FormatClass::Unsupported => Err(PlayerError::Unsupported(path.to_path_buf())),
        }
    }

    /// Decode everything and report how long it lasts.
    pub fn measure(&self, path: &Path) -> Result<Duration> {
        self.decode(path, Duration::ZERO).map(|pcm| pcm.duration())
    }
}
