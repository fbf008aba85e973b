use serde::{Deserialize, Serialize};

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/rondo/config.toml` or `~/.config/rondo/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `RONDO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub formats: FormatSettings,
    pub transcode: TranscodeSettings,
    pub radio: RadioSettings,
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial volume for both the file channel and the stream channel.
    pub volume: f32,
    /// Seconds moved by the CLI `ff`/`rw` commands.
    pub seek_step_seconds: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 0.7,
            seek_step_seconds: 5,
        }
    }
}

/// Extension tables used by the format classifier (case-insensitive, no dot).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FormatSettings {
    /// Played straight from disk by the native mixer.
    pub native: Vec<String>,
    /// Decoded to PCM by the external transcoder before playback.
    pub transcoded: Vec<String>,
    /// DRM-wrapped containers; always rejected.
    pub protected: Vec<String>,
    /// Formats whose duration reader never falls back to a full decode.
    pub uncompressed: Vec<String>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            native: vec!["mp3".into(), "wav".into(), "ogg".into(), "flac".into()],
            transcoded: vec![
                "m4a".into(),
                "aac".into(),
                "wma".into(),
                "opus".into(),
                "aiff".into(),
                "aif".into(),
                "ape".into(),
            ],
            protected: vec!["m4p".into()],
            uncompressed: vec!["wav".into(), "aiff".into(), "aif".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscodeSettings {
    /// External decoder executable (ffmpeg-compatible arguments).
    pub program: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            sample_rate: 44_100,
            channels: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RadioSettings {
    /// External decoder executable (ffmpeg-compatible arguments).
    pub program: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// Seconds of audio per chunk submitted to the stream channel.
    pub chunk_seconds: u32,
    /// Bytes requested per pipe read.
    pub read_size: usize,
    /// Sleep between checks while the channel's slot is full.
    pub poll_ms: u64,
    /// Bounded wait for the decoder to exit after a graceful quit request.
    pub stop_timeout_ms: u64,
    /// How long the decoder must survive after spawn to count as started.
    pub startup_grace_ms: u64,
}

impl RadioSettings {
    /// Size in bytes of one chunk of s16 interleaved PCM.
    pub fn chunk_bytes(&self) -> usize {
        self.sample_rate as usize * self.channels as usize * 2 * self.chunk_seconds as usize
    }
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
            sample_rate: 44_100,
            channels: 2,
            chunk_seconds: 2,
            read_size: 4096,
            poll_ms: 50,
            stop_timeout_ms: 1000,
            startup_grace_ms: 150,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Default repeat mode.
    pub repeat: RepeatSetting,
}

#[derive(Debug, Copy, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatSetting {
    #[default]
    #[serde(alias = "no-repeat", alias = "none")]
    Off,
    #[serde(
        alias = "repeatall",
        alias = "repeat_all",
        alias = "all",
        alias = "loop-all"
    )]
    RepeatAll,
    #[serde(
        alias = "repeatone",
        alias = "repeat_one",
        alias = "one",
        alias = "loop-one"
    )]
    RepeatOne,
}
