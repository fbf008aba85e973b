//! Error types for the player engine.
//!
//! Everything below the public `App`/`Library`/`PlaybackEngine` boundary
//! propagates `PlayerError` with `?`. The boundary logs it and reports a
//! plain `bool`/`Option` to callers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    /// The file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Extension is not in the supported set.
    #[error("unsupported format: {0}")]
    Unsupported(PathBuf),

    /// DRM-wrapped container; never decoded.
    #[error("protected (DRM) container: {0}")]
    Protected(PathBuf),

    /// No track is loaded.
    #[error("nothing loaded")]
    NothingLoaded,

    /// Operation is not valid in the current playback state.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Native decoder rejected the payload.
    #[error("decode error: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),

    /// External decoder failed or produced no audio.
    #[error("transcode failed for {path}: {reason}")]
    Transcode { path: PathBuf, reason: String },

    /// Radio decoder could not be started or died immediately.
    #[error("stream error: {0}")]
    Stream(String),

    /// Audio output device problems.
    #[error("audio output error: {0}")]
    Output(String),

    /// Playlist file was unreadable or had no usable entries.
    #[error("playlist error: {0}")]
    Playlist(String),

    #[error("metadata error: {0}")]
    Metadata(#[from] lofty::error::LoftyError),

    #[error("state store error: {0}")]
    Store(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
