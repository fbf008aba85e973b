//! rondo: a local-file and internet-radio audio player engine.
//!
//! Local files play through a rodio mixer, natively or after an external
//! transcode to PCM. Radio streams are decoded by an external process and fed
//! to a second channel on the same mixer in fixed-size chunks.

pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod format;
pub mod library;
pub mod metadata;
pub mod radio;
pub mod runtime;
pub mod store;

#[cfg(test)]
mod test_support;

pub use error::{PlayerError, Result};
