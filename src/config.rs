//! Configuration loader and schema types.
//!
//! This module exposes the settings schema that drives the engine (formats,
//! transcoder, radio feeder, playback defaults) and helpers to load it.

mod load;
mod schema;

pub(crate) use load::config_home;
pub use load::{default_config_path, resolve_config_path};
pub use schema::*;

#[cfg(test)]
mod tests;
