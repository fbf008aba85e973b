//! Application controller: the one object the runtime drives.
//!
//! `App` owns the library, the playback engine, shuffle/repeat state and the
//! optional radio session, and keeps local playback and radio mutually
//! exclusive.

mod model;

pub use model::*;
