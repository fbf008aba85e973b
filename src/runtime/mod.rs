use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::app::App;
use crate::audio::{RodioOutput, Transcoder};
use crate::metadata::LoftyMetadata;
use crate::store::Store;

mod commands;
mod event_loop;
mod settings;
mod startup;

pub use commands::Command;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();

    let output = RodioOutput::open_default()?;
    let metadata = Arc::new(LoftyMetadata::new(Transcoder::from_settings(&settings)));
    let mut app = App::new(output, &settings, metadata, Store::open_default());

    let arg = env::args_os().nth(1).map(PathBuf::from);
    let tracks = startup::open_initial_folder(&mut app, arg);
    println!("{tracks} tracks loaded; type `help` for commands");

    event_loop::run(&mut app, &settings)?;
    Ok(())
}
