use std::path::PathBuf;

use tracing::info;

use crate::app::App;
use crate::audio::AudioOutput;

/// Folder to open at startup: the command-line argument, else the folder
/// remembered from the last session.
pub fn initial_folder<O: AudioOutput>(app: &App<O>, arg: Option<PathBuf>) -> Option<PathBuf> {
    arg.or_else(|| app.last_folder())
}

/// Add the startup folder, if any. Returns how many tracks are loaded.
pub fn open_initial_folder<O: AudioOutput>(app: &mut App<O>, arg: Option<PathBuf>) -> usize {
    if let Some(dir) = initial_folder(app, arg) {
        if app.add_folder(&dir) {
            info!(dir = %dir.display(), "opened folder");
        } else {
            println!("nothing playable in {}", dir.display());
        }
    }
    app.library().len()
}
