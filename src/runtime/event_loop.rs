use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::app::{App, TickOutcome};
use crate::audio::{AudioOutput, PlaybackStatus, RepeatMode};
use crate::config::Settings;

use super::commands::{Command, HELP};

const TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Format a `Duration` as `MM:SS`.
pub fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn repeat_label(mode: RepeatMode) -> &'static str {
    match mode {
        RepeatMode::Off => "off",
        RepeatMode::RepeatAll => "all",
        RepeatMode::RepeatOne => "one",
    }
}

/// One-line summary of what is playing.
pub fn status_line<O: AudioOutput>(app: &App<O>) -> String {
    let mode = format!(
        "vol {:.0}%  shuffle {}  repeat {}",
        app.volume() * 100.0,
        if app.shuffle().is_enabled() { "on" } else { "off" },
        repeat_label(app.repeat()),
    );
    if let Some(url) = app.stream_url() {
        return format!("[radio] {url}  {mode}");
    }

    let engine = app.engine();
    let Some(name) = engine.current_filename() else {
        return format!("[stopped]  {mode}");
    };
    let state = match engine.status() {
        PlaybackStatus::Playing => "playing",
        PlaybackStatus::Paused => "paused",
        PlaybackStatus::Stopped => "stopped",
    };
    let total = if engine.duration().is_zero() {
        "--:--".to_string()
    } else {
        format_mmss(engine.duration())
    };
    format!(
        "[{state}] {name}  {} / {total}  {mode}",
        format_mmss(engine.position())
    )
}

fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (tx, rx) = mpsc::channel::<String>();
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Read commands from stdin until `quit` or EOF, polling `App::tick`
/// between lines.
pub fn run<O: AudioOutput>(app: &mut App<O>, settings: &Settings) -> io::Result<()> {
    let rx = spawn_stdin_reader()?;
    let mut out = io::stdout();
    writeln!(out, "{}", status_line(app))?;

    loop {
        match rx.recv_timeout(TICK) {
            Ok(line) => match Command::parse(&line) {
                Ok(Some(cmd)) => {
                    if handle_command(cmd, app, settings, &mut out)? == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(msg) => writeln!(out, "{msg}")?,
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("stdin closed");
                break;
            }
        }

        match app.tick() {
            TickOutcome::Idle => {}
            TickOutcome::Advanced => writeln!(out, "{}", status_line(app))?,
            TickOutcome::Ended => writeln!(out, "end of playlist")?,
            TickOutcome::StreamEnded => writeln!(out, "stream ended")?,
        }
    }

    app.stop_stream();
    app.stop();
    Ok(())
}

fn report<W: Write>(out: &mut W, ok: bool, failure: &str) -> io::Result<()> {
    if !ok {
        writeln!(out, "{failure}")?;
    }
    Ok(())
}

pub fn handle_command<O: AudioOutput, W: Write>(
    cmd: Command,
    app: &mut App<O>,
    settings: &Settings,
    out: &mut W,
) -> io::Result<Flow> {
    let step = Duration::from_secs(settings.audio.seek_step_seconds);

    match cmd {
        Command::Quit => return Ok(Flow::Quit),
        Command::Help => writeln!(out, "{HELP}")?,
        Command::List => {
            let current = app.library().current_index();
            let mut i = 0usize;
            for group in app.library().groups() {
                writeln!(out, "== {}", group.name)?;
                for t in &group.tracks {
                    let marker = if Some(i) == current { '>' } else { ' ' };
                    let len = if t.duration_secs == 0 {
                        "--:--".to_string()
                    } else {
                        format_mmss(Duration::from_secs(t.duration_secs))
                    };
                    writeln!(out, "{marker}{:>4}. {}  {len}", i + 1, t.display)?;
                    i += 1;
                }
            }
        }
        Command::Play(Some(n)) => {
            let ok = app.play_track_at(n - 1);
            report(out, ok, "cannot play that track")?;
            if ok {
                writeln!(out, "{}", status_line(app))?;
            }
        }
        Command::Play(None) | Command::Resume => {
            let ok = app.play();
            report(out, ok, "nothing to play")?;
        }
        Command::Pause => report(out, app.pause(), "not playing")?,
        Command::Stop => app.stop(),
        Command::Next => {
            let ok = app.advance();
            report(out, ok, "end of playlist")?;
            if ok {
                writeln!(out, "{}", status_line(app))?;
            }
        }
        Command::Prev => {
            let ok = app.retreat();
            report(out, ok, "start of playlist")?;
            if ok {
                writeln!(out, "{}", status_line(app))?;
            }
        }
        Command::Seek(secs) => report(out, app.seek(Duration::from_secs(secs)), "cannot seek")?,
        Command::Forward => {
            let target = app.engine().position() + step;
            report(out, app.seek(target), "cannot seek")?;
        }
        Command::Rewind => {
            let target = app.engine().position().saturating_sub(step);
            report(out, app.seek(target), "cannot seek")?;
        }
        Command::Volume(v) => app.set_volume(v),
        Command::Shuffle => {
            let on = app.toggle_shuffle();
            writeln!(out, "shuffle {}", if on { "on" } else { "off" })?;
        }
        Command::Repeat => {
            let mode = app.cycle_repeat();
            writeln!(out, "repeat {}", repeat_label(mode))?;
        }
        Command::Add(dir) => {
            let ok = app.add_folder(&dir);
            report(out, ok, "folder not added")?;
            if ok {
                writeln!(out, "{} tracks", app.library().len())?;
            }
        }
        Command::Load(path) => {
            let ok = app.load_playlist_file(&path);
            report(out, ok, "playlist not loaded")?;
            if ok {
                writeln!(out, "{} tracks", app.library().len())?;
            }
        }
        Command::Save(path) => report(out, app.save_playlist_file(&path), "playlist not saved")?,
        Command::Radio(target) => {
            let ok = if target.contains("://") {
                app.play_stream(&target)
            } else {
                app.play_favourite(&target)
            };
            report(out, ok, "cannot start stream")?;
            if ok {
                writeln!(out, "{}", status_line(app))?;
            }
        }
        Command::RadioStop => app.stop_stream(),
        Command::Fav { name, url } => {
            report(out, app.add_favourite(&name, &url), "favourite not saved")?
        }
        Command::Unfav(name) => report(out, app.remove_favourite(&name), "no such favourite")?,
        Command::Favs => {
            for fav in app.favourites() {
                writeln!(out, "{}  {}", fav.name, fav.url)?;
            }
        }
        Command::Status => writeln!(out, "{}", status_line(app))?,
        Command::Meta => match app.current_metadata() {
            Some(m) => writeln!(
                out,
                "artist: {}\nalbum:  {}\nyear:   {}\ngenre:  {}",
                m.artist, m.album, m.year, m.genre
            )?,
            None => writeln!(out, "no track selected")?,
        },
        Command::Config => match toml::to_string_pretty(settings) {
            Ok(text) => write!(out, "{text}")?,
            Err(e) => writeln!(out, "cannot render config: {e}")?,
        },
        Command::Reset => {
            app.reset();
            writeln!(out, "library cleared")?;
        }
    }
    Ok(Flow::Continue)
}
