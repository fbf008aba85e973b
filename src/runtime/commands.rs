use std::path::PathBuf;

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    /// Play entry N (1-based), or resume/start the selection.
    Play(Option<usize>),
    Pause,
    Resume,
    Stop,
    Next,
    Prev,
    Seek(u64),
    Forward,
    Rewind,
    Volume(f32),
    Shuffle,
    Repeat,
    Add(PathBuf),
    Load(PathBuf),
    Save(PathBuf),
    /// URL, or the name of a favourite station.
    Radio(String),
    RadioStop,
    Fav { name: String, url: String },
    Unfav(String),
    Favs,
    Status,
    Meta,
    Config,
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list                 show the playlist
  play [N]             play entry N, or resume
  pause | resume | stop
  next | prev
  seek S | ff | rw     jump to S seconds, or step forward/back
  vol V                volume 0-100
  shuffle | repeat     toggle shuffle, cycle repeat mode
  add DIR              add a folder
  load FILE | save FILE
  radio URL|NAME       play a stream or a favourite
  radio-stop
  fav NAME URL | favs  save / list favourite stations
  unfav NAME           forget a favourite station
  status | meta | config
  reset | help | quit";

fn arg<'a>(rest: &'a str, what: &str) -> Result<&'a str, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        Err(format!("missing {what}"))
    } else {
        Ok(rest)
    }
}

impl Command {
    /// Parse a command line. Blank input is `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let cmd = match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "play" | "p" => {
                let rest = rest.trim();
                if rest.is_empty() {
                    Self::Play(None)
                } else {
                    let n: usize = rest.parse().map_err(|_| format!("bad track number: {rest}"))?;
                    if n == 0 {
                        return Err("track numbers start at 1".to_string());
                    }
                    Self::Play(Some(n))
                }
            }
            "pause" => Self::Pause,
            "resume" => Self::Resume,
            "stop" => Self::Stop,
            "next" | "n" => Self::Next,
            "prev" => Self::Prev,
            "seek" => {
                let s = arg(rest, "seconds")?;
                Self::Seek(s.parse().map_err(|_| format!("bad seconds: {s}"))?)
            }
            "ff" => Self::Forward,
            "rw" => Self::Rewind,
            "vol" | "volume" => {
                let v = arg(rest, "volume")?;
                let pct: f32 = v.parse().map_err(|_| format!("bad volume: {v}"))?;
                if !(0.0..=100.0).contains(&pct) {
                    return Err("volume is 0-100".to_string());
                }
                Self::Volume(pct / 100.0)
            }
            "shuffle" => Self::Shuffle,
            "repeat" => Self::Repeat,
            "add" => Self::Add(PathBuf::from(arg(rest, "directory")?)),
            "load" => Self::Load(PathBuf::from(arg(rest, "playlist file")?)),
            "save" => Self::Save(PathBuf::from(arg(rest, "playlist file")?)),
            "radio" => Self::Radio(arg(rest, "url or favourite")?.to_string()),
            "radio-stop" => Self::RadioStop,
            "fav" => {
                let rest = arg(rest, "name and url")?;
                // The url is the last word so names may contain spaces.
                let (name, url) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| "usage: fav NAME URL".to_string())?;
                Self::Fav {
                    name: name.trim().to_string(),
                    url: url.to_string(),
                }
            }
            "unfav" => Self::Unfav(arg(rest, "favourite name")?.to_string()),
            "favs" => Self::Favs,
            "status" | "st" => Self::Status,
            "meta" => Self::Meta,
            "config" => Self::Config,
            "reset" => Self::Reset,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(Some(cmd))
    }
}
