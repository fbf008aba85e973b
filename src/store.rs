//! Small JSON state file: last opened folder and favourite radio stations.
//!
//! Every write re-reads the file and only touches its own keys, so values
//! written by other tools survive.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::config_home;
use crate::error::Result;

const LAST_FOLDER: &str = "last_folder";
const FAVOURITES: &str = "radio_favourites";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favourite {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

/// `RONDO_STATE_PATH`, else `<config home>/rondo/state.json`.
pub fn default_state_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("RONDO_STATE_PATH") {
        return Some(PathBuf::from(p));
    }
    config_home().map(|d| d.join("rondo").join("state.json"))
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open_default() -> Option<Self> {
        default_state_path().map(Self::new)
    }

    /// Current contents; a missing file is an empty object.
    fn read(&self) -> Result<Map<String, Value>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn update(&self, key: &str, value: Value) -> Result<()> {
        let mut map = self.read()?;
        map.insert(key.to_string(), value);
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&Value::Object(map))?)?;
        debug!(key, path = %self.path.display(), "state saved");
        Ok(())
    }

    pub fn last_folder(&self) -> Result<Option<PathBuf>> {
        let map = self.read()?;
        Ok(map
            .get(LAST_FOLDER)
            .and_then(Value::as_str)
            .map(PathBuf::from))
    }

    pub fn set_last_folder(&self, dir: &Path) -> Result<()> {
        self.update(LAST_FOLDER, Value::String(dir.display().to_string()))
    }

    pub fn favourites(&self) -> Result<Vec<Favourite>> {
        let map = self.read()?;
        match map.get(FAVOURITES) {
            Some(v) => Ok(serde_json::from_value(v.clone())?),
            None => Ok(Vec::new()),
        }
    }

    /// Add a station, replacing any with the same name.
    pub fn add_favourite(&self, name: &str, url: &str) -> Result<()> {
        let mut favs = self.favourites()?;
        let fav = Favourite {
            name: name.to_string(),
            url: url.to_string(),
        };
        match favs.iter_mut().find(|f| f.name == name) {
            Some(existing) => *existing = fav,
            None => favs.push(fav),
        }
        self.update(FAVOURITES, serde_json::to_value(favs)?)
    }

    pub fn remove_favourite(&self, name: &str) -> Result<bool> {
        let mut favs = self.favourites()?;
        let before = favs.len();
        favs.retain(|f| f.name != name);
        if favs.len() == before {
            return Ok(false);
        }
        self.update(FAVOURITES, serde_json::to_value(favs)?)?;
        Ok(true)
    }
}
