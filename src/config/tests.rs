use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_rondo_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("RONDO_CONFIG_PATH", "/tmp/rondo-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/rondo-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("rondo")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("rondo")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_repeat_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
shuffle = true
repeat = "repeat_one"

[audio]
volume = 0.25
seek_step_seconds = 9

[formats]
native = ["wav"]
transcoded = ["m4a"]
protected = ["m4p"]

[transcode]
program = "/opt/ffmpeg/bin/ffmpeg"

[radio]
chunk_seconds = 1
read_size = 1024
poll_ms = 10
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("RONDO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("RONDO__AUDIO__VOLUME");

    let s = Settings::load().unwrap();
    assert!(s.playback.shuffle);
    assert!(matches!(s.playback.repeat, RepeatSetting::RepeatOne));
    assert_eq!(s.audio.volume, 0.25);
    assert_eq!(s.audio.seek_step_seconds, 9);
    assert_eq!(s.formats.native, vec!["wav".to_string()]);
    assert_eq!(s.formats.transcoded, vec!["m4a".to_string()]);
    assert_eq!(s.transcode.program, "/opt/ffmpeg/bin/ffmpeg");
    // untouched keys keep their defaults
    assert_eq!(s.transcode.sample_rate, 44_100);
    assert_eq!(s.radio.chunk_seconds, 1);
    assert_eq!(s.radio.read_size, 1024);
    assert_eq!(s.radio.poll_ms, 10);
    assert_eq!(s.radio.channels, 2);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[radio]
poll_ms = 50
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("RONDO_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("RONDO__RADIO__POLL_MS", "5");

    let s = Settings::load().unwrap();
    assert_eq!(s.radio.poll_ms, 5);
}

#[test]
fn validate_rejects_out_of_range_volume_and_empty_chunks() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.audio.volume = 1.5;
    assert!(s.validate().is_err());

    s.audio.volume = 0.5;
    s.radio.chunk_seconds = 0;
    assert!(s.validate().is_err());
}

#[test]
fn default_chunk_is_two_seconds_of_cd_audio() {
    let r = RadioSettings::default();
    assert_eq!(r.chunk_bytes(), 44_100 * 2 * 2 * 2);
}
