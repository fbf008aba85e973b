use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::tempdir;

use super::*;
use crate::format::FormatTable;
use crate::metadata::LoftyMetadata;
use crate::test_support::{FakeOutput, OutputEvent, StubMetadata, touch, write_wav};
#[cfg(unix)]
use crate::test_support::write_fake_decoder;

const TICK: Duration = Duration::from_millis(40);

fn transcoder() -> Transcoder {
    Transcoder::new(FormatTable::default(), "/nonexistent/decoder", 44_100, 2)
}

fn engine(secs: u64) -> PlaybackEngine<FakeOutput> {
    PlaybackEngine::new(
        FakeOutput::default(),
        transcoder(),
        Arc::new(StubMetadata::new(secs)),
    )
}

fn close_to(a: Duration, b: Duration) -> bool {
    a.abs_diff(b) <= TICK
}

#[test]
fn load_rejects_missing_unsupported_and_protected_files() {
    let dir = tempdir().unwrap();
    let txt = touch(dir.path(), "notes.txt");
    let drm = touch(dir.path(), "store.m4p");

    let mut e = engine(100);
    assert!(!e.load(&dir.path().join("missing.mp3")));
    assert!(!e.load(&txt));
    assert!(!e.load(&drm));
    assert_eq!(e.current_source(), None);
    assert_eq!(e.duration(), Duration::ZERO);
}

#[test]
fn load_sets_source_and_duration_without_playing() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(180);
    assert!(e.load(&song));
    assert_eq!(e.current_source(), Some(song.as_path()));
    assert_eq!(e.current_filename().as_deref(), Some("song.mp3"));
    assert_eq!(e.duration(), Duration::from_secs(180));
    assert_eq!(e.status(), PlaybackStatus::Stopped);
    assert_eq!(e.output().starts(), 0);
}

#[test]
fn real_wav_loads_with_positive_duration() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("tone.wav");
    write_wav(&p, 2);

    let t = transcoder();
    let mut e = PlaybackEngine::new(
        FakeOutput::default(),
        t.clone(),
        Arc::new(LoftyMetadata::new(t)),
    );
    assert!(e.load(&p));
    assert_eq!(e.duration(), Duration::from_secs(2));
}

#[test]
fn play_without_source_fails() {
    let mut e = engine(10);
    assert!(!e.play());
    assert_eq!(e.status(), PlaybackStatus::Stopped);
}

#[test]
fn play_starts_native_file_at_zero() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.flac");

    let mut e = engine(100);
    e.load(&song);
    assert!(e.play());
    assert!(e.is_playing());
    assert!(!e.is_paused());
    assert_eq!(
        e.output().events.last(),
        Some(&OutputEvent::StartFile {
            at: Duration::ZERO,
            paused: false
        })
    );
    assert!(close_to(e.position(), Duration::ZERO));
}

#[test]
fn position_is_monotonic_and_bounded_while_playing() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(1);
    e.load(&song);
    e.play();

    let mut last = Duration::ZERO;
    for _ in 0..6 {
        thread::sleep(Duration::from_millis(250));
        let p = e.position();
        assert!(p >= last);
        assert!(p <= e.duration());
        last = p;
    }
    // 1.5s of wall time against a 1s track
    assert_eq!(last, Duration::from_secs(1));
}

#[test]
fn pause_then_resume_continues_from_the_same_position() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(100);
    e.load(&song);
    e.play();
    thread::sleep(Duration::from_millis(120));

    assert!(e.pause());
    let at_pause = e.position();
    thread::sleep(Duration::from_millis(150));
    assert_eq!(e.position(), at_pause);

    assert!(e.play());
    assert!(e.is_playing());
    assert!(close_to(e.position(), at_pause));
    // resume must not reload the media
    assert_eq!(e.output().starts(), 1);
    assert_eq!(e.output().events.last(), Some(&OutputEvent::Resume));
}

#[test]
fn pause_only_from_playing() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(100);
    e.load(&song);
    assert!(!e.pause());
    e.play();
    assert!(e.pause());
    assert!(!e.pause());
}

#[test]
fn seek_moves_position_and_restarts_mixer_at_offset() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.ogg");

    let mut e = engine(100);
    e.load(&song);
    e.play();
    for s in [0u64, 37, 99, 100] {
        let target = Duration::from_secs(s);
        assert!(e.seek(target));
        assert!(close_to(e.position(), target), "seek to {s}");
        assert_eq!(
            e.output().events.last(),
            Some(&OutputEvent::StartFile {
                at: target,
                paused: false
            })
        );
    }
}

#[test]
fn seek_clamps_past_the_end() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(100);
    e.load(&song);
    e.play();
    assert!(e.seek(Duration::from_secs(5000)));
    assert_eq!(e.position(), Duration::from_secs(100));
}

#[test]
fn seek_while_paused_stays_paused() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(100);
    e.load(&song);
    e.play();
    e.pause();

    assert!(e.seek(Duration::from_secs(42)));
    assert!(e.is_paused());
    assert_eq!(e.position(), Duration::from_secs(42));
    // queued silent; no burst of audio before the pause lands
    assert_eq!(
        e.output().events.last(),
        Some(&OutputEvent::StartFile {
            at: Duration::from_secs(42),
            paused: true
        })
    );

    thread::sleep(Duration::from_millis(60));
    e.play();
    assert!(close_to(e.position(), Duration::from_secs(42)));
}

#[test]
fn seek_when_stopped_is_rejected() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(100);
    e.load(&song);
    assert!(!e.seek(Duration::from_secs(3)));
    assert_eq!(e.output().starts(), 0);
}

#[test]
fn transcode_failure_leaves_state_untouched() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.m4a");

    let mut e = engine(100);
    assert!(e.load(&song));
    assert!(!e.play());
    assert_eq!(e.status(), PlaybackStatus::Stopped);
    assert_eq!(e.current_source(), Some(song.as_path()));
    assert_eq!(e.output().starts(), 0);
}

#[test]
fn known_duration_skips_the_probe() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.wma");
    let meta = Arc::new(StubMetadata::new(100));
    let mut e = PlaybackEngine::new(FakeOutput::default(), transcoder(), meta.clone());

    assert!(e.load_with_duration(&song, 42));
    assert_eq!(e.duration(), Duration::from_secs(42));
    assert_eq!(meta.probes.load(Ordering::SeqCst), 0);

    assert!(e.load_with_duration(&song, 0));
    assert_eq!(e.duration(), Duration::from_secs(100));
    assert_eq!(meta.probes.load(Ordering::SeqCst), 1);
}

#[cfg(unix)]
fn scripted_engine(dir: &std::path::Path, reported_secs: u64) -> PlaybackEngine<FakeOutput> {
    // the decoder always has exactly ten seconds of audio
    let decoder = write_fake_decoder(dir, 10);
    PlaybackEngine::new(
        FakeOutput::default(),
        Transcoder::new(FormatTable::default(), decoder, 1000, 1),
        Arc::new(StubMetadata::new(reported_secs)),
    )
}

#[cfg(unix)]
#[test]
fn transcoded_track_plays_and_seeks_from_decoded_pcm() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.m4a");

    let mut e = scripted_engine(dir.path(), 10);
    assert!(e.load(&song));
    assert!(e.play());
    assert_eq!(
        e.output().events.last(),
        Some(&OutputEvent::StartPcm {
            frames: 10_000,
            paused: false
        })
    );

    // decoded again from the offset and played from the buffer's own start
    assert!(e.seek(Duration::from_secs(4)));
    assert!(close_to(e.position(), Duration::from_secs(4)));
    assert_eq!(
        e.output().events.last(),
        Some(&OutputEvent::StartPcm {
            frames: 6_000,
            paused: false
        })
    );

    e.pause();
    assert!(e.seek(Duration::from_secs(7)));
    assert!(e.is_paused());
    assert_eq!(e.position(), Duration::from_secs(7));
    assert_eq!(
        e.output().events.last(),
        Some(&OutputEvent::StartPcm {
            frames: 3_000,
            paused: true
        })
    );
}

#[cfg(unix)]
#[test]
fn seeking_a_transcoded_track_to_its_end_drains() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.m4a");

    // reported duration rounded up past the real audio
    let mut e = scripted_engine(dir.path(), 11);
    e.load(&song);
    e.play();

    for s in [10u64, 11] {
        assert!(e.seek(Duration::from_secs(s)), "seek to {s}");
        assert!(close_to(e.position(), Duration::from_secs(s)));
        assert_eq!(
            e.output().events.last(),
            Some(&OutputEvent::StartPcm {
                frames: 0,
                paused: false
            })
        );
    }
    assert!(e.is_playing());
}

#[test]
fn stop_resets_position_but_keeps_source() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(100);
    e.load(&song);
    e.play();
    e.seek(Duration::from_secs(20));
    e.stop();
    assert_eq!(e.status(), PlaybackStatus::Stopped);
    assert_eq!(e.position(), Duration::ZERO);
    assert_eq!(e.current_source(), Some(song.as_path()));

    e.reset();
    assert_eq!(e.current_source(), None);
}

#[test]
fn finished_only_when_playing_and_drained() {
    let dir = tempdir().unwrap();
    let song = touch(dir.path(), "song.mp3");

    let mut e = engine(100);
    e.load(&song);
    e.play();
    assert!(!e.is_finished());

    e.output().drained.store(true, Ordering::SeqCst);
    assert!(e.is_finished());
    e.pause();
    assert!(!e.is_finished());
}

#[test]
fn volume_is_clamped_and_forwarded() {
    let mut e = engine(1);
    e.set_volume(3.0);
    assert_eq!(e.volume(), 1.0);
    e.set_volume(0.25);
    assert_eq!(e.output().events.last(), Some(&OutputEvent::Volume(0.25)));
}

#[test]
fn shared_volume_clamps() {
    let v = Volume::new(0.5);
    let reader = v.clone();
    v.set(7.0);
    assert_eq!(reader.get(), 1.0);
    v.set(-1.0);
    assert_eq!(reader.get(), 0.0);
}

#[test]
fn repeat_mode_cycles_in_fixed_order() {
    let m = RepeatMode::Off;
    assert_eq!(m.cycled(), RepeatMode::RepeatAll);
    assert_eq!(m.cycled().cycled(), RepeatMode::RepeatOne);
    assert_eq!(m.cycled().cycled().cycled(), RepeatMode::Off);
}

#[test]
fn shuffle_excludes_current_and_starts_before_first_entry() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut s = ShuffleState::default();
    s.enable(6, Some(2), &mut rng);

    assert!(s.is_enabled());
    assert_eq!(s.cursor(), None);
    let mut sorted = s.order().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 3, 4, 5]);
}

#[test]
fn shuffle_first_advance_plays_first_generated_entry() {
    // The cursor starts before the order, so nothing generated is skipped.
    let mut rng = StdRng::seed_from_u64(3);
    let mut s = ShuffleState::default();
    s.enable(5, Some(0), &mut rng);
    let first = s.order()[0];
    assert_eq!(s.advance(), Some(first));
    assert_eq!(s.cursor(), Some(0));
}

#[test]
fn shuffle_advance_visits_each_entry_once_then_stops() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut s = ShuffleState::default();
    s.enable(4, Some(0), &mut rng);

    let mut seen: Vec<usize> = std::iter::from_fn(|| s.advance()).collect();
    seen.sort_unstable();
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(s.advance(), None);
}

#[test]
fn shuffle_retreat_walks_back_without_new_randomness() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut s = ShuffleState::default();
    s.enable(5, None, &mut rng);
    let order = s.order().to_vec();

    assert_eq!(s.retreat(), None);
    s.advance();
    s.advance();
    s.advance();
    assert_eq!(s.retreat(), Some(order[1]));
    assert_eq!(s.retreat(), Some(order[0]));
    assert_eq!(s.retreat(), None);
    assert_eq!(s.order(), order.as_slice());
    assert_eq!(s.advance(), Some(order[1]));
}

#[test]
fn shuffle_rebuild_covers_everything() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut s = ShuffleState::default();
    s.enable(3, Some(1), &mut rng);
    s.rebuild(3, &mut rng);
    let mut sorted = s.order().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![0, 1, 2]);
    assert_eq!(s.cursor(), None);
}

#[test]
fn shuffle_follows_playlist_growth_and_reset() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut s = ShuffleState::default();
    s.enable(3, Some(0), &mut rng);
    s.advance();

    s.sync_len(5, &mut rng);
    let mut sorted = s.order().to_vec();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2, 3, 4]);
    // new entries land after what was already there
    assert!(s.order()[2..].contains(&3));
    assert!(s.order()[2..].contains(&4));
    assert_eq!(s.cursor(), Some(0));

    s.sync_len(0, &mut rng);
    assert!(s.order().is_empty());
    assert_eq!(s.cursor(), None);
    assert_eq!(s.advance(), None);
}

#[test]
fn disabled_shuffle_ignores_sync() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut s = ShuffleState::default();
    s.sync_len(10, &mut rng);
    assert!(s.order().is_empty());
    s.enable(2, None, &mut rng);
    s.disable();
    assert!(!s.is_enabled());
    assert!(s.order().is_empty());
}
