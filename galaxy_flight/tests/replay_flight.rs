//! Recorded detector output through the whole app, no window.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use galaxy_flight::app::{AppConfig, AppState, GalaxySource, NavMode, SensorChoice};
use galaxy_flight::sensor::REPLAY_FINISHED;
use hand_gesture::synth::{synthesize, HandPose};
use hand_gesture::{DetectorResult, Gesture};

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("galaxy_flight_{}_{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

fn recording(frames: usize) -> String {
    let fist = DetectorResult::empty().with_hand("Left", synthesize(HandPose::Fist, (0.5, 0.5), 0.25));
    let line = serde_json::to_string(&fist).unwrap();
    let mut out = String::new();
    for _ in 0..frames {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("garbage line\n");
    out
}

#[test]
fn replayed_fist_flies_then_stops() {
    let path = temp_file("fist.jsonl", &recording(6));
    let cfg = AppConfig {
        sensor: SensorChoice::Replay { path: path.clone(), looped: false },
        ..AppConfig::default()
    };
    let mut app = AppState::new(cfg).unwrap();
    app.enable_gesture();
    assert_eq!(app.mode(), NavMode::Gesture);

    let mut saw_grab = false;
    let deadline = Instant::now() + Duration::from_secs(5);
    while app.debug().status != REPLAY_FINISHED && Instant::now() < deadline {
        app.pump_sensor();
        saw_grab |= app.gesture() == Gesture::Grab;
        app.tick(1.0 / 60.0);
        thread::sleep(Duration::from_millis(16));
    }
    assert!(saw_grab);
    assert_eq!(app.debug().status, REPLAY_FINISHED);
    assert!(app.camera().position.z < 200.0);

    // The tape ended with no hands: the camera is parked.
    assert_eq!(app.session().unwrap().targets().velocity, 0.0);
    app.tick(1.0 / 60.0);
    let parked = app.camera().position;
    for _ in 0..10 {
        app.tick(1.0 / 60.0);
    }
    assert_eq!(app.camera().position, parked);

    fs::remove_file(path).ok();
}

#[test]
fn galaxy_file_is_loaded() {
    let path = temp_file(
        "galaxy.json",
        r##"[{"x":0,"y":0,"z":0,"color":"#FF1744","title":"core"},{"x":100,"y":0,"z":0,"color":"#2979FF"}]"##,
    );
    let cfg = AppConfig { galaxy: GalaxySource::File(path.clone()), ..AppConfig::default() };
    let app = AppState::new(cfg).unwrap();
    assert_eq!(app.galaxy().len(), 2);
    assert_eq!(app.galaxy().points()[0].title.as_deref(), Some("core"));
    fs::remove_file(path).ok();
}

#[test]
fn bad_galaxy_file_is_an_error() {
    let path = temp_file("bad_galaxy.json", r#"[{"x":0,"y":0,"z":0,"color":"red"}]"#);
    let cfg = AppConfig { galaxy: GalaxySource::File(path.clone()), ..AppConfig::default() };
    assert!(AppState::new(cfg).is_err());
    fs::remove_file(path).ok();
}
