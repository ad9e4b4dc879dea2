//! flight_sim: run a scripted gesture timeline through the flight core,
//! headless, and print the camera trajectory.
//!
//! The sensor fires at 20 Hz and the integrator ticks at 60 Hz, so three
//! ticks read each set of targets.
//!
//! ```text
//! flight_sim
//! flight_sim --config tuned.json -v
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use flight_core::{Camera, CameraIntegrator, CameraPose, FlightConfig, GestureSession, Vec3};
use hand_gesture::synth::{synthesize, synthesize_mirrored, HandPose};
use hand_gesture::DetectorResult;

const TICK_HZ:   u32 = 60;
const SENSOR_EVERY: u32 = 3;
const PRINT_EVERY:  u32 = 15;

/// One stretch of the script.
struct Phase {
    name:    &'static str,
    seconds: f32,
    frame:   fn(f32) -> DetectorResult,
}

/// Detector "Left" is the user's right hand.
fn right_hand(pose: HandPose, wrist: (f32, f32)) -> DetectorResult {
    DetectorResult::empty().with_hand("Left", synthesize(pose, wrist, 0.25))
}

fn script() -> Vec<Phase> {
    vec![
        Phase { name: "no hands",      seconds: 1.0, frame: |_| DetectorResult::empty() },
        Phase { name: "grab, centred", seconds: 2.0, frame: |_| right_hand(HandPose::Fist, (0.5, 0.5)) },
        Phase { name: "grab, steer",   seconds: 1.5, frame: |_| right_hand(HandPose::Fist, (0.85, 0.35)) },
        Phase { name: "open palm",     seconds: 1.0, frame: |_| right_hand(HandPose::OpenPalm, (0.85, 0.35)) },
        Phase { name: "victory",       seconds: 1.0, frame: |_| right_hand(HandPose::Victory, (0.5, 0.5)) },
        Phase {
            name:    "two-hand zoom",
            seconds: 1.5,
            // Index tips drift apart ~0.027 per sensor frame.
            frame:   |t| {
                let spread = 0.1 + t * 0.4;
                DetectorResult::empty()
                    .with_hand("Left",  synthesize(HandPose::Pinch, (0.5 - spread, 0.6), 0.2))
                    .with_hand("Right", synthesize_mirrored(HandPose::Pinch, (0.5 + spread, 0.6), 0.2))
            },
        },
        Phase { name: "no hands",      seconds: 1.0, frame: |_| DetectorResult::empty() },
    ]
}

#[derive(Parser, Debug)]
#[command(name = "flight_sim", version, about = "Run a scripted gesture timeline through the flight core")]
struct Args {
    /// Flight config (JSON, camelCase keys; missing keys take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            self.log_level.parse().unwrap_or(LevelFilter::WARN)
        }
    }
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.level())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cfg = match &args.config {
        Some(path) => match FlightConfig::from_json(path) {
            Ok(c)  => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        None => FlightConfig::default(),
    };

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║              Gesture Flight, headless run                ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!("  fly speed {}  boundary {}  steering {}  galaxy drag {}",
        cfg.fly_speed, cfg.boundary_distance,
        on_off(cfg.enable_head_tracking), on_off(cfg.enable_two_hand_rotation));
    println!();
    println!("   t(s)  phase           gesture       speed    fov    yaw    pitch   position");
    println!("  ─────  ──────────────  ───────────  ───────  ─────  ──────  ──────  ─────────────────────────");

    let mut session = GestureSession::new(&cfg);
    let mut integrator = CameraIntegrator::new();
    let mut camera = CameraPose::new(Vec3::from(cfg.initial_position), cfg.initial_fov);
    let dt = 1.0 / TICK_HZ as f32;
    let mut tick: u32 = 0;
    let mut gesture = hand_gesture::Gesture::Idle;

    for phase in script() {
        let ticks = (phase.seconds * TICK_HZ as f32).round() as u32;
        for i in 0..ticks {
            if tick % SENSOR_EVERY == 0 {
                let local_t = i as f32 / ticks.max(1) as f32;
                if let Some(update) = session.handle_result(&(phase.frame)(local_t), &cfg) {
                    gesture = update.resolution.gesture;
                }
            }

            let report = integrator.tick(session.targets(), session.accumulator(), &mut camera, &cfg, dt);
            tick += 1;

            if tick % PRINT_EVERY == 0 {
                let p = camera.position();
                let r = camera.rotation();
                println!(
                    "  {:>5.2}  {:<14}  {:<11}  {:>7.1}  {:>5.1}  {:>6.3}  {:>6.3}  ({:>7.1}, {:>7.1}, {:>7.1}){}",
                    tick as f32 * dt, phase.name, gesture, report.speed, camera.fov(),
                    r.yaw, r.pitch, p.x, p.y, p.z,
                    if report.bouncing { "  ⟲" } else { "" },
                );
            }
        }
    }

    session.teardown();
    println!();
    println!("  {} sensor frames, final distance from origin {:.1}",
        session.callbacks(), camera.distance_from_origin());
}

fn on_off(b: bool) -> &'static str {
    if b { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_verbosity() {
        let args = Args::try_parse_from(["flight_sim", "--config", "tuned.json", "-v"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("tuned.json")));
        assert_eq!(args.level(), LevelFilter::DEBUG);

        let args = Args::try_parse_from(["flight_sim"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.level(), LevelFilter::WARN);
        assert!(Args::try_parse_from(["flight_sim", "--config"]).is_err());
    }
}
