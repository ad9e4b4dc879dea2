//! Resolver and integrator, one step at a time.

use flight_core::{
    CameraIntegrator, CameraPose, FlightConfig, MotionResolver, RotationAccumulator,
};
use hand_gesture::synth::{synthesize, HandPose};
use hand_gesture::{Gesture, HandLandmarks, Landmark, SceneSample};

fn right(gesture: Gesture, at: (f32, f32)) -> SceneSample {
    SceneSample {
        right:         Some(synthesize(HandPose::Fist, at, 0.25)),
        right_gesture: gesture,
        ..SceneSample::default()
    }
}

fn fingertips_apart(d: f32) -> SceneSample {
    let hand = |x: f32| HandLandmarks::from_points(vec![Landmark::new(x, 0.5); 21]);
    SceneSample {
        left:  Some(hand(0.5 - d / 2.0)),
        right: Some(hand(0.5 + d / 2.0)),
        ..SceneSample::default()
    }
}

fn main() {
    let cfg = FlightConfig::default();
    let dt = 1.0 / 60.0;

    println!("\n=== Flight Core Demo ===\n");

    // ── 1. Steering ───────────────────────────────────────────────────────
    println!("1. Steering targets (dead zone {}, sensitivity {})",
        cfg.head_tracking_dead_zone, cfg.head_tracking_sensitivity);
    let mut resolver = MotionResolver::new(&cfg);
    for at in [(0.5, 0.5), (0.7, 0.5), (0.9, 0.5), (0.5, 0.1), (1.0, 0.0)] {
        let r = resolver.resolve(&right(Gesture::PalmOpen, at), &cfg).targets.rotation;
        println!("   hand at ({:.1}, {:.1}) → yaw {:+.3}  pitch {:+.3}", at.0, at.1, r.yaw, r.pitch);
    }
    println!();

    // ── 2. Velocity per gesture ───────────────────────────────────────────
    println!("2. Velocity targets (fly speed {})", cfg.fly_speed);
    for g in [Gesture::Grab, Gesture::Pinch, Gesture::Victory, Gesture::PalmOpen, Gesture::Idle] {
        let v = resolver.resolve(&right(g, (0.5, 0.5)), &cfg).targets.velocity;
        println!("   {:<10} → ×{:+.1}  ({:+.0} u/s)", g, v, v * cfg.fly_speed);
    }
    println!();

    // ── 3. Two-hand zoom ──────────────────────────────────────────────────
    println!("3. Two-hand zoom (band {}..{})", cfg.zoom_min_delta, cfg.zoom_max_delta);
    let mut resolver = MotionResolver::new(&cfg);
    for d in [0.20, 0.202, 0.25, 0.30, 0.60, 0.55] {
        let fov = resolver.resolve(&fingertips_apart(d), &cfg).targets.fov;
        println!("   tips {:.3} apart → fov target {:.1}", d, fov);
    }
    println!();

    // ── 4. Integration ────────────────────────────────────────────────────
    println!("4. One second of GRAB, then release");
    let mut resolver = MotionResolver::new(&cfg);
    let mut integ = CameraIntegrator::new();
    let mut cam = CameraPose::default();
    resolver.resolve(&right(Gesture::Grab, (0.5, 0.5)), &cfg);
    for i in 1..=60 {
        let rep = integ.tick(resolver.targets(), &RotationAccumulator::default(), &mut cam, &cfg, dt);
        if i % 15 == 0 {
            println!("   t={:.2}s  speed {:>6.1}  z {:>7.2}", i as f32 * dt, rep.speed, cam.position.z);
        }
    }
    resolver.freeze(&cfg);
    let rep = integ.tick(resolver.targets(), &RotationAccumulator::default(), &mut cam, &cfg, dt);
    println!("   released  speed {:>6.1}  z {:>7.2}", rep.speed, cam.position.z);
    println!();

    // ── 5. Boundary ───────────────────────────────────────────────────────
    println!("5. Flying out past the boundary ({})", cfg.boundary_distance);
    let mut cam = CameraPose::default();
    cam.rotation.yaw = std::f32::consts::PI;
    let mut integ = CameraIntegrator::new();
    let mut resolver = MotionResolver::new(&cfg);
    let steer_off = FlightConfig { enable_head_tracking: false, ..cfg.clone() };
    resolver.resolve(&right(Gesture::Grab, (0.5, 0.5)), &steer_off);
    let mut targets = *resolver.targets();
    targets.rotation = cam.rotation;
    for i in 1..=240 {
        let rep = integ.tick(&targets, &RotationAccumulator::default(), &mut cam, &cfg, dt);
        if i % 30 == 0 {
            println!("   t={:.1}s  distance {:>6.1}  speed {:>6.1}{}",
                i as f32 * dt, cam.distance_from_origin(), rep.speed,
                if rep.bouncing { "  (bouncing)" } else { "" });
        }
    }
    println!();
}
