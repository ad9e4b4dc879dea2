//! Motion-intent resolution.
//!
//! One call per sensor callback.  The first matching branch wins:
//!
//! | Hands | Mode | Velocity | Rotation target | FOV target |
//! |---|---|---|---|---|
//! | 2 | `TwoHandZoom` | 0 | held | pinch-distance delta inside the zoom band |
//! | 1 | `SingleHand` | GRAB/PINCH forward, VICTORY reverse, else 0 | steering | held |
//! | 0 | `NoHands` | 0 | level if steering is off, else held | held |
//!
//! In single-hand mode a sustained GRAB also drags the point cloud when
//! two-hand rotation is enabled and the hand is clear of the edge band.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use hand_gesture::landmark::INDEX_TIP;
use hand_gesture::{planar_distance, Gesture, HandLandmarks, Handedness, SceneSample};

use crate::camera::Rotation;
use crate::config::FlightConfig;

/// Radians of point-cloud rotation per normalized unit of hand travel.
pub const GALAXY_ROTATION_GAIN: f32 = 2.0;

/// Frame centre; steering offsets are measured from here.
const FRAME_CENTER: (f32, f32) = (0.5, 0.5);

// ════════════════════════════════════════════════════════════════════════════
// Targets and accumulated state
// ════════════════════════════════════════════════════════════════════════════

/// What the camera should be doing.  Written by the resolver, read by the
/// integrator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MotionTargets {
    pub rotation: Rotation,
    /// Unitless multiplier on `fly_speed`; negative flies backwards.
    pub velocity: f32,
    /// Degrees, always inside `fov_min..=fov_max`.
    pub fov:      f32,
}

impl MotionTargets {
    pub fn at_rest(fov: f32) -> Self {
        MotionTargets { rotation: Rotation::LEVEL, velocity: 0.0, fov }
    }
}

impl Default for MotionTargets {
    fn default() -> Self {
        MotionTargets::at_rest(60.0)
    }
}

/// Rotation applied to the point cloud itself, radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RotationAccumulator {
    pub x: f32,
    pub y: f32,
}

impl RotationAccumulator {
    /// Fold in one drag delta: vertical travel turns about X, horizontal
    /// travel about Y.
    pub fn accumulate(&mut self, delta: (f32, f32)) {
        self.x += delta.1 * GALAXY_ROTATION_GAIN;
        self.y += delta.0 * GALAXY_ROTATION_GAIN;
    }
}

/// Everything the resolver remembers between callbacks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResolverState {
    /// Index-tip separation on the last two-hand callback.
    pub prev_pinch_distance: Option<f32>,
    /// Hand position on the last callback that dragged the point cloud.
    pub prev_hand_position:  Option<(f32, f32)>,
    pub accumulator:         RotationAccumulator,
}

/// Which branch produced a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    TwoHandZoom,
    SingleHand(Handedness),
    NoHands,
}

impl ControlMode {
    pub fn label(self) -> &'static str {
        match self {
            ControlMode::TwoHandZoom                    => "two-hand zoom",
            ControlMode::SingleHand(Handedness::Left)   => "left hand",
            ControlMode::SingleHand(Handedness::Right)  => "right hand",
            ControlMode::NoHands                        => "no hands",
        }
    }
}

/// Result of one [`MotionResolver::resolve`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub targets: MotionTargets,
    pub mode:    ControlMode,
    /// Gesture driving the camera: the single hand's gesture, `PINCH_SCALE`
    /// with two hands, `IDLE` with none.
    pub gesture: Gesture,
}

// ════════════════════════════════════════════════════════════════════════════
// MotionResolver
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct MotionResolver {
    targets: MotionTargets,
    state:   ResolverState,
}

impl MotionResolver {
    pub fn new(cfg: &FlightConfig) -> Self {
        MotionResolver {
            targets: MotionTargets::at_rest(cfg.initial_fov),
            state:   ResolverState::default(),
        }
    }

    /// Pick up from an existing camera state, keeping the point-cloud
    /// rotation built up by earlier sessions.
    pub fn resume(cfg: &FlightConfig, targets: MotionTargets, accumulator: RotationAccumulator) -> Self {
        MotionResolver {
            targets: MotionTargets {
                velocity: 0.0,
                fov: targets.fov.clamp(cfg.fov_min, cfg.fov_max),
                ..targets
            },
            state: ResolverState { accumulator, ..ResolverState::default() },
        }
    }

    pub fn targets(&self) -> &MotionTargets {
        &self.targets
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn accumulator(&self) -> &RotationAccumulator {
        &self.state.accumulator
    }

    pub fn resolve(&mut self, sample: &SceneSample, cfg: &FlightConfig) -> Resolution {
        let (mode, gesture) = if let Some((left, right)) = sample.both() {
            self.two_hands(left, right, cfg);
            (ControlMode::TwoHandZoom, Gesture::PinchScale)
        } else if let Some((side, hand, gesture)) = sample.single_hand() {
            self.one_hand(hand, gesture, cfg);
            (ControlMode::SingleHand(side), gesture)
        } else {
            self.no_hands(cfg);
            (ControlMode::NoHands, Gesture::Idle)
        };

        trace!(?mode, %gesture, velocity = self.targets.velocity, fov = self.targets.fov, "resolved");
        Resolution { targets: self.targets, mode, gesture }
    }

    /// Resolve as if no hands were seen.  Used when the sensor is
    /// unavailable or has failed.
    pub fn freeze(&mut self, cfg: &FlightConfig) -> Resolution {
        self.resolve(&SceneSample::empty(), cfg)
    }

    // ── branches ─────────────────────────────────────────────────────────

    fn two_hands(&mut self, left: &HandLandmarks, right: &HandLandmarks, cfg: &FlightConfig) {
        let distance = left
            .point(INDEX_TIP)
            .zip(right.point(INDEX_TIP))
            .map(|(a, b)| planar_distance(a, b));

        if let (Some(d), Some(prev)) = (distance, self.state.prev_pinch_distance) {
            let delta = d - prev;
            let magnitude = delta.abs();
            if magnitude > cfg.zoom_min_delta && magnitude < cfg.zoom_max_delta {
                self.targets.fov =
                    (self.targets.fov - delta * cfg.zoom_scale).clamp(cfg.fov_min, cfg.fov_max);
            } else if magnitude >= cfg.zoom_max_delta {
                debug!(delta, "pinch jump treated as repositioning");
            }
        }

        self.targets.velocity = 0.0;
        self.state.prev_hand_position = None;
        self.state.prev_pinch_distance = distance;
    }

    fn one_hand(&mut self, hand: &HandLandmarks, gesture: Gesture, cfg: &FlightConfig) {
        self.state.prev_pinch_distance = None;

        let Some(position) = hand.anchor() else {
            debug!("hand without a usable wrist, freezing");
            self.targets.velocity = 0.0;
            self.state.prev_hand_position = None;
            return;
        };

        self.targets.rotation = if cfg.enable_head_tracking {
            steering_target(position, cfg)
        } else {
            Rotation::LEVEL
        };

        self.targets.velocity = match gesture {
            Gesture::Grab | Gesture::Pinch => cfg.grab_velocity_multiplier,
            Gesture::Victory               => cfg.victory_velocity_multiplier,
            _                              => 0.0,
        };

        let dragging = gesture == Gesture::Grab && cfg.enable_two_hand_rotation;
        if dragging && !in_edge_band(position, cfg.edge_threshold) {
            if let Some(prev) = self.state.prev_hand_position {
                self.state.accumulator.accumulate((position.0 - prev.0, position.1 - prev.1));
            }
            self.state.prev_hand_position = Some(position);
        } else {
            if dragging {
                trace!(x = position.0, y = position.1, "drag ignored in edge band");
            }
            self.state.prev_hand_position = None;
        }
    }

    fn no_hands(&mut self, cfg: &FlightConfig) {
        self.targets.velocity = 0.0;
        if !cfg.enable_head_tracking {
            self.targets.rotation = Rotation::LEVEL;
        }
        self.state.prev_hand_position = None;
        self.state.prev_pinch_distance = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helpers
// ════════════════════════════════════════════════════════════════════════════

/// Camera rotation for a hand at `position` (normalized frame coordinates).
///
/// Inside the dead zone the camera looks straight ahead.  Beyond it only
/// the part of the offset past the dead-zone radius steers, so the target
/// is continuous at the boundary.  Hands higher in the frame pitch up.
pub fn steering_target(position: (f32, f32), cfg: &FlightConfig) -> Rotation {
    let dx = position.0 - FRAME_CENTER.0;
    let dy = position.1 - FRAME_CENTER.1;
    let radius = dx.hypot(dy);
    let dead = cfg.head_tracking_dead_zone;
    if radius <= 0.0 || radius < dead {
        return Rotation::LEVEL;
    }

    let scale = (radius - dead) / radius * cfg.head_tracking_sensitivity * cfg.steering_gain;
    let max = cfg.max_steering_angle;
    Rotation {
        pitch: (-dy * scale).clamp(-max, max),
        yaw:   (dx * scale).clamp(-max, max),
    }
}

/// True when `position` lies within `threshold` of any frame border.
pub fn in_edge_band(position: (f32, f32), threshold: f32) -> bool {
    let (x, y) = position;
    x < threshold || x > 1.0 - threshold || y < threshold || y > 1.0 - threshold
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hand_gesture::synth::{synthesize, HandPose};
    use hand_gesture::Landmark;
    use proptest::prelude::*;

    fn one_hand(gesture: Gesture, at: (f32, f32)) -> SceneSample {
        SceneSample {
            right:         Some(synthesize(HandPose::Fist, at, 0.25)),
            right_gesture: gesture,
            ..SceneSample::default()
        }
    }

    /// Two hands whose index tips sit `separation` apart horizontally.
    fn two_hands(separation: f32) -> SceneSample {
        let at = |x: f32| HandLandmarks::from_points(vec![Landmark::new(x, 0.5); 21]);
        SceneSample {
            left:          Some(at(0.0)),
            right:         Some(at(separation)),
            left_gesture:  Gesture::Pinch,
            right_gesture: Gesture::Pinch,
        }
    }

    fn zoom_cfg() -> FlightConfig {
        // Binary-exact band edges so boundary cases compare exactly.
        FlightConfig { zoom_min_delta: 0.125, zoom_max_delta: 0.5, ..FlightConfig::default() }
    }

    // ── two hands ────────────────────────────────────────────────────────

    #[test]
    fn first_two_hand_sample_only_records_distance() {
        let cfg = zoom_cfg();
        let mut r = MotionResolver::new(&cfg);
        let res = r.resolve(&two_hands(0.25), &cfg);
        assert_eq!(res.mode, ControlMode::TwoHandZoom);
        assert_eq!(res.gesture, Gesture::PinchScale);
        assert_eq!(res.targets.fov, 60.0);
        assert_eq!(r.state().prev_pinch_distance, Some(0.25));
    }

    #[test]
    fn zoom_delta_at_jitter_threshold_is_ignored() {
        let cfg = zoom_cfg();
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&two_hands(0.25), &cfg);
        let res = r.resolve(&two_hands(0.375), &cfg);
        assert_eq!(res.targets.fov, 60.0);
    }

    #[test]
    fn zoom_delta_inside_band_moves_fov() {
        let cfg = zoom_cfg();
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&two_hands(0.25), &cfg);
        let res = r.resolve(&two_hands(0.5), &cfg);
        assert_abs_diff_eq!(res.targets.fov, 35.0, epsilon = 1e-4);
        // Hands closing again widens the view.
        let res = r.resolve(&two_hands(0.25), &cfg);
        assert_abs_diff_eq!(res.targets.fov, 60.0, epsilon = 1e-4);
    }

    #[test]
    fn zoom_delta_at_repositioning_threshold_is_ignored() {
        let cfg = zoom_cfg();
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&two_hands(0.25), &cfg);
        let res = r.resolve(&two_hands(0.75), &cfg);
        assert_eq!(res.targets.fov, 60.0);
        assert_eq!(r.state().prev_pinch_distance, Some(0.75));
    }

    #[test]
    fn zoom_is_clamped_to_fov_band() {
        let cfg = FlightConfig { zoom_scale: 1000.0, ..zoom_cfg() };
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&two_hands(0.25), &cfg);
        assert_eq!(r.resolve(&two_hands(0.5), &cfg).targets.fov, 30.0);
        r.resolve(&two_hands(0.75), &cfg);
        assert_eq!(r.resolve(&two_hands(0.5), &cfg).targets.fov, 90.0);
    }

    #[test]
    fn two_hands_stop_travel_and_hold_rotation() {
        let cfg = FlightConfig::default();
        let mut r = MotionResolver::new(&cfg);
        let steered = r.resolve(&one_hand(Gesture::Grab, (0.9, 0.5)), &cfg);
        assert_eq!(steered.targets.velocity, 3.0);

        let res = r.resolve(&two_hands(0.25), &cfg);
        assert_eq!(res.targets.velocity, 0.0);
        assert_eq!(res.targets.rotation, steered.targets.rotation);
        assert_eq!(r.state().prev_hand_position, None);
    }

    // ── one hand ─────────────────────────────────────────────────────────

    #[test]
    fn centred_hand_in_dead_zone_looks_straight() {
        let cfg = FlightConfig::default();
        let mut r = MotionResolver::new(&cfg);
        let res = r.resolve(&one_hand(Gesture::PalmOpen, (0.5, 0.5)), &cfg);
        assert_eq!(res.targets.rotation, Rotation { pitch: 0.0, yaw: 0.0 });
        assert_eq!(res.mode, ControlMode::SingleHand(Handedness::Right));
    }

    #[test]
    fn steering_beyond_dead_zone() {
        let cfg = FlightConfig::default();
        // Offset 0.4 right of centre, 0.1 past the dead zone.
        let rot = steering_target((0.9, 0.5), &cfg);
        assert_abs_diff_eq!(rot.yaw, 0.1 * 0.4 * std::f32::consts::TAU, epsilon = 1e-5);
        assert_eq!(rot.pitch, 0.0);

        // Hand high in the frame pitches up.
        let rot = steering_target((0.5, 0.1), &cfg);
        assert!(rot.pitch > 0.0);
    }

    #[test]
    fn steering_is_bounded() {
        let cfg = FlightConfig { head_tracking_sensitivity: 10.0, ..FlightConfig::default() };
        let rot = steering_target((1.0, 0.0), &cfg);
        assert_eq!(rot.yaw, cfg.max_steering_angle);
        assert_eq!(rot.pitch, cfg.max_steering_angle);
    }

    #[test]
    fn steering_disabled_targets_level() {
        let cfg = FlightConfig { enable_head_tracking: false, ..FlightConfig::default() };
        let mut r = MotionResolver::new(&cfg);
        let res = r.resolve(&one_hand(Gesture::Grab, (0.95, 0.1)), &cfg);
        assert_eq!(res.targets.rotation, Rotation::LEVEL);
    }

    #[test]
    fn velocity_follows_gesture() {
        let cfg = FlightConfig::default();
        let mut r = MotionResolver::new(&cfg);
        let v = |r: &mut MotionResolver, g| r.resolve(&one_hand(g, (0.5, 0.5)), &cfg).targets.velocity;
        assert_eq!(v(&mut r, Gesture::Grab), 3.0);
        assert_eq!(v(&mut r, Gesture::Pinch), 3.0);
        assert_eq!(v(&mut r, Gesture::Victory), -3.0);
        assert_eq!(v(&mut r, Gesture::PalmOpen), 0.0);
        assert_eq!(v(&mut r, Gesture::Point), 0.0);
        assert_eq!(v(&mut r, Gesture::Idle), 0.0);
    }

    #[test]
    fn single_hand_clears_pinch_memory() {
        let cfg = FlightConfig::default();
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&two_hands(0.25), &cfg);
        r.resolve(&one_hand(Gesture::Idle, (0.5, 0.5)), &cfg);
        assert_eq!(r.state().prev_pinch_distance, None);
    }

    #[test]
    fn grab_with_rotation_disabled_leaves_accumulator() {
        let cfg = FlightConfig::default();
        let mut r = MotionResolver::new(&cfg);
        for x in [0.4, 0.5, 0.6] {
            r.resolve(&one_hand(Gesture::Grab, (x, 0.5)), &cfg);
        }
        assert_eq!(*r.accumulator(), RotationAccumulator::default());
        assert_eq!(r.state().prev_hand_position, None);
    }

    #[test]
    fn grab_drag_rotates_point_cloud() {
        let cfg = FlightConfig { enable_two_hand_rotation: true, ..FlightConfig::default() };
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&one_hand(Gesture::Grab, (0.5, 0.5)), &cfg);
        assert_eq!(*r.accumulator(), RotationAccumulator::default());
        r.resolve(&one_hand(Gesture::Grab, (0.6, 0.45)), &cfg);
        assert_abs_diff_eq!(r.accumulator().y, 0.1 * GALAXY_ROTATION_GAIN, epsilon = 1e-5);
        assert_abs_diff_eq!(r.accumulator().x, -0.05 * GALAXY_ROTATION_GAIN, epsilon = 1e-5);
    }

    #[test]
    fn edge_band_restarts_drag_tracking() {
        let cfg = FlightConfig { enable_two_hand_rotation: true, ..FlightConfig::default() };
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&one_hand(Gesture::Grab, (0.5, 0.5)), &cfg);
        r.resolve(&one_hand(Gesture::Grab, (0.6, 0.5)), &cfg);
        let after_first = r.accumulator().y;

        // Into the band: no delta, memory cleared.
        r.resolve(&one_hand(Gesture::Grab, (0.05, 0.5)), &cfg);
        assert_eq!(r.accumulator().y, after_first);
        assert_eq!(r.state().prev_hand_position, None);

        // Re-entry restarts tracking instead of jumping.
        r.resolve(&one_hand(Gesture::Grab, (0.5, 0.5)), &cfg);
        assert_eq!(r.accumulator().y, after_first);
        r.resolve(&one_hand(Gesture::Grab, (0.55, 0.5)), &cfg);
        assert_abs_diff_eq!(r.accumulator().y, after_first + 0.05 * GALAXY_ROTATION_GAIN, epsilon = 1e-5);
    }

    #[test]
    fn gesture_change_interrupts_drag() {
        let cfg = FlightConfig { enable_two_hand_rotation: true, ..FlightConfig::default() };
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&one_hand(Gesture::Grab, (0.5, 0.5)), &cfg);
        r.resolve(&one_hand(Gesture::PalmOpen, (0.7, 0.5)), &cfg);
        r.resolve(&one_hand(Gesture::Grab, (0.7, 0.5)), &cfg);
        assert_eq!(*r.accumulator(), RotationAccumulator::default());
    }

    #[test]
    fn resume_keeps_accumulator_and_clamps_fov() {
        let cfg = FlightConfig::default();
        let acc = RotationAccumulator { x: 0.5, y: -1.0 };
        let held = MotionTargets { rotation: Rotation::new(0.1, 0.2), velocity: 3.0, fov: 120.0 };
        let r = MotionResolver::resume(&cfg, held, acc);
        assert_eq!(*r.accumulator(), acc);
        assert_eq!(r.targets().fov, 90.0);
        assert_eq!(r.targets().velocity, 0.0);
        assert_eq!(r.targets().rotation, Rotation::new(0.1, 0.2));
    }

    #[test]
    fn edge_band_covers_all_borders() {
        assert!(in_edge_band((0.1, 0.5), 0.15));
        assert!(in_edge_band((0.9, 0.5), 0.15));
        assert!(in_edge_band((0.5, 0.1), 0.15));
        assert!(in_edge_band((0.5, 0.9), 0.15));
        assert!(!in_edge_band((0.5, 0.5), 0.15));
    }

    // ── no hands ─────────────────────────────────────────────────────────

    #[test]
    fn no_hands_freezes_and_forgets() {
        let cfg = FlightConfig { enable_two_hand_rotation: true, ..FlightConfig::default() };
        let mut r = MotionResolver::new(&cfg);
        let steered = r.resolve(&one_hand(Gesture::Grab, (0.9, 0.5)), &cfg);
        let res = r.freeze(&cfg);
        assert_eq!(res.mode, ControlMode::NoHands);
        assert_eq!(res.gesture, Gesture::Idle);
        assert_eq!(res.targets.velocity, 0.0);
        // Steering on: the last look direction is held.
        assert_eq!(res.targets.rotation, steered.targets.rotation);
        assert_eq!(r.state().prev_hand_position, None);
        assert_eq!(r.state().prev_pinch_distance, None);
    }

    #[test]
    fn no_hands_levels_camera_when_steering_disabled() {
        let cfg = FlightConfig::default();
        let mut r = MotionResolver::new(&cfg);
        r.resolve(&one_hand(Gesture::Grab, (0.9, 0.5)), &cfg);
        let off = FlightConfig { enable_head_tracking: false, ..cfg };
        assert_eq!(r.freeze(&off).targets.rotation, Rotation::LEVEL);
    }

    // ── properties ───────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn accumulation_is_sum_of_deltas(
            path in proptest::collection::vec((0.2f32..0.8, 0.2f32..0.8), 2..20)
        ) {
            let cfg = FlightConfig { enable_two_hand_rotation: true, ..FlightConfig::default() };
            let mut r = MotionResolver::new(&cfg);
            for &p in &path {
                r.resolve(&one_hand(Gesture::Grab, p), &cfg);
            }
            let (mut sx, mut sy) = (0.0f32, 0.0f32);
            for w in path.windows(2) {
                sx += w[1].0 - w[0].0;
                sy += w[1].1 - w[0].1;
            }
            prop_assert!((r.accumulator().y - sx * GALAXY_ROTATION_GAIN).abs() < 1e-4);
            prop_assert!((r.accumulator().x - sy * GALAXY_ROTATION_GAIN).abs() < 1e-4);
        }

        #[test]
        fn fov_target_stays_in_band(seps in proptest::collection::vec(0.0f32..1.0, 1..30)) {
            let cfg = FlightConfig::default();
            let mut r = MotionResolver::new(&cfg);
            for s in seps {
                let fov = r.resolve(&two_hands(s), &cfg).targets.fov;
                prop_assert!((cfg.fov_min..=cfg.fov_max).contains(&fov));
            }
        }
    }
}
