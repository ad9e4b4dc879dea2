//! Gesture-mode lifecycle.
//!
//! A [`GestureSession`] exists while gesture control is switched on.  It
//! owns the aggregator and the resolver, and shares a [`Liveness`] flag
//! with whatever thread runs the detector.  Once torn down, callbacks that
//! were already in flight are discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use hand_gesture::{
    DebugStatus, DetectorResult, FrameAggregator, GestureClassifier, HandsView, SceneSample,
};

use crate::config::FlightConfig;
use crate::resolver::{ControlMode, MotionResolver, MotionTargets, Resolution, RotationAccumulator};

pub const STATUS_STARTING:  &str = "Initializing hand tracking...";
pub const STATUS_TRACKING:  &str = "Tracking";
pub const STATUS_SEARCHING: &str = "Searching for hands...";

// ════════════════════════════════════════════════════════════════════════════
// Liveness
// ════════════════════════════════════════════════════════════════════════════

/// Shared "session still wants results" flag.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Liveness(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Liveness::new()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureSession
// ════════════════════════════════════════════════════════════════════════════

/// Everything produced by one sensor callback.
#[derive(Clone, Debug)]
pub struct SessionUpdate {
    pub sample:     SceneSample,
    pub resolution: Resolution,
    pub hands:      HandsView,
    pub debug:      DebugStatus,
}

#[derive(Debug)]
pub struct GestureSession {
    aggregator: FrameAggregator,
    resolver:   MotionResolver,
    liveness:   Liveness,
    status:     String,
    callbacks:  u64,
}

impl GestureSession {
    pub fn new(cfg: &FlightConfig) -> Self {
        let aggregator = FrameAggregator::new(GestureClassifier::new(cfg.pinch_threshold));
        GestureSession::with_aggregator(aggregator, cfg)
    }

    /// Session with a custom aggregator, e.g. for detectors that already
    /// report user-side labels.
    pub fn with_aggregator(aggregator: FrameAggregator, cfg: &FlightConfig) -> Self {
        GestureSession::start(aggregator, MotionResolver::new(cfg))
    }

    /// New session continuing from the current camera targets and the
    /// point-cloud rotation of a previous session.
    pub fn resume(cfg: &FlightConfig, targets: MotionTargets, accumulator: RotationAccumulator) -> Self {
        let aggregator = FrameAggregator::new(GestureClassifier::new(cfg.pinch_threshold));
        GestureSession::start(aggregator, MotionResolver::resume(cfg, targets, accumulator))
    }

    fn start(aggregator: FrameAggregator, resolver: MotionResolver) -> Self {
        info!(mirrored_labels = aggregator.mirrored_labels, "gesture session started");
        GestureSession {
            aggregator,
            resolver,
            liveness:  Liveness::new(),
            status:    STATUS_STARTING.to_string(),
            callbacks: 0,
        }
    }

    /// Restart the resolver from `targets`, e.g. after the camera was reset
    /// under it.  Keeps the sensor link and the point-cloud rotation.
    pub fn retarget(&mut self, cfg: &FlightConfig, targets: MotionTargets) {
        let accumulator = *self.resolver.accumulator();
        self.resolver = MotionResolver::resume(cfg, targets, accumulator);
        debug!(fov = self.resolver.targets().fov, "resolver retargeted");
    }

    /// Handle for the sensor side.
    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn callbacks(&self) -> u64 {
        self.callbacks
    }

    pub fn targets(&self) -> &MotionTargets {
        self.resolver.targets()
    }

    pub fn accumulator(&self) -> &RotationAccumulator {
        self.resolver.accumulator()
    }

    pub fn resolver(&self) -> &MotionResolver {
        &self.resolver
    }

    /// Aggregate, classify and resolve one detector callback.
    ///
    /// Returns `None` once the session has been torn down.
    pub fn handle_result(&mut self, result: &DetectorResult, cfg: &FlightConfig) -> Option<SessionUpdate> {
        if !self.liveness.is_alive() {
            debug!("callback after teardown discarded");
            return None;
        }
        self.callbacks += 1;
        self.aggregator.classifier.pinch_threshold = cfg.pinch_threshold;

        let sample = self.aggregator.aggregate(result);
        let resolution = self.resolver.resolve(&sample, cfg);
        self.status = match resolution.mode {
            ControlMode::NoHands => STATUS_SEARCHING,
            _                    => STATUS_TRACKING,
        }
        .to_string();

        Some(self.update(sample, resolution))
    }

    /// The sensor failed or went away.  Freezes the camera and reports the
    /// error as status; the session stays alive so the sensor can retry.
    pub fn handle_sensor_error(&mut self, message: &str, cfg: &FlightConfig) -> Option<SessionUpdate> {
        if !self.liveness.is_alive() {
            return None;
        }
        warn!(%message, "hand sensor unavailable, freezing");
        let resolution = self.resolver.freeze(cfg);
        self.status = format!("Error: {}", message);
        Some(self.update(SceneSample::empty(), resolution))
    }

    /// Stop accepting callbacks.  Idempotent.
    pub fn teardown(&mut self) {
        if self.liveness.is_alive() {
            info!(callbacks = self.callbacks, "gesture session torn down");
            self.liveness.kill();
        }
    }

    fn update(&self, sample: SceneSample, resolution: Resolution) -> SessionUpdate {
        SessionUpdate {
            hands: sample.hands_view(),
            debug: sample.debug_status(&self.status, resolution.gesture),
            sample,
            resolution,
        }
    }
}

impl Drop for GestureSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::synth::{synthesize, HandPose};
    use hand_gesture::Gesture;

    fn fist() -> DetectorResult {
        DetectorResult::empty().with_hand("Left", synthesize(HandPose::Fist, (0.5, 0.5), 0.25))
    }

    #[test]
    fn tracks_and_reports() {
        let cfg = FlightConfig::default();
        let mut s = GestureSession::new(&cfg);
        assert_eq!(s.status(), STATUS_STARTING);

        let u = s.handle_result(&fist(), &cfg).unwrap();
        assert_eq!(u.resolution.gesture, Gesture::Grab);
        assert_eq!(u.resolution.targets.velocity, 3.0);
        assert!(u.hands.right.visible);
        assert!(!u.hands.left.visible);
        assert_eq!(u.debug.status, STATUS_TRACKING);
        assert_eq!(u.debug.gesture, Gesture::Grab);
        assert!(u.debug.right_hand.is_some());
        assert_eq!(s.callbacks(), 1);
    }

    #[test]
    fn empty_callback_searches() {
        let cfg = FlightConfig::default();
        let mut s = GestureSession::new(&cfg);
        let u = s.handle_result(&DetectorResult::empty(), &cfg).unwrap();
        assert_eq!(u.debug.status, STATUS_SEARCHING);
        assert_eq!(u.resolution.mode, ControlMode::NoHands);
    }

    #[test]
    fn sensor_error_freezes() {
        let cfg = FlightConfig::default();
        let mut s = GestureSession::new(&cfg);
        s.handle_result(&fist(), &cfg);
        assert_eq!(s.targets().velocity, 3.0);

        let u = s.handle_sensor_error("camera busy", &cfg).unwrap();
        assert_eq!(u.resolution.targets.velocity, 0.0);
        assert_eq!(u.debug.status, "Error: camera busy");
        assert!(s.is_alive());
    }

    #[test]
    fn results_after_teardown_are_discarded() {
        let cfg = FlightConfig::default();
        let mut s = GestureSession::new(&cfg);
        let sensor_side = s.liveness();
        s.teardown();
        assert!(!sensor_side.is_alive());
        assert!(s.handle_result(&fist(), &cfg).is_none());
        assert!(s.handle_sensor_error("late", &cfg).is_none());
        assert_eq!(s.targets().velocity, 0.0);
        assert_eq!(s.callbacks(), 0);
    }

    #[test]
    fn pinch_threshold_follows_config() {
        let mut cfg = FlightConfig::default();
        let mut s = GestureSession::new(&cfg);
        let pinch = DetectorResult::empty().with_hand("Left", synthesize(HandPose::Pinch, (0.5, 0.5), 0.25));
        assert_eq!(s.handle_result(&pinch, &cfg).unwrap().resolution.gesture, Gesture::Pinch);

        cfg.pinch_threshold = 0.0;
        let g = s.handle_result(&pinch, &cfg).unwrap().resolution.gesture;
        assert_ne!(g, Gesture::Pinch);
    }

    #[test]
    fn resumed_session_keeps_galaxy_rotation() {
        let cfg = FlightConfig::default();
        let acc = RotationAccumulator { x: 0.3, y: 0.7 };
        let s = GestureSession::resume(&cfg, MotionTargets::at_rest(45.0), acc);
        assert_eq!(*s.accumulator(), acc);
        assert_eq!(s.targets().fov, 45.0);
        assert_eq!(s.status(), STATUS_STARTING);
    }

    #[test]
    fn retarget_drops_old_intent_but_keeps_rotation_and_sensor() {
        let cfg = FlightConfig { enable_two_hand_rotation: true, ..FlightConfig::default() };
        let acc = RotationAccumulator { x: 0.3, y: 0.7 };
        let mut s = GestureSession::resume(&cfg, MotionTargets::at_rest(45.0), acc);
        let handle = s.liveness();
        let fist = DetectorResult::empty().with_hand("Left", synthesize(HandPose::Fist, (0.85, 0.35), 0.25));
        s.handle_result(&fist, &cfg);
        assert!(s.targets().velocity > 0.0);

        s.retarget(&cfg, MotionTargets::at_rest(60.0));
        assert_eq!(*s.targets(), MotionTargets::at_rest(60.0));
        assert_eq!(*s.accumulator(), acc);
        assert!(handle.is_alive());
    }

    #[test]
    fn dropping_session_kills_liveness() {
        let cfg = FlightConfig::default();
        let handle = GestureSession::new(&cfg).liveness();
        assert!(!handle.is_alive());
    }
}
