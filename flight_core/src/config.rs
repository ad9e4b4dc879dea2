//! Flight configuration.
//!
//! Every knob is runtime-tunable: the resolver and integrator take a
//! `&FlightConfig` snapshot on each call rather than capturing one.

use std::f32::consts::TAU;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const FLY_SPEED_RANGE:         RangeInclusive<f32> = 10.0..=200.0;
pub const BOUNDARY_DISTANCE_RANGE: RangeInclusive<f32> = 100.0..=1000.0;
pub const EDGE_THRESHOLD_RANGE:    RangeInclusive<f32> = 0.05..=0.4;

/// Configuration for gesture flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightConfig {
    // ── user-facing ──────────────────────────────────────────────────────
    /// Base travel speed, world units per second.
    pub fly_speed:                   f32,
    /// Distance from the origin beyond which the camera is pulled back.
    pub boundary_distance:           f32,
    /// Width of the frame border (normalized) in which drag deltas are ignored.
    pub edge_threshold:              f32,
    pub enable_two_hand_rotation:    bool,
    pub enable_head_tracking:        bool,
    pub pinch_threshold:             f32,
    pub head_tracking_sensitivity:   f32,
    /// Radius around the frame centre that produces no steering.
    pub head_tracking_dead_zone:     f32,
    pub grab_velocity_multiplier:    f32,
    /// Negative: VICTORY flies backwards.
    pub victory_velocity_multiplier: f32,
    pub boundary_push_back_strength: f32,

    // ── two-hand zoom ────────────────────────────────────────────────────
    /// Pinch-distance changes at or below this are jitter.
    pub zoom_min_delta:              f32,
    /// Pinch-distance changes at or above this are hands being repositioned.
    pub zoom_max_delta:              f32,
    /// Degrees of FOV per normalized unit of pinch-distance change.
    pub zoom_scale:                  f32,
    pub fov_min:                     f32,
    pub fov_max:                     f32,

    // ── steering ─────────────────────────────────────────────────────────
    /// Radians per normalized unit of offset beyond the dead zone, before
    /// sensitivity.
    pub steering_gain:               f32,
    pub max_steering_angle:          f32,

    // ── integration rates (1/s) ──────────────────────────────────────────
    pub rotation_rate:               f32,
    /// Rotation rate while head tracking steers; lower for stability.
    pub steering_rotation_rate:      f32,
    pub fov_rate:                    f32,
    pub speed_response:              f32,

    // ── initial camera ───────────────────────────────────────────────────
    pub initial_position:            [f32; 3],
    pub initial_fov:                 f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        FlightConfig {
            fly_speed:                   90.0,
            boundary_distance:           300.0,
            edge_threshold:              0.15,
            enable_two_hand_rotation:    false,
            enable_head_tracking:        true,
            pinch_threshold:             0.05,
            head_tracking_sensitivity:   0.4,
            head_tracking_dead_zone:     0.3,
            grab_velocity_multiplier:    3.0,
            victory_velocity_multiplier: -3.0,
            boundary_push_back_strength: 0.5,

            zoom_min_delta:              0.005,
            zoom_max_delta:              0.15,
            zoom_scale:                  100.0,
            fov_min:                     30.0,
            fov_max:                     90.0,

            steering_gain:               TAU,
            max_steering_angle:          0.6,

            rotation_rate:               5.0,
            steering_rotation_rate:      2.5,
            fov_rate:                    5.0,
            speed_response:              6.0,

            initial_position:            [0.0, 0.0, 200.0],
            initial_fov:                 60.0,
        }
    }
}

impl FlightConfig {
    /// Parse a JSON config.  Missing keys take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: FlightConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("flySpeed",          self.fly_speed,         &FLY_SPEED_RANGE)?;
        check_range("boundaryDistance",  self.boundary_distance, &BOUNDARY_DISTANCE_RANGE)?;
        check_range("edgeThreshold",     self.edge_threshold,    &EDGE_THRESHOLD_RANGE)?;
        check_range("headTrackingDeadZone", self.head_tracking_dead_zone, &(0.0..=0.7))?;

        for (name, v) in [
            ("pinchThreshold",           self.pinch_threshold),
            ("headTrackingSensitivity",  self.head_tracking_sensitivity),
            ("boundaryPushBackStrength", self.boundary_push_back_strength),
            ("zoomScale",                self.zoom_scale),
            ("steeringGain",             self.steering_gain),
            ("maxSteeringAngle",         self.max_steering_angle),
            ("rotationRate",             self.rotation_rate),
            ("steeringRotationRate",     self.steering_rotation_rate),
            ("fovRate",                  self.fov_rate),
            ("speedResponse",            self.speed_response),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::NotPositive { key: name, value: v });
            }
        }

        if !(self.grab_velocity_multiplier >= 0.0) {
            return Err(ConfigError::WrongSign { key: "grabVelocityMultiplier", value: self.grab_velocity_multiplier });
        }
        if !(self.victory_velocity_multiplier <= 0.0) {
            return Err(ConfigError::WrongSign { key: "victoryVelocityMultiplier", value: self.victory_velocity_multiplier });
        }
        if !(0.0 <= self.zoom_min_delta && self.zoom_min_delta < self.zoom_max_delta) {
            return Err(ConfigError::BadBand { low: "zoomMinDelta", high: "zoomMaxDelta" });
        }
        if !(0.0 < self.fov_min && self.fov_min <= self.initial_fov && self.initial_fov <= self.fov_max && self.fov_max < 180.0) {
            return Err(ConfigError::BadBand { low: "fovMin", high: "fovMax" });
        }
        Ok(())
    }

    /// Nudge the fly speed, staying inside its range.
    pub fn adjust_fly_speed(&mut self, step: f32) {
        self.fly_speed = (self.fly_speed + step).clamp(*FLY_SPEED_RANGE.start(), *FLY_SPEED_RANGE.end());
    }

    /// Largest travel speed any gesture can request, world units per second.
    pub fn max_speed(&self) -> f32 {
        self.fly_speed * self.grab_velocity_multiplier.max(-self.victory_velocity_multiplier)
    }

    /// Rotation smoothing rate for the current steering mode.
    pub fn active_rotation_rate(&self) -> f32 {
        if self.enable_head_tracking { self.steering_rotation_rate } else { self.rotation_rate }
    }
}

fn check_range(key: &'static str, value: f32, range: &RangeInclusive<f32>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { key, value, min: *range.start(), max: *range.end() })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
