//! Per-tick camera integration.
//!
//! Pulls the camera toward the resolver's targets once per render tick.
//! Knows nothing about gestures.

use tracing::debug;

use crate::camera::{Camera, Rotation};
use crate::config::FlightConfig;
use crate::resolver::{MotionTargets, RotationAccumulator};

/// Below this the FOV snaps onto its target instead of creeping.
const FOV_SNAP: f32 = 1e-3;
/// Same for pitch and yaw, radians.
const ROTATION_SNAP: f32 = 1e-5;

/// Fraction of the remaining gap to close this tick.  Never more than
/// the whole gap, however long the frame was.
fn smoothing(rate: f32, delta: f32) -> f32 {
    (rate * delta).min(1.0)
}

fn approach(current: f32, target: f32, k: f32, snap: f32) -> f32 {
    if (target - current).abs() < snap {
        target
    } else {
        current + (target - current) * k
    }
}

/// What one tick did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickReport {
    /// The renderer must rebuild its projection.
    pub fov_changed: bool,
    /// The camera started this tick outside the boundary.
    pub bouncing:    bool,
    /// Current travel speed, world units per second (negative = reverse).
    pub speed:       f32,
}

#[derive(Clone, Debug, Default)]
pub struct CameraIntegrator {
    speed:           f32,
    bouncing:        bool,
    galaxy_rotation: RotationAccumulator,
}

impl CameraIntegrator {
    pub fn new() -> Self {
        CameraIntegrator::default()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Smoothed point-cloud rotation for the renderer.
    pub fn galaxy_rotation(&self) -> RotationAccumulator {
        self.galaxy_rotation
    }

    /// Drop travel momentum, e.g. when gesture mode is switched off.
    pub fn halt(&mut self) {
        self.speed = 0.0;
    }

    pub fn tick<C: Camera + ?Sized>(
        &mut self,
        targets: &MotionTargets,
        accumulator: &RotationAccumulator,
        camera: &mut C,
        cfg: &FlightConfig,
        delta: f32,
    ) -> TickReport {
        if !(delta.is_finite() && delta > 0.0) {
            return TickReport { fov_changed: false, bouncing: self.bouncing, speed: self.speed };
        }

        // ── orientation ──────────────────────────────────────────────────
        let k = smoothing(cfg.active_rotation_rate(), delta);
        let rot = camera.rotation();
        let next = Rotation {
            pitch: approach(rot.pitch, targets.rotation.pitch, k, ROTATION_SNAP),
            yaw:   approach(rot.yaw,   targets.rotation.yaw,   k, ROTATION_SNAP),
        };
        if next != rot {
            camera.set_rotation(next);
        }

        // ── field of view ────────────────────────────────────────────────
        let fov = camera.fov();
        let fov_target = targets.fov.clamp(cfg.fov_min, cfg.fov_max);
        let fov_changed = fov != fov_target;
        if fov_changed {
            camera.set_fov(approach(fov, fov_target, smoothing(cfg.fov_rate, delta), FOV_SNAP));
            camera.projection_changed();
        }

        // ── travel ───────────────────────────────────────────────────────
        let position = camera.position();
        let distance = position.length();
        let bouncing = distance > cfg.boundary_distance;
        if bouncing != self.bouncing {
            debug!(distance, boundary = cfg.boundary_distance, bouncing, "boundary state changed");
            self.bouncing = bouncing;
        }

        let forward = camera.rotation().forward();
        let mut speed_target = cfg.fly_speed * targets.velocity;
        if bouncing {
            // Whatever was asked, travel back toward the origin.
            let outward = forward.dot(position).signum();
            speed_target = -speed_target.abs() * outward;
        }

        if speed_target == 0.0 {
            self.speed = 0.0;
        } else {
            self.speed += (speed_target - self.speed) * smoothing(cfg.speed_response, delta);
        }

        if self.speed != 0.0 {
            let step = self.speed * delta;
            let outward_step = bouncing && (position + forward * step).length() >= distance;
            if !outward_step {
                camera.translate_local_forward(step);
            }
        }

        if bouncing {
            // Exponential contraction: strictly shrinks, never reaches the origin.
            let pull = (-cfg.boundary_push_back_strength * delta).exp();
            if pull > 0.0 {
                camera.set_position(camera.position() * pull);
            }
        }

        // ── point-cloud rotation ─────────────────────────────────────────
        let g = smoothing(cfg.rotation_rate, delta);
        self.galaxy_rotation.x = approach(self.galaxy_rotation.x, accumulator.x, g, ROTATION_SNAP);
        self.galaxy_rotation.y = approach(self.galaxy_rotation.y, accumulator.y, g, ROTATION_SNAP);

        TickReport { fov_changed, bouncing, speed: self.speed }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
