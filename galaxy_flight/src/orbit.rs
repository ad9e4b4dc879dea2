//! Mouse orbit camera, used while gesture mode is off.
//!
//! Spherical coordinates around the origin with damped rotation: each
//! update applies a fraction of the pending drag and decays the rest.

use std::f32::consts::{PI, TAU};

use flight_core::{CameraPose, Rotation, Vec3};

pub const DAMPING:      f32 = 0.05;
pub const ROTATE_SPEED: f32 = 0.5;
pub const ZOOM_SPEED:   f32 = 0.8;
pub const MIN_DISTANCE: f32 = 50.0;
pub const MAX_DISTANCE: f32 = 500.0;

/// Keeps the camera off the poles.
const POLAR_EPS: f32 = 1e-3;

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Around +Y, 0 on +Z.
    pub azimuth:  f32,
    /// From +Y.
    pub polar:    f32,
    pub distance: f32,
    delta_azimuth: f32,
    delta_polar:   f32,
    pending_scale: f32,
}

impl OrbitCamera {
    /// Orbit through the pose's current position.
    pub fn from_pose(pose: &CameraPose) -> Self {
        let p = pose.position;
        let r = p.length();
        let (azimuth, polar) = if r > f32::EPSILON {
            (p.x.atan2(p.z), (p.y / r).clamp(-1.0, 1.0).acos())
        } else {
            (0.0, PI / 2.0)
        };
        OrbitCamera {
            azimuth,
            polar: polar.clamp(POLAR_EPS, PI - POLAR_EPS),
            distance: r.clamp(MIN_DISTANCE, MAX_DISTANCE),
            delta_azimuth: 0.0,
            delta_polar:   0.0,
            pending_scale: 1.0,
        }
    }

    /// Drag by `(dx, dy)` pixels in a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.delta_azimuth -= TAU * dx / height * ROTATE_SPEED;
        self.delta_polar   -= TAU * dy / height * ROTATE_SPEED;
    }

    /// Scroll by `steps` notches; positive zooms in.
    pub fn zoom(&mut self, steps: f32) {
        self.pending_scale *= 0.95f32.powf(ZOOM_SPEED * steps);
    }

    pub fn update(&mut self) {
        self.azimuth = (self.azimuth + self.delta_azimuth * DAMPING).rem_euclid(TAU);
        self.polar = (self.polar + self.delta_polar * DAMPING).clamp(POLAR_EPS, PI - POLAR_EPS);
        self.distance = (self.distance * self.pending_scale).clamp(MIN_DISTANCE, MAX_DISTANCE);

        self.delta_azimuth *= 1.0 - DAMPING;
        self.delta_polar   *= 1.0 - DAMPING;
        self.pending_scale = 1.0;
    }

    pub fn position(&self) -> Vec3 {
        let (sp, cp) = self.polar.sin_cos();
        let (sa, ca) = self.azimuth.sin_cos();
        Vec3::new(self.distance * sp * sa, self.distance * cp, self.distance * sp * ca)
    }

    /// Place the pose on the orbit, looking at the origin.
    pub fn apply(&self, pose: &mut CameraPose) {
        pose.position = self.position();
        pose.rotation = Rotation::looking_at(pose.position, Vec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn round_trips_the_start_pose() {
        let pose = CameraPose::default();
        let orbit = OrbitCamera::from_pose(&pose);
        assert_abs_diff_eq!(orbit.distance, 200.0, epsilon = 1e-4);
        let mut out = pose;
        orbit.apply(&mut out);
        assert_abs_diff_eq!(out.position.z, 200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(out.rotation.yaw, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(out.rotation.pitch, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn drag_is_damped() {
        let mut orbit = OrbitCamera::from_pose(&CameraPose::default());
        orbit.rotate(100.0, 0.0, 600.0);
        let total = -TAU * 100.0 / 600.0 * ROTATE_SPEED;

        orbit.update();
        let first = orbit.azimuth;
        assert_abs_diff_eq!(first, (total * DAMPING).rem_euclid(TAU), epsilon = 1e-5);

        for _ in 0..500 {
            orbit.update();
        }
        assert_abs_diff_eq!(orbit.azimuth, total.rem_euclid(TAU), epsilon = 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut orbit = OrbitCamera::from_pose(&CameraPose::default());
        orbit.zoom(1.0);
        orbit.update();
        assert!(orbit.distance < 200.0);

        orbit.zoom(1000.0);
        orbit.update();
        assert_eq!(orbit.distance, MIN_DISTANCE);
        orbit.zoom(-1000.0);
        orbit.update();
        assert_eq!(orbit.distance, MAX_DISTANCE);
    }

    #[test]
    fn never_reaches_a_pole() {
        let mut orbit = OrbitCamera::from_pose(&CameraPose::default());
        orbit.rotate(0.0, 1e6, 600.0);
        for _ in 0..100 {
            orbit.update();
        }
        assert!(orbit.polar > 0.0 && orbit.polar < PI);
        let mut pose = CameraPose::default();
        orbit.apply(&mut pose);
        assert!(pose.rotation.pitch.is_finite());
    }

    #[test]
    fn far_pose_is_pulled_into_range() {
        let pose = CameraPose::new(Vec3::new(0.0, 900.0, 0.0), 60.0);
        let orbit = OrbitCamera::from_pose(&pose);
        assert_eq!(orbit.distance, MAX_DISTANCE);
        assert!(orbit.polar >= POLAR_EPS);
    }
}
