//! Camera model.
//!
//! The renderer is external; the integrator only needs the [`Camera`]
//! surface.  [`CameraPose`] is the plain-data implementation used by the
//! viewer and by tests.
//!
//! Conventions: the camera looks down −Z when pitch and yaw are zero,
//! yaw (about world Y) is applied before pitch (about camera X) so the
//! horizon stays level, and positive yaw turns left.

use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Vec3
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn dot(self, o: Vec3) -> f32 {
        self.x * o.x + self.y * o.y + self.z * o.z
    }

    pub fn cross(self, o: Vec3) -> Vec3 {
        Vec3::new(
            self.y * o.z - self.z * o.y,
            self.z * o.x - self.x * o.z,
            self.x * o.y - self.y * o.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(a: [f32; 3]) -> Self { Vec3::new(a[0], a[1], a[2]) }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 { Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z) }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, o: Vec3) { *self = *self + o; }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 { Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z) }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 { Vec3::new(self.x * s, self.y * s, self.z * s) }
}

// ════════════════════════════════════════════════════════════════════════════
// Rotation
// ════════════════════════════════════════════════════════════════════════════

/// Camera orientation in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub pitch: f32,
    pub yaw:   f32,
}

impl Rotation {
    pub const LEVEL: Rotation = Rotation { pitch: 0.0, yaw: 0.0 };

    pub fn new(pitch: f32, yaw: f32) -> Self {
        Rotation { pitch, yaw }
    }

    /// Orientation that points the camera at `target`.  Degenerate when
    /// the two coincide, in which case the camera is levelled.
    pub fn looking_at(from: Vec3, target: Vec3) -> Self {
        let d = target - from;
        let len = d.length();
        if !(len > f32::EPSILON) {
            return Rotation::LEVEL;
        }
        Rotation {
            pitch: (d.y / len).clamp(-1.0, 1.0).asin(),
            yaw:   (-d.x).atan2(-d.z),
        }
    }

    /// Unit vector the camera looks along.
    pub fn forward(self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }

    /// Camera-space right (+X) in world space.  Stays horizontal.
    pub fn right(self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(cy, 0.0, -sy)
    }

    /// Camera-space up (+Y) in world space.
    pub fn up(self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        let (sy, cy) = self.yaw.sin_cos();
        Vec3::new(sy * sp, cp, cy * sp)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Camera trait
// ════════════════════════════════════════════════════════════════════════════

/// What the integrator needs from a camera.
pub trait Camera {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, p: Vec3);
    fn rotation(&self) -> Rotation;
    fn set_rotation(&mut self, r: Rotation);
    fn fov(&self) -> f32;
    fn set_fov(&mut self, fov: f32);

    /// Move along the camera's own look direction.
    fn translate_local_forward(&mut self, distance: f32) {
        let p = self.position() + self.rotation().forward() * distance;
        self.set_position(p);
    }

    /// Called after the FOV changed so the renderer can rebuild its
    /// projection.
    fn projection_changed(&mut self) {}
}

// ════════════════════════════════════════════════════════════════════════════
// CameraPose
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Rotation,
    /// Vertical field of view, degrees.
    pub fov:      f32,
    /// Bumped whenever the projection must be rebuilt.
    #[serde(skip)]
    pub projection_version: u64,
}

impl CameraPose {
    pub fn new(position: Vec3, fov: f32) -> Self {
        CameraPose { position, rotation: Rotation::LEVEL, fov, projection_version: 0 }
    }

    pub fn distance_from_origin(&self) -> f32 {
        self.position.length()
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        CameraPose::new(Vec3::new(0.0, 0.0, 200.0), 60.0)
    }
}

impl Camera for CameraPose {
    fn position(&self) -> Vec3           { self.position }
    fn set_position(&mut self, p: Vec3)  { self.position = p; }
    fn rotation(&self) -> Rotation       { self.rotation }
    fn set_rotation(&mut self, r: Rotation) { self.rotation = r; }
    fn fov(&self) -> f32                 { self.fov }
    fn set_fov(&mut self, fov: f32)      { self.fov = fov; }
    fn projection_changed(&mut self)     { self.projection_version += 1; }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn level_camera_looks_down_negative_z() {
        let f = Rotation::LEVEL.forward();
        assert_abs_diff_eq!(f.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn looking_at_points_forward_at_target() {
        for from in [Vec3::new(0.0, 0.0, 200.0), Vec3::new(120.0, -40.0, 30.0), Vec3::new(-5.0, 80.0, -90.0)] {
            let f = Rotation::looking_at(from, Vec3::ZERO).forward();
            let want = Vec3::ZERO - from;
            let want = want * (1.0 / want.length());
            assert_abs_diff_eq!(f.x, want.x, epsilon = 1e-5);
            assert_abs_diff_eq!(f.y, want.y, epsilon = 1e-5);
            assert_abs_diff_eq!(f.z, want.z, epsilon = 1e-5);
        }
        assert_eq!(Rotation::looking_at(Vec3::ZERO, Vec3::ZERO), Rotation::LEVEL);
    }

    #[test]
    fn positive_yaw_turns_left() {
        let f = Rotation::new(0.0, FRAC_PI_2).forward();
        assert_abs_diff_eq!(f.x, -1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn positive_pitch_looks_up() {
        let f = Rotation::new(0.3, 0.0).forward();
        assert!(f.y > 0.0);
        assert_abs_diff_eq!(f.length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn basis_is_orthonormal() {
        let r = Rotation::new(0.4, -0.7);
        let (f, rt, up) = (r.forward(), r.right(), r.up());
        assert_abs_diff_eq!(f.dot(rt), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(f.dot(up), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(rt.dot(up), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(up.length(), 1.0, epsilon = 1e-5);
        // Right-handed: right × up points behind the camera.
        let back = rt.cross(up);
        assert_abs_diff_eq!(back.dot(f), -1.0, epsilon = 1e-5);
    }

    #[test]
    fn translate_forward_moves_along_look() {
        let mut cam = CameraPose::default();
        cam.translate_local_forward(50.0);
        assert_abs_diff_eq!(cam.position.z, 150.0, epsilon = 1e-4);
        assert_eq!(cam.projection_version, 0);
        cam.projection_changed();
        assert_eq!(cam.projection_version, 1);
    }
}
