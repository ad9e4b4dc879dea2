//! The point cloud being flown through.
//!
//! Either generated (a seeded spherical shell of coloured stars) or loaded
//! from JSON:
//!
//! ```text
//! [{"x": 12.5, "y": -40.0, "z": 88.1, "color": "#00E5FF", "size": 12, "title": "Node 3"}, …]
//! ```

use std::f32::consts::TAU;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::info;

use flight_core::Vec3;

use crate::GalaxyError;

pub const DEFAULT_POINT_COUNT: usize = 488;
pub const DEFAULT_SEED:        u64   = 42;

/// Idle spin about the vertical axis, radians per second.
pub const SPIN_RATE: f32 = 0.05;

const SHELL_INNER: f32 = 90.0;
const SHELL_DEPTH: f32 = 60.0;
const SIZES: [f32; 3] = [8.0, 12.0, 16.0];
const DEFAULT_SIZE: f32 = 12.0;

pub const PALETTE: [u32; 8] = [
    0xFF1744, 0x00E5FF, 0xFFEA00, 0x00E676,
    0xD500F9, 0xFF6D00, 0x2979FF, 0xFF4081,
];

#[derive(Clone, Debug, PartialEq)]
pub struct GalaxyPoint {
    pub position: Vec3,
    /// `0xRRGGBB`.
    pub color:    u32,
    pub size:     f32,
    pub title:    Option<String>,
}

/// On-disk form of one point.
#[derive(Deserialize)]
struct RawPoint {
    x:     f32,
    y:     f32,
    z:     f32,
    color: String,
    #[serde(default)]
    size:  Option<f32>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Galaxy {
    points: Vec<GalaxyPoint>,
    /// Accumulated idle spin, radians in `0..TAU`.
    spin:   f32,
}

impl Galaxy {
    pub fn new(points: Vec<GalaxyPoint>) -> Self {
        Galaxy { points, spin: 0.0 }
    }

    /// Scatter `count` points through a shell 90–150 units from the origin,
    /// uniformly over direction.  Same seed, same galaxy.
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..count)
            .map(|i| {
                let radius = SHELL_INNER + rng.gen::<f32>() * SHELL_DEPTH;
                let phi    = (2.0 * rng.gen::<f32>() - 1.0).acos();
                let theta  = rng.gen::<f32>() * TAU;
                GalaxyPoint {
                    position: Vec3::new(
                        radius * theta.cos() * phi.sin(),
                        radius * theta.sin() * phi.sin(),
                        radius * phi.cos(),
                    ),
                    color: PALETTE[rng.gen_range(0..PALETTE.len())],
                    size:  SIZES[rng.gen_range(0..SIZES.len())],
                    title: Some(format!("Star {}", i + 1)),
                }
            })
            .collect();
        Galaxy::new(points)
    }

    pub fn from_json_str(s: &str) -> Result<Self, GalaxyError> {
        let raw: Vec<RawPoint> = serde_json::from_str(s)?;
        if raw.is_empty() {
            return Err(GalaxyError::Empty);
        }
        let points = raw
            .into_iter()
            .enumerate()
            .map(|(index, p)| {
                let position = Vec3::new(p.x, p.y, p.z);
                if !position.is_finite() {
                    return Err(GalaxyError::BadPosition { index });
                }
                let color = parse_hex_color(&p.color)
                    .ok_or(GalaxyError::BadColor { index, value: p.color.clone() })?;
                Ok(GalaxyPoint { position, color, size: p.size.unwrap_or(DEFAULT_SIZE), title: p.title })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Galaxy::new(points))
    }

    pub fn load(path: &Path) -> Result<Self, GalaxyError> {
        let text = fs::read_to_string(path)
            .map_err(|source| GalaxyError::Io { path: path.to_path_buf(), source })?;
        let galaxy = Galaxy::from_json_str(&text)?;
        info!(path = %path.display(), points = galaxy.len(), "galaxy loaded");
        Ok(galaxy)
    }

    pub fn points(&self) -> &[GalaxyPoint] { &self.points }
    pub fn len(&self)      -> usize        { self.points.len() }
    pub fn is_empty(&self) -> bool         { self.points.is_empty() }
    pub fn spin(&self)     -> f32          { self.spin }

    /// Advance the idle spin.
    pub fn tick(&mut self, delta: f32) {
        if delta.is_finite() && delta > 0.0 {
            self.spin = (self.spin + SPIN_RATE * delta).rem_euclid(TAU);
        }
    }

    /// Distance of the farthest point from the origin.
    pub fn extent(&self) -> f32 {
        self.points.iter().map(|p| p.position.length()).fold(0.0, f32::max)
    }
}

/// `"#RRGGBB"` (or `"RRGGBB"`) to `0xRRGGBB`.
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Rotate a point by the galaxy's own rotation: about Y first, then X.
pub fn rotate_xy(v: Vec3, rx: f32, ry: f32) -> Vec3 {
    let (sy, cy) = ry.sin_cos();
    let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
    let (sx, cx) = rx.sin_cos();
    Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
