//! Hand landmark model.
//!
//! A detected hand is a list of 21 normalized image-space points.  The index
//! of each point is fixed and semantic (0 = wrist, 4 = thumb tip, …).  Points
//! arrive fresh on every sensor callback and are never mutated afterwards.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in a complete hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Skeleton connections, used by overlays that draw the hand.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (INDEX_MCP, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (MIDDLE_MCP, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (RING_MCP, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (WRIST, PINKY_MCP),
];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point.  `x`/`y` are normalized to the camera frame (0–1,
/// origin top-left); `z` is relative depth when the detector provides it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Landmark { x, y, z: None }
    }

    pub fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z: Some(z) }
    }

    /// True when both image coordinates are usable numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Image-plane position as an `(x, y)` pair.
    pub fn xy(&self) -> (f32, f32) {
        (self.x, self.y)
    }
}

/// Distance between two landmarks in the image plane (depth ignored).
pub fn planar_distance(a: Landmark, b: Landmark) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// The landmark list for one detected hand.
///
/// Nominally 21 entries, but the type does not enforce it: detectors do
/// occasionally hand over truncated lists, and every consumer degrades
/// through [`HandLandmarks::point`] instead of indexing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks {
    points: Vec<Landmark>,
}

impl HandLandmarks {
    pub fn from_points(points: Vec<Landmark>) -> Self {
        HandLandmarks { points }
    }

    pub fn points(&self) -> &[Landmark] { &self.points }
    pub fn len(&self)     -> usize      { self.points.len() }
    pub fn is_empty(&self) -> bool      { self.points.is_empty() }

    /// True when all 21 landmarks are present and finite.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
            && self.points[..LANDMARK_COUNT].iter().all(Landmark::is_finite)
    }

    /// The landmark at `index`, or `None` if it is missing or non-finite.
    pub fn point(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied().filter(Landmark::is_finite)
    }

    /// Control position of the hand: the wrist.
    pub fn anchor(&self) -> Option<(f32, f32)> {
        self.point(WRIST).map(|p| p.xy())
    }

    /// Planar distance between two landmarks of this hand.
    pub fn distance(&self, a: usize, b: usize) -> Option<f32> {
        Some(planar_distance(self.point(a)?, self.point(b)?))
    }
}

impl From<Vec<Landmark>> for HandLandmarks {
    fn from(points: Vec<Landmark>) -> Self {
        HandLandmarks::from_points(points)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn line_hand() -> HandLandmarks {
        (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(i as f32 * 0.01, 0.5))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Landmark::with_depth(0.0, 0.0, 5.0);
        let b = Landmark::with_depth(0.3, 0.4, -5.0);
        assert_abs_diff_eq!(planar_distance(a, b), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn complete_hand() {
        let h = line_hand();
        assert!(h.is_complete());
        assert_eq!(h.anchor(), Some((0.0, 0.5)));
    }

    #[test]
    fn nan_point_is_missing() {
        let mut pts = line_hand().points().to_vec();
        pts[INDEX_TIP].y = f32::NAN;
        let h = HandLandmarks::from_points(pts);
        assert!(!h.is_complete());
        assert!(h.point(INDEX_TIP).is_none());
        assert!(h.distance(THUMB_TIP, INDEX_TIP).is_none());
        assert!(h.point(WRIST).is_some());
    }

    #[test]
    fn truncated_hand_reports_missing_points() {
        let h = HandLandmarks::from_points(vec![Landmark::new(0.5, 0.5); 5]);
        assert!(!h.is_complete());
        assert!(h.point(PINKY_TIP).is_none());
        assert!(h.point(THUMB_TIP).is_some());
    }

    #[test]
    fn deserializes_detector_shape() {
        let json = r#"[{"x":0.1,"y":0.2,"z":-0.01},{"x":0.3,"y":0.4}]"#;
        let h: HandLandmarks = serde_json::from_str(json).unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h.point(0).unwrap().z, Some(-0.01));
        assert_eq!(h.point(1).unwrap().z, None);
    }
}
