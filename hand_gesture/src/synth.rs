//! Synthetic hand poses.
//!
//! Builds plausible 21-point landmark sets for each single-hand gesture so
//! the pipeline can be driven without a camera (keyboard/mouse simulation)
//! and so tests have realistic input.  The hand points "up" the image
//! (toward smaller y) with the wrist at the given position.

use crate::gesture::Gesture;
use crate::landmark::*;

/// A pose the synthesizer can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandPose {
    OpenPalm,
    Fist,
    Victory,
    Point,
    Pinch,
    /// Three fingers up, pinky down: matches no named gesture.
    Relaxed,
}

impl HandPose {
    pub const ALL: [HandPose; 6] = [
        HandPose::OpenPalm, HandPose::Fist, HandPose::Victory,
        HandPose::Point, HandPose::Pinch, HandPose::Relaxed,
    ];

    /// The gesture the classifier reports for this pose.
    pub fn expected_gesture(self) -> Gesture {
        match self {
            HandPose::OpenPalm => Gesture::PalmOpen,
            HandPose::Fist     => Gesture::Grab,
            HandPose::Victory  => Gesture::Victory,
            HandPose::Point    => Gesture::Point,
            HandPose::Pinch    => Gesture::Pinch,
            HandPose::Relaxed  => Gesture::Idle,
        }
    }

    /// Extension flags for index, middle, ring, pinky.
    fn fingers(self) -> [bool; 4] {
        match self {
            HandPose::OpenPalm | HandPose::Pinch => [true,  true,  true,  true],
            HandPose::Fist                       => [false, false, false, false],
            HandPose::Victory                    => [true,  true,  false, false],
            HandPose::Point                      => [true,  false, false, false],
            HandPose::Relaxed                    => [true,  true,  true,  false],
        }
    }
}

// Finger bases relative to the wrist, in hand-scale units, with the ray
// each finger extends along.  Index → pinky.
const FINGER_BASES: [((f32, f32), (f32, f32)); 4] = [
    ((-0.15, -0.45), (-0.10, -1.0)),
    ((-0.02, -0.48), ( 0.00, -1.0)),
    (( 0.10, -0.45), ( 0.10, -1.0)),
    (( 0.20, -0.38), ( 0.20, -1.0)),
];

const FINGER_MCP: [usize; 4] = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// Build a right-hand-shaped landmark set.
///
/// `wrist` is the normalized wrist position and `scale` the wrist-to-
/// fingertip span in normalized units (≈0.25 for a hand at arm's length
/// on a 4:3 webcam).
pub fn synthesize(pose: HandPose, wrist: (f32, f32), scale: f32) -> HandLandmarks {
    build(pose, wrist, scale, 1.0)
}

/// Same as [`synthesize`] with the hand mirrored left↔right.
pub fn synthesize_mirrored(pose: HandPose, wrist: (f32, f32), scale: f32) -> HandLandmarks {
    build(pose, wrist, scale, -1.0)
}

fn build(pose: HandPose, wrist: (f32, f32), scale: f32, flip: f32) -> HandLandmarks {
    let place = |(ox, oy): (f32, f32)| {
        Landmark::with_depth(wrist.0 + ox * flip * scale, wrist.1 + oy * scale, 0.0)
    };
    let mut pts = vec![place((0.0, 0.0)); LANDMARK_COUNT];

    let ext = pose.fingers();
    let mut index_tip = (0.0, 0.0);
    for (i, &(base, ray)) in FINGER_BASES.iter().enumerate() {
        let len = ray.0.hypot(ray.1);
        let d = (ray.0 / len, ray.1 / len);
        let at = |t: f32| (base.0 + d.0 * t, base.1 + d.1 * t);
        let (pip, dip, tip) = if ext[i] {
            (at(0.15), at(0.27), at(0.37))
        } else {
            (at(0.12), at(0.05), at(-0.05))
        };
        let mcp = FINGER_MCP[i];
        pts[mcp]     = place(base);
        pts[mcp + 1] = place(pip);
        pts[mcp + 2] = place(dip);
        pts[mcp + 3] = place(tip);
        if i == 0 {
            index_tip = tip;
        }
    }

    // Thumb: out to the side, or closed onto the index tip for a pinch.
    let thumb_tip = match pose {
        HandPose::Pinch    => index_tip,
        HandPose::OpenPalm => (-0.42, -0.35),
        _                  => (-0.35, -0.15),
    };
    pts[THUMB_CMC] = place((-0.12, -0.08));
    pts[THUMB_MCP] = place((-0.22, -0.15));
    pts[THUMB_IP]  = place(((-0.22 + thumb_tip.0) / 2.0, (-0.15 + thumb_tip.1) / 2.0));
    pts[THUMB_TIP] = place(thumb_tip);

    HandLandmarks::from_points(pts)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{classify, DEFAULT_PINCH_THRESHOLD};

    #[test]
    fn every_pose_classifies_as_expected() {
        for pose in HandPose::ALL {
            for &wrist in &[(0.5, 0.7), (0.3, 0.8), (0.7, 0.6)] {
                for &scale in &[0.2, 0.25, 0.35] {
                    let h = synthesize(pose, wrist, scale);
                    assert!(h.is_complete());
                    assert_eq!(
                        classify(&h, DEFAULT_PINCH_THRESHOLD),
                        pose.expected_gesture(),
                        "{:?} at {:?} scale {}", pose, wrist, scale
                    );
                }
            }
        }
    }

    #[test]
    fn mirrored_pose_keeps_gesture() {
        for pose in HandPose::ALL {
            let h = synthesize_mirrored(pose, (0.4, 0.7), 0.25);
            assert_eq!(classify(&h, DEFAULT_PINCH_THRESHOLD), pose.expected_gesture());
        }
    }

    #[test]
    fn wrist_is_anchor() {
        let h = synthesize(HandPose::Fist, (0.42, 0.61), 0.25);
        assert_eq!(h.anchor(), Some((0.42, 0.61)));
    }
}
