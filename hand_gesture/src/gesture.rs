//! Per-frame gesture classification.
//!
//! The classifier looks at one hand in one frame and names its pose.  It
//! keeps no history: a finger counts as extended when its tip is farther
//! from the wrist than its PIP joint, which holds at any hand size or
//! distance from the camera.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::landmark::*;
use crate::GestureError;

/// Default thumb-tip ↔ index-tip distance (normalized) that counts as a pinch.
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// A discrete hand pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gesture {
    /// No recognised pose, or no usable data.
    #[default]
    Idle,
    /// All four fingers extended.
    PalmOpen,
    /// Fist: all four fingers flexed.
    Grab,
    /// Index + middle extended, ring + pinky flexed.
    Victory,
    /// Index extended only.
    Point,
    /// Thumb tip touching index tip.
    Pinch,
    /// Two hands on screen; reported by the motion resolver, never by
    /// [`classify`].
    PinchScale,
}

impl Gesture {
    pub const ALL: [Gesture; 7] = [
        Gesture::Idle, Gesture::PalmOpen, Gesture::Grab, Gesture::Victory,
        Gesture::Point, Gesture::Pinch, Gesture::PinchScale,
    ];

    /// Wire name, as shown in status overlays.
    pub fn as_str(self) -> &'static str {
        match self {
            Gesture::Idle       => "IDLE",
            Gesture::PalmOpen   => "PALM_OPEN",
            Gesture::Grab       => "GRAB",
            Gesture::Victory    => "VICTORY",
            Gesture::Point      => "POINT",
            Gesture::Pinch      => "PINCH",
            Gesture::PinchScale => "PINCH_SCALE",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .iter()
            .copied()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| GestureError::UnknownGesture(s.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger extension
// ════════════════════════════════════════════════════════════════════════════

/// Extension state of the four non-thumb fingers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerState {
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerState {
    /// Measure finger extension.  `None` if any point involved is unusable.
    pub fn measure(hand: &HandLandmarks) -> Option<Self> {
        let wrist = hand.point(WRIST)?;
        let extended = |tip: usize, pip: usize| -> Option<bool> {
            let tip = hand.point(tip)?;
            let pip = hand.point(pip)?;
            Some(planar_distance(tip, wrist) > planar_distance(pip, wrist))
        };
        Some(FingerState {
            index:  extended(INDEX_TIP,  INDEX_PIP)?,
            middle: extended(MIDDLE_TIP, MIDDLE_PIP)?,
            ring:   extended(RING_TIP,   RING_PIP)?,
            pinky:  extended(PINKY_TIP,  PINKY_PIP)?,
        })
    }

    pub fn extended_count(&self) -> usize {
        [self.index, self.middle, self.ring, self.pinky]
            .iter()
            .filter(|&&e| e)
            .count()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier
// ════════════════════════════════════════════════════════════════════════════

/// Stateless single-hand classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureClassifier {
    pub pinch_threshold: f32,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        GestureClassifier { pinch_threshold: DEFAULT_PINCH_THRESHOLD }
    }
}

impl GestureClassifier {
    pub fn new(pinch_threshold: f32) -> Self {
        GestureClassifier { pinch_threshold }
    }

    pub fn classify(&self, hand: &HandLandmarks) -> Gesture {
        classify(hand, self.pinch_threshold)
    }
}

/// Classify one hand.  Never panics; unusable input yields [`Gesture::Idle`].
pub fn classify(hand: &HandLandmarks, pinch_threshold: f32) -> Gesture {
    if hand.len() < LANDMARK_COUNT {
        trace!(points = hand.len(), "truncated landmark set");
        return Gesture::Idle;
    }

    let Some(pinch) = hand.distance(THUMB_TIP, INDEX_TIP) else {
        trace!("pinch landmarks unusable");
        return Gesture::Idle;
    };
    if pinch < pinch_threshold {
        return Gesture::Pinch;
    }

    let Some(f) = FingerState::measure(hand) else {
        trace!("finger landmarks unusable");
        return Gesture::Idle;
    };

    match (f.index, f.middle, f.ring, f.pinky) {
        (true,  true,  true,  true)  => Gesture::PalmOpen,
        (false, false, false, false) => Gesture::Grab,
        (true,  true,  false, false) => Gesture::Victory,
        (true,  false, false, false) => Gesture::Point,
        _                            => Gesture::Idle,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
