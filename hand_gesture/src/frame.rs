//! Hand-frame aggregation.
//!
//! Turns one detector callback (0–2 hands, each with a handedness label)
//! into a [`SceneSample`] with named left/right slots, classifying each hand
//! on the way.  Also projects that sample into the shapes presentation
//! layers consume: [`HandsView`] for cursors and [`DebugStatus`] for the
//! status overlay.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gesture::{Gesture, GestureClassifier};
use crate::landmark::HandLandmarks;
use crate::GestureError;

// ════════════════════════════════════════════════════════════════════════════
// Detector input
// ════════════════════════════════════════════════════════════════════════════

/// Which hand, from the user's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Handedness::Left  => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            l if l.eq_ignore_ascii_case("left")  => Ok(Handedness::Left),
            r if r.eq_ignore_ascii_case("right") => Ok(Handedness::Right),
            other => Err(GestureError::UnknownHandedness(other.to_string())),
        }
    }
}

/// Handedness entry as the detector reports it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandednessLabel {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
}

impl HandednessLabel {
    pub fn new(label: &str) -> Self {
        HandednessLabel { label: label.to_string(), score: None }
    }
}

/// One detector callback: landmark sets with a parallel handedness array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorResult {
    #[serde(default)]
    pub multi_hand_landmarks: Vec<HandLandmarks>,
    #[serde(default)]
    pub multi_handedness: Vec<HandednessLabel>,
}

impl DetectorResult {
    /// A callback in which nothing was detected.
    pub fn empty() -> Self {
        DetectorResult::default()
    }

    /// Append a hand with the detector's raw label.
    pub fn with_hand(mut self, label: &str, landmarks: HandLandmarks) -> Self {
        self.multi_hand_landmarks.push(landmarks);
        self.multi_handedness.push(HandednessLabel::new(label));
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SceneSample
// ════════════════════════════════════════════════════════════════════════════

/// Both hand slots of one callback, classified.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneSample {
    pub left:          Option<HandLandmarks>,
    pub right:         Option<HandLandmarks>,
    pub left_gesture:  Gesture,
    pub right_gesture: Gesture,
}

impl SceneSample {
    /// No hands.
    pub fn empty() -> Self {
        SceneSample::default()
    }

    pub fn hand_count(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }

    pub fn both(&self) -> Option<(&HandLandmarks, &HandLandmarks)> {
        Some((self.left.as_ref()?, self.right.as_ref()?))
    }

    /// The only hand present, with its side and gesture.
    pub fn single_hand(&self) -> Option<(Handedness, &HandLandmarks, Gesture)> {
        match (&self.left, &self.right) {
            (Some(l), None) => Some((Handedness::Left, l, self.left_gesture)),
            (None, Some(r)) => Some((Handedness::Right, r, self.right_gesture)),
            _ => None,
        }
    }

    pub fn hand(&self, side: Handedness) -> Option<&HandLandmarks> {
        match side {
            Handedness::Left  => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }

    pub fn gesture(&self, side: Handedness) -> Gesture {
        match side {
            Handedness::Left  => self.left_gesture,
            Handedness::Right => self.right_gesture,
        }
    }

    fn slot_mut(&mut self, side: Handedness) -> (&mut Option<HandLandmarks>, &mut Gesture) {
        match side {
            Handedness::Left  => (&mut self.left,  &mut self.left_gesture),
            Handedness::Right => (&mut self.right, &mut self.right_gesture),
        }
    }

    /// Cursor projection for presentation layers.
    pub fn hands_view(&self) -> HandsView {
        HandsView {
            left:  HandCursor::project(self.left.as_ref(),  self.left_gesture),
            right: HandCursor::project(self.right.as_ref(), self.right_gesture),
        }
    }

    /// Status projection.  `gesture` is the gesture driving the camera,
    /// which in two-hand mode is not either hand's own classification.
    pub fn debug_status(&self, status: &str, gesture: Gesture) -> DebugStatus {
        DebugStatus {
            status:     status.to_string(),
            left_hand:  self.left.clone(),
            right_hand: self.right.clone(),
            gesture,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameAggregator
// ════════════════════════════════════════════════════════════════════════════

/// Maps detector output into a [`SceneSample`].
#[derive(Clone, Copy, Debug)]
pub struct FrameAggregator {
    pub classifier: GestureClassifier,
    /// Front-camera detectors label hands as they appear in the unmirrored
    /// image, so the detector's "Left" is the user's right hand.
    pub mirrored_labels: bool,
}

impl Default for FrameAggregator {
    fn default() -> Self {
        FrameAggregator { classifier: GestureClassifier::default(), mirrored_labels: true }
    }
}

impl FrameAggregator {
    pub fn new(classifier: GestureClassifier) -> Self {
        FrameAggregator { classifier, ..FrameAggregator::default() }
    }

    /// The user-side hand a detector label refers to.
    pub fn resolve_label(&self, label: &str) -> Result<Handedness, GestureError> {
        let side: Handedness = label.parse()?;
        Ok(if self.mirrored_labels { side.opposite() } else { side })
    }

    pub fn aggregate(&self, result: &DetectorResult) -> SceneSample {
        let mut sample = SceneSample::empty();

        for (i, landmarks) in result.multi_hand_landmarks.iter().enumerate() {
            let Some(entry) = result.multi_handedness.get(i) else {
                debug!(index = i, "hand without handedness entry dropped");
                continue;
            };
            let side = match self.resolve_label(&entry.label) {
                Ok(side) => side,
                Err(e) => {
                    debug!(index = i, "hand dropped: {}", e);
                    continue;
                }
            };

            // Detectors sometimes give both hands the same label; the second
            // takes whichever slot is still free.
            let side = if sample.hand(side).is_none() {
                side
            } else if sample.hand(side.opposite()).is_none() {
                debug!(index = i, label = %entry.label, "duplicate handedness, using other slot");
                side.opposite()
            } else {
                debug!(index = i, "more than two hands, extra dropped");
                continue;
            };

            let gesture = self.classifier.classify(landmarks);
            let (slot, slot_gesture) = sample.slot_mut(side);
            *slot = Some(landmarks.clone());
            *slot_gesture = gesture;
        }

        sample
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Presentation projections
// ════════════════════════════════════════════════════════════════════════════

/// Cursor state for one hand.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HandCursor {
    pub visible:   bool,
    /// Normalized position (wrist).  `(0.5, 0.5)` when not visible.
    pub position:  (f32, f32),
    pub gesture:   Gesture,
    pub landmarks: Option<HandLandmarks>,
}

impl HandCursor {
    fn project(hand: Option<&HandLandmarks>, gesture: Gesture) -> Self {
        match hand {
            Some(h) => HandCursor {
                visible:   true,
                position:  h.anchor().unwrap_or((0.5, 0.5)),
                gesture,
                landmarks: Some(h.clone()),
            },
            None => HandCursor { position: (0.5, 0.5), ..HandCursor::default() },
        }
    }
}

/// Both cursors.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HandsView {
    pub left:  HandCursor,
    pub right: HandCursor,
}

/// Status overlay data.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugStatus {
    pub status:     String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_hand:  Option<HandLandmarks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_hand: Option<HandLandmarks>,
    pub gesture:    Gesture,
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{synthesize, HandPose};

    fn hand(pose: HandPose, x: f32) -> HandLandmarks {
        synthesize(pose, (x, 0.7), 0.25)
    }

    #[test]
    fn empty_result_is_empty_sample() {
        let s = FrameAggregator::default().aggregate(&DetectorResult::empty());
        assert_eq!(s, SceneSample::empty());
        assert_eq!(s.hand_count(), 0);
    }

    #[test]
    fn detector_left_is_user_right() {
        let r = DetectorResult::empty().with_hand("Left", hand(HandPose::Fist, 0.3));
        let s = FrameAggregator::default().aggregate(&r);
        assert!(s.left.is_none());
        assert!(s.right.is_some());
        assert_eq!(s.right_gesture, Gesture::Grab);
        assert_eq!(s.left_gesture, Gesture::Idle);
    }

    #[test]
    fn unmirrored_labels_pass_through() {
        let agg = FrameAggregator { mirrored_labels: false, ..FrameAggregator::default() };
        let r = DetectorResult::empty().with_hand("Left", hand(HandPose::Victory, 0.3));
        let s = agg.aggregate(&r);
        assert_eq!(s.left_gesture, Gesture::Victory);
        assert!(s.right.is_none());
    }

    #[test]
    fn two_hands_fill_both_slots() {
        let r = DetectorResult::empty()
            .with_hand("Right", hand(HandPose::OpenPalm, 0.7))
            .with_hand("Left",  hand(HandPose::Point, 0.3));
        let s = FrameAggregator::default().aggregate(&r);
        assert_eq!(s.hand_count(), 2);
        assert_eq!(s.left_gesture,  Gesture::PalmOpen);
        assert_eq!(s.right_gesture, Gesture::Point);
        assert!(s.single_hand().is_none());
        assert!(s.both().is_some());
    }

    #[test]
    fn duplicate_label_takes_free_slot() {
        let r = DetectorResult::empty()
            .with_hand("Left", hand(HandPose::Fist, 0.3))
            .with_hand("Left", hand(HandPose::OpenPalm, 0.7));
        let s = FrameAggregator::default().aggregate(&r);
        assert_eq!(s.right_gesture, Gesture::Grab);
        assert_eq!(s.left_gesture,  Gesture::PalmOpen);
    }

    #[test]
    fn missing_or_unknown_label_drops_hand() {
        let mut r = DetectorResult::empty().with_hand("Sideways", hand(HandPose::Fist, 0.3));
        r.multi_hand_landmarks.push(hand(HandPose::Fist, 0.6));
        let s = FrameAggregator::default().aggregate(&r);
        assert_eq!(s.hand_count(), 0);
    }

    #[test]
    fn label_parsing_is_case_insensitive() {
        assert_eq!(" right ".parse::<Handedness>().unwrap(), Handedness::Right);
        assert!("up".parse::<Handedness>().is_err());
    }

    #[test]
    fn hands_view_projects_sample() {
        let r = DetectorResult::empty().with_hand("Right", hand(HandPose::Victory, 0.35));
        let s = FrameAggregator::default().aggregate(&r);
        let v = s.hands_view();
        assert!(v.left.visible);
        assert_eq!(v.left.position, (0.35, 0.7));
        assert_eq!(v.left.gesture, Gesture::Victory);
        assert!(v.left.landmarks.is_some());
        assert!(!v.right.visible);
        assert_eq!(v.right.position, (0.5, 0.5));
    }

    #[test]
    fn parses_detector_json() {
        let pts: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, 0.3 + i as f32 * 0.01))
            .collect();
        let json = format!(
            r#"{{"multiHandLandmarks":[[{}]],"multiHandedness":[{{"label":"Right","score":0.97}}]}}"#,
            pts.join(",")
        );
        let r: DetectorResult = serde_json::from_str(&json).unwrap();
        assert_eq!(r.multi_hand_landmarks[0].len(), 21);
        assert_eq!(r.multi_handedness[0].score, Some(0.97));
        let s = FrameAggregator::default().aggregate(&r);
        assert!(s.left.is_some());
    }

    #[test]
    fn debug_status_serializes_camel_case() {
        let s = SceneSample::empty().debug_status("Searching for hands...", Gesture::Idle);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(r#""status":"Searching for hands...""#));
        assert!(json.contains(r#""gesture":"IDLE""#));
        assert!(!json.contains("leftHand"));
    }
}
