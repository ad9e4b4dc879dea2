//! # hand_gesture
//!
//! Per-frame hand gesture recognition from 21-point hand landmarks, as
//! produced by webcam hand detectors.
//!
//! ## Pipeline
//!
//! ```text
//! DetectorResult ──► FrameAggregator ──► SceneSample ──► HandsView / DebugStatus
//!                        │
//!                        └─ GestureClassifier (one hand, one frame)
//! ```
//!
//! ## Gestures
//!
//! | Gesture | Pose |
//! |---|---|
//! | `PINCH` | thumb tip within `pinch_threshold` of index tip (checked first) |
//! | `PALM_OPEN` | all four fingers extended |
//! | `GRAB` | all four fingers flexed |
//! | `VICTORY` | index + middle extended |
//! | `POINT` | index extended |
//! | `IDLE` | anything else, or unusable data |
//!
//! `PINCH_SCALE` (both hands on screen) is decided downstream by the motion
//! resolver, never by the classifier.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{DetectorResult, FrameAggregator, Gesture};
//! use hand_gesture::synth::{synthesize, HandPose};
//!
//! let fist = synthesize(HandPose::Fist, (0.5, 0.7), 0.25);
//! // Front-camera detectors label the user's right hand "Left".
//! let result = DetectorResult::empty().with_hand("Left", fist);
//!
//! let sample = FrameAggregator::default().aggregate(&result);
//! assert_eq!(sample.right_gesture, Gesture::Grab);
//! ```

pub mod landmark;
pub mod gesture;
pub mod frame;
pub mod synth;

pub use landmark::{HandLandmarks, Landmark, LANDMARK_COUNT, planar_distance};
pub use gesture::{classify, FingerState, Gesture, GestureClassifier, DEFAULT_PINCH_THRESHOLD};
pub use frame::{
    DebugStatus, DetectorResult, FrameAggregator, HandCursor, Handedness,
    HandednessLabel, HandsView, SceneSample,
};

/// Errors from parsing gesture-related names.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GestureError {
    #[error("unknown gesture name: {0:?}")]
    UnknownGesture(String),

    #[error("unknown handedness label: {0:?}")]
    UnknownHandedness(String),
}
