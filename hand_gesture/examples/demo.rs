//! Walks the synthetic poses through the classifier and the aggregator.

use hand_gesture::{DetectorResult, FrameAggregator, GestureClassifier};
use hand_gesture::synth::{synthesize, synthesize_mirrored, HandPose};

fn main() {
    println!("\n=== Hand Gesture Demo ===\n");

    // ── 1. One hand, every pose ───────────────────────────────────────────
    println!("1. Single-hand classification (pinch threshold 0.05)");
    let classifier = GestureClassifier::default();
    for pose in HandPose::ALL {
        let hand = synthesize(pose, (0.5, 0.7), 0.25);
        println!("   {:<9} → {}", format!("{:?}", pose), classifier.classify(&hand));
    }
    println!();

    // ── 2. Handedness mirroring ───────────────────────────────────────────
    println!("2. Detector label \"Left\" is the user's right hand");
    let result = DetectorResult::empty()
        .with_hand("Left", synthesize(HandPose::Fist, (0.3, 0.7), 0.25));
    let sample = FrameAggregator::default().aggregate(&result);
    println!("   left  present={}  gesture={}", sample.left.is_some(),  sample.left_gesture);
    println!("   right present={}  gesture={}", sample.right.is_some(), sample.right_gesture);
    println!();

    // ── 3. Two hands ──────────────────────────────────────────────────────
    println!("3. Two hands");
    let result = DetectorResult::empty()
        .with_hand("Left",  synthesize(HandPose::Pinch, (0.35, 0.7), 0.25))
        .with_hand("Right", synthesize_mirrored(HandPose::OpenPalm, (0.65, 0.7), 0.25));
    let sample = FrameAggregator::default().aggregate(&result);
    let view = sample.hands_view();
    println!("   left  cursor at ({:.2}, {:.2})  {}", view.left.position.0,  view.left.position.1,  view.left.gesture);
    println!("   right cursor at ({:.2}, {:.2})  {}", view.right.position.0, view.right.position.1, view.right.gesture);
    println!();

    // ── 4. Malformed input ────────────────────────────────────────────────
    println!("4. Truncated landmark set");
    let mut short = synthesize(HandPose::Fist, (0.5, 0.7), 0.25).points().to_vec();
    short.truncate(12);
    let short = hand_gesture::HandLandmarks::from_points(short);
    println!("   12 points → {}", classifier.classify(&short));
    println!();
}
