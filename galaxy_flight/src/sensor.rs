//! Hand sensors: LeapMotion hardware, file replay and keyboard/mouse
//! simulation.
//!
//! The public interface is [`SensorEvent`] delivered over a `mpsc` channel.
//! Every source produces detector-shaped results (21 normalized landmarks
//! per hand, labels in the mirrored front-camera convention), so the
//! consumer does not care where they came from.
//!
//! A source runs on its own thread until the session's [`Liveness`] flag
//! drops or the receiving end goes away.

use std::fs;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use flight_core::Liveness;
use hand_gesture::synth::{synthesize, synthesize_mirrored, HandPose};
use hand_gesture::DetectorResult;

use crate::SensorError;

/// Detector cadence the sources aim for (20 Hz).
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(50);

/// Wrist-to-fingertip span of a simulated hand, normalized units.
const SIM_HAND_SCALE: f32 = 0.25;

pub const REPLAY_FINISHED: &str = "Replay finished";

// ════════════════════════════════════════════════════════════════════════════
// SensorEvent
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq)]
pub enum SensorEvent {
    /// One detector callback.
    Frame(DetectorResult),
    /// Informational status for the overlay.
    Status(String),
    /// The sensor could not start or has failed.
    Unavailable(String),
}

// ════════════════════════════════════════════════════════════════════════════
// HandSensor trait: unified interface for hw, replay and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SensorEvent`]s over a channel.
pub trait HandSensor: Send + 'static {
    /// Produce events until `liveness` drops or `tx` disconnects.
    fn run(self: Box<Self>, tx: Sender<SensorEvent>, liveness: Liveness);
}

/// Spawn a sensor on its own thread and return the receiving end.
pub fn spawn_sensor(source: Box<dyn HandSensor>, liveness: Liveness) -> Receiver<SensorEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || source.run(tx, liveness));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource: keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the viewer window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    Pose(HandPose),
    /// Pointer position in view coordinates (0–1, as the user sees it).
    Move(f32, f32),
    ToggleSecondHand,
    ToggleHidden,
}

/// What the simulated user is doing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimHandState {
    pub pose:        HandPose,
    /// Wrist of the user's right hand, view coordinates.
    pub position:    (f32, f32),
    /// Mirror the right hand with the left one.
    pub second_hand: bool,
    pub hidden:      bool,
}

impl Default for SimHandState {
    fn default() -> Self {
        SimHandState {
            pose:        HandPose::OpenPalm,
            position:    (0.5, 0.5),
            second_hand: false,
            hidden:      false,
        }
    }
}

impl SimHandState {
    pub fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pose(p)          => self.pose = p,
            SimInput::Move(x, y)       => self.position = (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)),
            SimInput::ToggleSecondHand => self.second_hand = !self.second_hand,
            SimInput::ToggleHidden     => self.hidden = !self.hidden,
        }
    }
}

/// The detector result a front camera would report for `state`.
///
/// The camera sees the user mirrored, so the view position is flipped
/// horizontally and the user's right hand is labelled `"Left"`.
pub fn sim_frame(state: &SimHandState) -> DetectorResult {
    if state.hidden {
        return DetectorResult::empty();
    }
    let raw = (1.0 - state.position.0, state.position.1);
    let mut result = DetectorResult::empty()
        .with_hand("Left", synthesize(state.pose, raw, SIM_HAND_SCALE));
    if state.second_hand {
        let other = (1.0 - raw.0, raw.1);
        result = result.with_hand("Right", synthesize_mirrored(state.pose, other, SIM_HAND_SCALE));
    }
    result
}

/// Hand source driven by [`SimInput`] events from the viewer window.
pub struct SimHandSource {
    pub rx:       Receiver<SimInput>,
    pub state:    SimHandState,
    pub interval: Duration,
}

impl SimHandSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimHandSource { rx, state: SimHandState::default(), interval: SAMPLE_INTERVAL }
    }
}

impl HandSensor for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<SensorEvent>, liveness: Liveness) {
        let SimHandSource { rx, mut state, interval } = *self;
        info!("simulated hand sensor running");

        while liveness.is_alive() {
            loop {
                match rx.try_recv() {
                    Ok(input)                       => state.apply(input),
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            if tx.send(SensorEvent::Frame(sim_frame(&state))).is_err() {
                return;
            }
            thread::sleep(interval);
        }
        debug!("simulated hand sensor stopped");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource: recorded detector output
// ════════════════════════════════════════════════════════════════════════════

/// Plays back a JSON-lines recording, one `DetectorResult` per line:
///
/// ```text
/// {"multiHandLandmarks":[[{"x":0.5,"y":0.7}, …]],"multiHandedness":[{"label":"Left"}]}
/// ```
pub struct ReplaySource {
    pub frames:   Vec<DetectorResult>,
    pub interval: Duration,
    pub looped:   bool,
}

impl ReplaySource {
    pub fn from_frames(frames: Vec<DetectorResult>) -> Self {
        ReplaySource { frames, interval: SAMPLE_INTERVAL, looped: false }
    }

    pub fn open(path: &Path) -> Result<Self, SensorError> {
        let text = fs::read_to_string(path)
            .map_err(|source| SensorError::Io { path: path.to_path_buf(), source })?;
        let frames = parse_replay(&text);
        if frames.is_empty() {
            return Err(SensorError::EmptyReplay { path: path.to_path_buf() });
        }
        info!(path = %path.display(), frames = frames.len(), "replay loaded");
        Ok(ReplaySource::from_frames(frames))
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }
}

/// Parse JSON lines, skipping blank and unparseable ones.
pub fn parse_replay(text: &str) -> Vec<DetectorResult> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| match serde_json::from_str::<DetectorResult>(line) {
            Ok(frame) => Some(frame),
            Err(e) => {
                warn!(line = n + 1, error = %e, "skipping bad replay line");
                None
            }
        })
        .collect()
}

impl HandSensor for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<SensorEvent>, liveness: Liveness) {
        if self.frames.is_empty() {
            let _ = tx.send(SensorEvent::Unavailable("replay holds no frames".to_string()));
            return;
        }

        loop {
            for frame in &self.frames {
                if !liveness.is_alive() {
                    return;
                }
                if tx.send(SensorEvent::Frame(frame.clone())).is_err() {
                    return;
                }
                thread::sleep(self.interval);
            }
            if !self.looped {
                break;
            }
        }

        // Nothing is tracked once the tape runs out.
        let _ = tx.send(SensorEvent::Frame(DetectorResult::empty()));
        let _ = tx.send(SensorEvent::Status(REPLAY_FINISHED.to_string()));
        info!("replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Leap interaction box mapped onto the image: ±200 mm across, 100–500 mm
/// above the device.
#[cfg(any(feature = "leap", test))]
const LEAP_HALF_WIDTH_MM: f32 = 200.0;
#[cfg(any(feature = "leap", test))]
const LEAP_TOP_MM:        f32 = 500.0;
#[cfg(any(feature = "leap", test))]
const LEAP_SPAN_MM:       f32 = 400.0;

/// Leap millimetres to normalized front-camera image coordinates.  The
/// user's right (+x) lands on the image's left, as a webcam sees it.
#[cfg(any(feature = "leap", test))]
pub fn leap_to_image(x_mm: f32, y_mm: f32) -> (f32, f32) {
    ((LEAP_HALF_WIDTH_MM - x_mm) / LEAP_SPAN_MM, (LEAP_TOP_MM - y_mm) / LEAP_SPAN_MM)
}

/// 21 landmarks from a wrist and four joints per digit (thumb first,
/// base to tip), all in Leap millimetres.
#[cfg(any(feature = "leap", test))]
pub fn leap_landmarks(wrist: [f32; 3], digits: &[[[f32; 3]; 4]; 5]) -> hand_gesture::HandLandmarks {
    use hand_gesture::Landmark;

    let to_landmark = |[x, y, z]: [f32; 3]| {
        let (ix, iy) = leap_to_image(x, y);
        Landmark::with_depth(ix, iy, z / LEAP_SPAN_MM)
    };
    let mut points = Vec::with_capacity(hand_gesture::LANDMARK_COUNT);
    points.push(to_landmark(wrist));
    for digit in digits {
        points.extend(digit.iter().copied().map(to_landmark));
    }
    hand_gesture::HandLandmarks::from_points(points)
}

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Leap reports the user's hands unmirrored; they are relabelled so the
/// aggregator's mirrored-label swap recovers the true side.
#[cfg(feature = "leap")]
pub struct LeapHandSource;

#[cfg(feature = "leap")]
impl HandSensor for LeapHandSource {
    fn run(self: Box<Self>, tx: Sender<SensorEvent>, liveness: Liveness) {
        use leaprs::*;
        use std::time::Instant;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                let err = SensorError::Device(format!("connection failed: {:?}", e));
                let _ = tx.send(SensorEvent::Unavailable(err.to_string()));
                return;
            }
        };
        if let Err(e) = connection.open() {
            let err = SensorError::Device(format!("open failed: {:?}", e));
            let _ = tx.send(SensorEvent::Unavailable(err.to_string()));
            return;
        }
        info!("LeapMotion connected");

        macro_rules! joint {
            ($v:expr) => {{
                let v = $v;
                [v.x, v.y, v.z]
            }};
        }
        let mut last_sent: Option<Instant> = None;

        while liveness.is_alive() {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                if last_sent.is_some_and(|t| t.elapsed() < SAMPLE_INTERVAL) {
                    continue;
                }
                last_sent = Some(Instant::now());

                let mut result = DetectorResult::empty();
                for hand in frame.hands() {
                    let digits: Vec<_> = hand.digits().collect();
                    if digits.len() < 5 {
                        continue;
                    }
                    let mut joints = [[[0.0f32; 3]; 4]; 5];
                    for (slot, d) in joints.iter_mut().zip(&digits) {
                        *slot = [
                            joint!(d.proximal().prev_joint()),
                            joint!(d.intermediate().prev_joint()),
                            joint!(d.distal().prev_joint()),
                            joint!(d.distal().next_joint()),
                        ];
                    }
                    let wrist = joint!(digits[2].metacarpal().prev_joint());
                    let label = if hand.hand_type() == HandType::Left { "Right" } else { "Left" };
                    result = result.with_hand(label, leap_landmarks(wrist, &joints));
                }

                if tx.send(SensorEvent::Frame(result)).is_err() {
                    return;
                }
            }
        }
        debug!("LeapMotion source stopped");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
