//! Top-level application state machine.
//!
//! `AppState` owns the camera, the galaxy and, while gesture mode is on,
//! the `GestureSession` plus the channel from its hand sensor.  Sensor
//! events are drained on the loop thread, so resolving a callback and
//! integrating a tick never overlap.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::time::Instant;

use tracing::{debug, info, warn};

use flight_core::{
    CameraIntegrator, CameraPose, ControlMode, FlightConfig, GestureSession, MotionTargets,
    RotationAccumulator, SessionUpdate, TickReport, Vec3,
};
use hand_gesture::{DebugStatus, Gesture, HandsView};

use crate::galaxy::{Galaxy, DEFAULT_POINT_COUNT, DEFAULT_SEED};
use crate::orbit::OrbitCamera;
use crate::sensor::{
    spawn_sensor, HandSensor, ReplaySource, SensorEvent, SimHandSource, SimInput,
};
use crate::visualizer::{Hud, Scene, UiCommand, Visualizer, WIN_H};
use crate::{AppError, SensorError};

/// Longest frame the loop will integrate in one step, seconds.
const MAX_FRAME_DELTA: f32 = 0.1;

pub const STATUS_GESTURES_OFF: &str = "Gesture control off";

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand data comes from in gesture mode.
#[derive(Clone, Debug, PartialEq)]
pub enum SensorChoice {
    /// Keyboard and mouse in the viewer window.
    Simulated,
    /// A JSON-lines recording of detector results.
    Replay { path: PathBuf, looped: bool },
    /// LeapMotion hardware.
    #[cfg(feature = "leap")]
    Leap,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GalaxySource {
    Generated { count: usize, seed: u64 },
    File(PathBuf),
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub flight: FlightConfig,
    pub sensor: SensorChoice,
    pub galaxy: GalaxySource,
    /// Skip orbit mode and start flying straight away.
    pub start_in_gesture_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            flight: FlightConfig::default(),
            sensor: SensorChoice::Simulated,
            galaxy: GalaxySource::Generated { count: DEFAULT_POINT_COUNT, seed: DEFAULT_SEED },
            start_in_gesture_mode: false,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Navigation mode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavMode { Orbit, Gesture }

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── configuration ────────────────────────────────────────────────────
    cfg:           FlightConfig,
    sensor_choice: SensorChoice,

    // ── navigation ───────────────────────────────────────────────────────
    mode:       NavMode,
    camera:     CameraPose,
    orbit:      OrbitCamera,
    integrator: CameraIntegrator,
    last_tick:  TickReport,

    // ── gesture session ──────────────────────────────────────────────────
    session:   Option<GestureSession>,
    sensor_rx: Option<Receiver<SensorEvent>>,
    sim_tx:    Option<Sender<SimInput>>,
    /// Point-cloud rotation carried from one session to the next.
    saved_accumulator: RotationAccumulator,

    // ── presentation ─────────────────────────────────────────────────────
    galaxy:  Galaxy,
    hands:   HandsView,
    debug:   DebugStatus,
    gesture: Gesture,
    control: ControlMode,
}

impl AppState {
    pub fn new(cfg: AppConfig) -> Result<Self, AppError> {
        cfg.flight.validate()?;

        let galaxy = match &cfg.galaxy {
            GalaxySource::Generated { count, seed } => Galaxy::generate(*count, *seed),
            GalaxySource::File(path)                => Galaxy::load(path)?,
        };
        info!(points = galaxy.len(), extent = galaxy.extent(), "galaxy ready");

        let mut camera = CameraPose::new(Vec3::from(cfg.flight.initial_position), cfg.flight.initial_fov);
        let orbit = OrbitCamera::from_pose(&camera);
        orbit.apply(&mut camera);

        Ok(AppState {
            cfg:           cfg.flight,
            sensor_choice: cfg.sensor,
            mode:          NavMode::Orbit,
            camera,
            orbit,
            integrator:    CameraIntegrator::new(),
            last_tick:     TickReport::default(),
            session:       None,
            sensor_rx:     None,
            sim_tx:        None,
            saved_accumulator: RotationAccumulator::default(),
            galaxy,
            hands:         HandsView::default(),
            debug:         DebugStatus { status: STATUS_GESTURES_OFF.to_string(), ..DebugStatus::default() },
            gesture:       Gesture::Idle,
            control:       ControlMode::NoHands,
        })
    }

    // ── mode switching ────────────────────────────────────────────────────

    /// Start a gesture session and its sensor.  A sensor that cannot start
    /// leaves the session frozen with an error status; toggling gesture
    /// mode off and on retries.
    pub fn enable_gesture(&mut self) {
        if self.mode == NavMode::Gesture {
            return;
        }

        let held = MotionTargets { rotation: self.camera.rotation, velocity: 0.0, fov: self.camera.fov };
        let mut session = GestureSession::resume(&self.cfg, held, self.saved_accumulator);
        self.debug = DebugStatus { status: session.status().to_string(), ..DebugStatus::default() };

        match self.open_sensor() {
            Ok(source) => self.sensor_rx = Some(spawn_sensor(source, session.liveness())),
            Err(e) => {
                warn!(error = %e, "hand sensor unavailable");
                if let Some(update) = session.handle_sensor_error(&e.to_string(), &self.cfg) {
                    self.apply_update(update);
                }
            }
        }

        self.session = Some(session);
        self.mode = NavMode::Gesture;
        info!(sensor = ?self.sensor_choice, "gesture mode on");
    }

    /// Tear the session down and hand the camera back to the orbit
    /// controls where it is.
    pub fn disable_gesture(&mut self) {
        if let Some(mut session) = self.session.take() {
            self.saved_accumulator = *session.accumulator();
            session.teardown();
        }
        self.sensor_rx = None;
        self.sim_tx = None;
        self.integrator.halt();
        self.last_tick = TickReport::default();

        if self.mode == NavMode::Gesture {
            self.orbit = OrbitCamera::from_pose(&self.camera);
            self.mode = NavMode::Orbit;
            info!("gesture mode off");
        }
        self.hands = HandsView::default();
        self.debug = DebugStatus { status: STATUS_GESTURES_OFF.to_string(), ..DebugStatus::default() };
        self.gesture = Gesture::Idle;
        self.control = ControlMode::NoHands;
    }

    fn open_sensor(&mut self) -> Result<Box<dyn HandSensor>, SensorError> {
        match &self.sensor_choice {
            SensorChoice::Simulated => {
                let (tx, rx) = mpsc::channel();
                self.sim_tx = Some(tx);
                Ok(Box::new(SimHandSource::new(rx)))
            }
            SensorChoice::Replay { path, looped } => {
                Ok(Box::new(ReplaySource::open(path)?.looped(*looped)))
            }
            #[cfg(feature = "leap")]
            SensorChoice::Leap => Ok(Box::new(crate::sensor::LeapHandSource)),
        }
    }

    // ── sensor events ─────────────────────────────────────────────────────

    /// Process one sensor event.  Ignored outside gesture mode.
    pub fn handle_sensor(&mut self, event: SensorEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let update = match event {
            SensorEvent::Frame(result) => session.handle_result(&result, &self.cfg),
            SensorEvent::Status(message) => {
                session.set_status(message.clone());
                self.debug.status = message;
                None
            }
            SensorEvent::Unavailable(message) => session.handle_sensor_error(&message, &self.cfg),
        };
        if let Some(update) = update {
            self.apply_update(update);
        }
    }

    /// Drain everything the sensor has sent since the last call.
    pub fn pump_sensor(&mut self) -> usize {
        let mut events = Vec::new();
        let mut ended = false;
        if let Some(rx) = &self.sensor_rx {
            loop {
                match rx.try_recv() {
                    Ok(e)                           => events.push(e),
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => { ended = true; break; }
                }
            }
        }
        if ended {
            debug!("hand sensor thread ended");
            self.sensor_rx = None;
        }

        let n = events.len();
        for e in events {
            self.handle_sensor(e);
        }
        n
    }

    fn apply_update(&mut self, update: SessionUpdate) {
        if update.resolution.gesture != self.gesture {
            debug!(gesture = %update.resolution.gesture, mode = update.resolution.mode.label(), "gesture changed");
        }
        self.hands   = update.hands;
        self.debug   = update.debug;
        self.gesture = update.resolution.gesture;
        self.control = update.resolution.mode;
    }

    // ── user commands ─────────────────────────────────────────────────────

    /// Returns false when the app should quit.
    pub fn handle_command(&mut self, cmd: UiCommand) -> bool {
        match cmd {
            UiCommand::Quit => return false,

            UiCommand::ToggleGestureMode => match self.mode {
                NavMode::Orbit   => self.enable_gesture(),
                NavMode::Gesture => self.disable_gesture(),
            },

            UiCommand::ToggleHeadTracking => {
                self.cfg.enable_head_tracking = !self.cfg.enable_head_tracking;
                info!(on = self.cfg.enable_head_tracking, "head-tracking steering");
            }

            UiCommand::ToggleTwoHandRotation => {
                self.cfg.enable_two_hand_rotation = !self.cfg.enable_two_hand_rotation;
                info!(on = self.cfg.enable_two_hand_rotation, "galaxy drag");
            }

            UiCommand::FlySpeed(step) => {
                self.cfg.adjust_fly_speed(step);
                debug!(fly_speed = self.cfg.fly_speed, "fly speed");
            }

            UiCommand::ResetCamera => self.reset_camera(),

            UiCommand::OrbitDrag { dx, dy } => {
                if self.mode == NavMode::Orbit {
                    self.orbit.rotate(dx, dy, WIN_H as f32);
                }
            }

            UiCommand::OrbitZoom(steps) => {
                if self.mode == NavMode::Orbit {
                    self.orbit.zoom(steps);
                }
            }

            UiCommand::Sim(input) => {
                if let Some(tx) = &self.sim_tx {
                    let _ = tx.send(input);
                }
            }
        }
        true
    }

    pub fn reset_camera(&mut self) {
        self.camera = CameraPose::new(Vec3::from(self.cfg.initial_position), self.cfg.initial_fov);
        self.integrator.halt();
        self.orbit = OrbitCamera::from_pose(&self.camera);
        self.orbit.apply(&mut self.camera);
        if let Some(session) = self.session.as_mut() {
            let held = MotionTargets { rotation: self.camera.rotation, velocity: 0.0, fov: self.camera.fov };
            session.retarget(&self.cfg, held);
        }
        info!("camera reset");
    }

    // ── per-frame tick ────────────────────────────────────────────────────

    pub fn tick(&mut self, delta: f32) {
        match self.mode {
            NavMode::Orbit => {
                self.galaxy.tick(delta);
                self.orbit.update();
                self.orbit.apply(&mut self.camera);
            }
            NavMode::Gesture => {
                if let Some(session) = &self.session {
                    self.last_tick = self.integrator.tick(
                        session.targets(),
                        session.accumulator(),
                        &mut self.camera,
                        &self.cfg,
                        delta,
                    );
                }
            }
        }
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn mode(&self)     -> NavMode                 { self.mode }
    pub fn camera(&self)   -> &CameraPose             { &self.camera }
    pub fn config(&self)   -> &FlightConfig           { &self.cfg }
    pub fn session(&self)  -> Option<&GestureSession> { self.session.as_ref() }
    pub fn galaxy(&self)   -> &Galaxy                 { &self.galaxy }
    pub fn hands(&self)    -> &HandsView              { &self.hands }
    pub fn debug(&self)    -> &DebugStatus            { &self.debug }
    pub fn gesture(&self)  -> Gesture                 { self.gesture }
    pub fn last_tick(&self) -> TickReport             { self.last_tick }

    /// Point-cloud rotation as last rendered.
    pub fn galaxy_rotation(&self) -> RotationAccumulator {
        self.integrator.galaxy_rotation()
    }

    /// Accumulated drag, live while a session runs, saved otherwise.
    pub fn accumulator(&self) -> RotationAccumulator {
        self.session.as_ref().map_or(self.saved_accumulator, |s| *s.accumulator())
    }

    pub fn hud(&self) -> Hud {
        Hud {
            gesture_mode:      self.mode == NavMode::Gesture,
            control:           self.control.label(),
            gesture:           self.gesture,
            speed:             self.last_tick.speed,
            fov:               self.camera.fov,
            fly_speed:         self.cfg.fly_speed,
            head_tracking:     self.cfg.enable_head_tracking,
            two_hand_rotation: self.cfg.enable_two_hand_rotation,
            bouncing:          self.last_tick.bouncing,
            distance:          self.camera.distance_from_origin(),
            boundary:          self.cfg.boundary_distance,
        }
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            galaxy:          &self.galaxy,
            galaxy_rotation: self.galaxy_rotation(),
            camera:          &self.camera,
            hands:           &self.hands,
            debug:           &self.debug,
            hud:             self.hud(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// This is the entry point called from `main.rs`.  It creates the
/// visualizer and drives the input/sensor/tick/render loop at ~60 fps.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let start_in_gesture_mode = cfg.start_in_gesture_mode;
    let mut app = AppState::new(cfg)?;
    let mut vis = Visualizer::new()?;

    if start_in_gesture_mode {
        app.enable_gesture();
    }

    let mut last = Instant::now();
    while vis.is_open() {
        // 1. Window input
        for cmd in vis.poll_input() {
            if !app.handle_command(cmd) {
                app.disable_gesture();
                return Ok(());
            }
        }

        // 2. Sensor callbacks
        app.pump_sensor();

        // 3. Integrate
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f32().min(MAX_FRAME_DELTA);
        last = now;
        app.tick(delta);

        // 4. Render
        vis.render(&app.scene());
    }

    app.disable_gesture();
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hand_gesture::synth::{synthesize, HandPose};
    use hand_gesture::DetectorResult;

    fn make_app() -> AppState {
        AppState::new(AppConfig::default()).unwrap()
    }

    fn fist_at(wrist: (f32, f32)) -> SensorEvent {
        SensorEvent::Frame(DetectorResult::empty().with_hand("Left", synthesize(HandPose::Fist, wrist, 0.25)))
    }

    #[test]
    fn starts_orbiting_the_default_galaxy() {
        let app = make_app();
        assert_eq!(app.mode(), NavMode::Orbit);
        assert_eq!(app.galaxy().len(), DEFAULT_POINT_COUNT);
        assert_abs_diff_eq!(app.camera().position.z, 200.0, epsilon = 1e-3);
        assert_eq!(app.debug().status, STATUS_GESTURES_OFF);
    }

    #[test]
    fn invalid_flight_config_is_rejected() {
        let mut cfg = AppConfig::default();
        cfg.flight.fly_speed = 5000.0;
        assert!(matches!(AppState::new(cfg), Err(AppError::Config(_))));
    }

    #[test]
    fn sensor_frames_are_ignored_in_orbit_mode() {
        let mut app = make_app();
        app.handle_sensor(fist_at((0.5, 0.5)));
        assert_eq!(app.gesture(), Gesture::Idle);
    }

    #[test]
    fn fist_flies_toward_the_galaxy() {
        let mut app = make_app();
        app.enable_gesture();
        app.handle_sensor(fist_at((0.5, 0.5)));
        assert_eq!(app.gesture(), Gesture::Grab);
        assert!(app.hands().right.visible);

        for _ in 0..30 {
            app.tick(1.0 / 60.0);
        }
        assert!(app.camera().position.z < 200.0);
        assert!(app.last_tick().speed > 0.0);
        assert!(app.hud().gesture_mode);
    }

    #[test]
    fn simulated_sensor_reaches_the_resolver() {
        let mut app = make_app();
        app.handle_command(UiCommand::ToggleGestureMode);
        app.handle_command(UiCommand::Sim(SimInput::Pose(HandPose::Victory)));

        let deadline = Instant::now() + std::time::Duration::from_secs(3);
        while app.gesture() != Gesture::Victory && Instant::now() < deadline {
            app.pump_sensor();
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(app.gesture(), Gesture::Victory);
        assert_eq!(app.debug().status, flight_core::session::STATUS_TRACKING);
    }

    #[test]
    fn missing_replay_freezes_with_error_status() {
        let cfg = AppConfig {
            sensor: SensorChoice::Replay { path: PathBuf::from("/nonexistent/run.jsonl"), looped: false },
            ..AppConfig::default()
        };
        let mut app = AppState::new(cfg).unwrap();
        app.enable_gesture();
        assert_eq!(app.mode(), NavMode::Gesture);
        assert!(app.debug().status.starts_with("Error: "));

        let before = *app.camera();
        for _ in 0..10 {
            app.tick(1.0 / 60.0);
        }
        assert_eq!(app.camera().position, before.position);
    }

    #[test]
    fn unavailable_and_status_events_reach_the_overlay() {
        let mut app = make_app();
        app.enable_gesture();
        app.handle_sensor(fist_at((0.5, 0.5)));
        app.handle_sensor(SensorEvent::Unavailable("lost device".to_string()));
        assert_eq!(app.debug().status, "Error: lost device");
        assert_eq!(app.session().unwrap().targets().velocity, 0.0);

        app.handle_sensor(SensorEvent::Status("Replay finished".to_string()));
        assert_eq!(app.debug().status, "Replay finished");
    }

    #[test]
    fn galaxy_drag_survives_a_mode_round_trip() {
        let mut app = make_app();
        app.handle_command(UiCommand::ToggleTwoHandRotation);
        app.enable_gesture();
        for x in [0.40, 0.45, 0.50] {
            app.handle_sensor(fist_at((x, 0.5)));
        }
        let dragged = app.accumulator();
        assert!(dragged.y > 0.0);

        app.disable_gesture();
        assert_eq!(app.mode(), NavMode::Orbit);
        assert!(app.session().is_none());
        assert_eq!(app.accumulator(), dragged);

        app.enable_gesture();
        assert_eq!(*app.session().unwrap().accumulator(), dragged);
    }

    #[test]
    fn idle_spin_only_in_orbit_mode() {
        let mut app = make_app();
        app.tick(1.0);
        let spun = app.galaxy().spin();
        assert!(spun > 0.0);

        app.enable_gesture();
        app.tick(1.0);
        assert_eq!(app.galaxy().spin(), spun);
    }

    #[test]
    fn orbit_input_is_ignored_while_flying() {
        let mut app = make_app();
        app.enable_gesture();
        let before = *app.camera();
        app.handle_command(UiCommand::OrbitDrag { dx: 300.0, dy: 0.0 });
        app.handle_command(UiCommand::OrbitZoom(5.0));
        app.tick(1.0 / 60.0);
        assert_eq!(app.camera().position, before.position);
    }

    #[test]
    fn commands_adjust_config() {
        let mut app = make_app();
        assert!(app.handle_command(UiCommand::FlySpeed(10.0)));
        assert_eq!(app.config().fly_speed, 100.0);
        for _ in 0..30 {
            app.handle_command(UiCommand::FlySpeed(10.0));
        }
        assert_eq!(app.config().fly_speed, 200.0);

        app.handle_command(UiCommand::ToggleHeadTracking);
        assert!(!app.config().enable_head_tracking);
        assert!(!app.handle_command(UiCommand::Quit));
    }

    #[test]
    fn reset_returns_to_start_pose() {
        let mut app = make_app();
        app.enable_gesture();
        app.handle_sensor(fist_at((0.5, 0.5)));
        for _ in 0..60 {
            app.tick(1.0 / 60.0);
        }
        app.handle_command(UiCommand::ResetCamera);
        assert_abs_diff_eq!(app.camera().position.z, 200.0, epsilon = 1e-3);
        assert_eq!(app.camera().fov, 60.0);
    }

    #[test]
    fn reset_while_flying_stays_put() {
        let mut app = make_app();
        app.enable_gesture();
        app.handle_sensor(fist_at((0.85, 0.35)));
        for _ in 0..30 {
            app.tick(1.0 / 60.0);
        }
        app.handle_command(UiCommand::ResetCamera);
        let reset = *app.camera();
        for _ in 0..30 {
            app.tick(1.0 / 60.0);
        }
        assert_eq!(app.session().unwrap().targets().velocity, 0.0);
        assert_abs_diff_eq!(app.camera().position.z, reset.position.z, epsilon = 1e-3);
        assert_abs_diff_eq!(app.camera().rotation.yaw, reset.rotation.yaw, epsilon = 1e-5);
        assert_eq!(app.camera().fov, 60.0);
    }

    #[test]
    fn disabling_kills_the_sensor() {
        let mut app = make_app();
        app.enable_gesture();
        let liveness = app.session().unwrap().liveness();
        app.disable_gesture();
        assert!(!liveness.is_alive());
        assert_eq!(app.pump_sensor(), 0);
    }
}
