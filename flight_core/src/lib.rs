//! # flight_core
//!
//! Turns classified hand samples into camera motion.
//!
//! ```text
//!  sensor callback (10–30 Hz)              render tick (~60 Hz)
//!  ─────────────────────────               ────────────────────
//!  DetectorResult                          delta (s)
//!       │                                      │
//!  FrameAggregator ─► SceneSample              │
//!       │                                      ▼
//!  MotionResolver ──► MotionTargets ────► CameraIntegrator ──► impl Camera
//!       │             RotationAccumulator ────┘      (position, rotation, fov)
//!       ▼
//!  HandsView / DebugStatus
//! ```
//!
//! The resolver runs once per sensor callback and overwrites its targets;
//! the integrator runs once per tick and reads whatever was written last.
//! Both take a `&FlightConfig` snapshot per call, so knobs can change at
//! any time.
//!
//! Failures never move the camera: no hands, a sensor error, or unusable
//! landmarks all resolve to the freeze policy (velocity 0).

pub mod config;
pub mod camera;
pub mod resolver;
pub mod integrator;
pub mod session;

pub use config::FlightConfig;
pub use camera::{Camera, CameraPose, Rotation, Vec3};
pub use resolver::{
    ControlMode, MotionResolver, MotionTargets, Resolution, ResolverState,
    RotationAccumulator, GALAXY_ROTATION_GAIN,
};
pub use integrator::{CameraIntegrator, TickReport};
pub use session::{GestureSession, Liveness, SessionUpdate};

/// Errors from loading or validating a [`FlightConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{key} = {value} is outside {min}..={max}")]
    OutOfRange { key: &'static str, value: f32, min: f32, max: f32 },

    #[error("{key} must be positive, got {value}")]
    NotPositive { key: &'static str, value: f32 },

    #[error("{key} has the wrong sign: {value}")]
    WrongSign { key: &'static str, value: f32 },

    #[error("{low} must be below {high}")]
    BadBand { low: &'static str, high: &'static str },
}
