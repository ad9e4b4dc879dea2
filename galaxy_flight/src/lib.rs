//! # galaxy_flight
//!
//! Fly a camera through a 3D point-cloud galaxy with hand gestures.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Hands | Action |
//! |---|---|---|
//! | `GRAB` (fist) | One | Fly forward at `flySpeed × grabVelocityMultiplier` |
//! | `PINCH` | One | Fly forward at `flySpeed × 0.5` |
//! | `VICTORY` | One | Fly backward at `flySpeed × |victoryVelocityMultiplier|` |
//! | `PALM_OPEN` / other | One | Hover; hand offset from centre steers |
//! | Fingertips spread / close | Both | Zoom (field of view) |
//! | Sustained `GRAB` drag | One | Rotate the galaxy (when enabled) |
//!
//! Flying past `boundaryDistance` turns the camera's momentum around and
//! pulls it back toward the galaxy.
//!
//! ## Navigation modes
//!
//! * **Orbit** (start-up): mouse drag orbits the galaxy, scroll zooms,
//!   the galaxy spins slowly.
//! * **Gesture**: a hand sensor drives the flight core.
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: keyboard and mouse synthesize hands.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `G` | Toggle gesture mode |
//! | `K` | Toggle head-tracking steering |
//! | `T` | Toggle galaxy drag |
//! | `[` / `]` | Fly speed −/+ 10 |
//! | `R` | Reset camera |
//! | `1`–`5`, `0` | Simulated pose: palm, fist, victory, point, pinch, relaxed |
//! | `H` | Simulated second hand on/off |
//! | `N` | Hide / show the simulated hand |
//! | `Q` / `Esc` | Quit |

pub mod sensor;
pub mod galaxy;
pub mod orbit;
pub mod visualizer;
pub mod app;

use std::path::PathBuf;

/// Hand sensor failures.  None of these stop the application: they are
/// shown as status and the camera freezes.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("cannot read replay {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("replay {path} holds no usable frames")]
    EmptyReplay { path: PathBuf },

    #[error("hand tracking device: {0}")]
    Device(String),
}

/// Point-cloud loading failures.
#[derive(Debug, thiserror::Error)]
pub enum GalaxyError {
    #[error("cannot read galaxy {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid galaxy JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("point {index}: bad colour {value:?}, expected #RRGGBB")]
    BadColor { index: usize, value: String },

    #[error("point {index} has a non-finite coordinate")]
    BadPosition { index: usize },

    #[error("galaxy has no points")]
    Empty,
}

/// Anything that ends [`app::run`] early.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(String),

    #[error(transparent)]
    Galaxy(#[from] GalaxyError),

    #[error(transparent)]
    Config(#[from] flight_core::ConfigError),
}
