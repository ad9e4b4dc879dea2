//! galaxy_flight: interactive entry point.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use flight_core::config::{BOUNDARY_DISTANCE_RANGE, FLY_SPEED_RANGE};
use flight_core::FlightConfig;
use galaxy_flight::app::{run, AppConfig, GalaxySource, SensorChoice};
use galaxy_flight::galaxy::{DEFAULT_POINT_COUNT, DEFAULT_SEED};

#[derive(Parser, Debug)]
#[command(name = "galaxy_flight", version, about = "Fly through a point-cloud galaxy with hand gestures")]
struct Args {
    /// Start with defaults, no prompts
    #[arg(long)]
    quick: bool,

    /// Flight config (JSON, camelCase keys; missing keys take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay recorded detector results (JSON lines) instead of simulating
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Loop the replay
    #[arg(long, requires = "replay")]
    loop_replay: bool,

    /// Use the LeapMotion controller
    #[cfg(feature = "leap")]
    #[arg(long, conflicts_with = "replay")]
    leap: bool,

    /// Load the point cloud from JSON instead of generating it
    #[arg(long)]
    galaxy: Option<PathBuf>,

    /// Points in a generated galaxy
    #[arg(long, default_value_t = DEFAULT_POINT_COUNT)]
    points: usize,

    /// Seed for a generated galaxy
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Start in gesture mode
    #[arg(long)]
    gestures: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Neural Galaxy — gesture-controlled flight           ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Hardware: LeapMotion available (--leap)");
    #[cfg(not(feature = "leap"))]
    println!("  Hardware: none  (use --features leap for LeapMotion)");
    println!();

    let mut cfg = match app_config(&args) {
        Ok(c)  => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if args.quick {
        println!("  Quick-start: fly speed {}, boundary {}, sensor {:?}\n",
            cfg.flight.fly_speed, cfg.flight.boundary_distance, cfg.sensor);
    } else {
        configure_interactively(&mut cfg);
    }

    println!();
    println!("  Opening viewer window…  (G toggles gesture control)");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn app_config(args: &Args) -> Result<AppConfig, flight_core::ConfigError> {
    let flight = match &args.config {
        Some(path) => FlightConfig::from_json(path)?,
        None       => FlightConfig::default(),
    };

    let sensor = match &args.replay {
        Some(path) => SensorChoice::Replay { path: path.clone(), looped: args.loop_replay },
        None       => SensorChoice::Simulated,
    };
    #[cfg(feature = "leap")]
    let sensor = if args.leap { SensorChoice::Leap } else { sensor };

    let galaxy = match &args.galaxy {
        Some(path) => GalaxySource::File(path.clone()),
        None       => GalaxySource::Generated { count: args.points, seed: args.seed },
    };

    Ok(AppConfig { flight, sensor, galaxy, start_in_gesture_mode: args.gestures })
}

fn configure_interactively(cfg: &mut AppConfig) {
    let f = &mut cfg.flight;

    let speed = read_line(&format!(
        "  Fly speed {}–{} (default {}): ",
        FLY_SPEED_RANGE.start(), FLY_SPEED_RANGE.end(), f.fly_speed,
    ));
    if let Ok(v) = speed.trim().parse::<f32>() {
        f.fly_speed = v.clamp(*FLY_SPEED_RANGE.start(), *FLY_SPEED_RANGE.end());
    }

    let boundary = read_line(&format!(
        "  Boundary distance {}–{} (default {}): ",
        BOUNDARY_DISTANCE_RANGE.start(), BOUNDARY_DISTANCE_RANGE.end(), f.boundary_distance,
    ));
    if let Ok(v) = boundary.trim().parse::<f32>() {
        f.boundary_distance = v.clamp(*BOUNDARY_DISTANCE_RANGE.start(), *BOUNDARY_DISTANCE_RANGE.end());
    }

    f.enable_head_tracking     = ask_yes_no("  Steer with hand position?", f.enable_head_tracking);
    f.enable_two_hand_rotation = ask_yes_no("  Drag the galaxy with a fist?", f.enable_two_hand_rotation);
    cfg.start_in_gesture_mode  = ask_yes_no("  Start in gesture mode?", cfg.start_in_gesture_mode);
}

fn ask_yes_no(prompt: &str, default: bool) -> bool {
    let hint = if default { "Y/n" } else { "y/N" };
    match read_line(&format!("{} ({}): ", prompt, hint)).trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => true,
        "n" | "no"  => false,
        _           => default,
    }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
