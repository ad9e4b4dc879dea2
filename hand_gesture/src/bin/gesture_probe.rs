//! gesture_probe: classify recorded detector frames.
//!
//! Reads one `DetectorResult` JSON object per line (from a file argument or
//! stdin) and prints the per-hand gestures for each frame.
//!
//! ```text
//! gesture_probe frames.jsonl
//! gesture_probe --unmirrored < frames.jsonl
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use hand_gesture::{DetectorResult, FrameAggregator};

#[derive(Parser, Debug)]
#[command(name = "gesture_probe", version, about = "Classify recorded detector frames (JSON lines)")]
struct Args {
    /// Recording to read; stdin when omitted
    path: Option<PathBuf>,

    /// Take detector handedness labels at face value
    #[arg(long)]
    unmirrored: bool,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::DEBUG
        } else {
            self.log_level.parse().unwrap_or(LevelFilter::WARN)
        }
    }
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.level())
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let reader: Box<dyn BufRead> = match &args.path {
        Some(p) => match File::open(p) {
            Ok(f)  => Box::new(BufReader::new(f)),
            Err(e) => {
                eprintln!("Error: cannot open {}: {}", p.display(), e);
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    let agg = FrameAggregator { mirrored_labels: !args.unmirrored, ..FrameAggregator::default() };

    let mut frames = 0usize;
    let mut bad    = 0usize;
    for (n, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => { eprintln!("Error: read failed: {}", e); std::process::exit(1); }
        };
        if line.trim().is_empty() { continue; }

        match serde_json::from_str::<DetectorResult>(&line) {
            Ok(result) => {
                let s = agg.aggregate(&result);
                let side = |present: bool, g: hand_gesture::Gesture| {
                    if present { g.to_string() } else { "-".to_string() }
                };
                println!(
                    "{:>5}  hands={}  left={:<11} right={}",
                    n + 1,
                    s.hand_count(),
                    side(s.left.is_some(),  s.left_gesture),
                    side(s.right.is_some(), s.right_gesture),
                );
                frames += 1;
            }
            Err(e) => {
                eprintln!("  line {}: skipped ({})", n + 1, e);
                bad += 1;
            }
        }
    }

    println!();
    println!("  {} frames classified, {} skipped", frames, bad);
}
