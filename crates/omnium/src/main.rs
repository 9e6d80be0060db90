//! The `omnium` binary: run one race on the console.
//!
//! ```text
//! omnium <track_length> <riders> <u|v> [seed]
//! ```
//!
//! Prints the starting grid, counts the race down, streams every event
//! to stdout as it happens, and closes with the final standings. All
//! race logic lives in the library crates; this is a thin shell.

use std::env;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use omnium::prelude::*;

/// Seconds of countdown before the start gate opens.
const COUNTDOWN_SECS: u64 = 5;

struct Args {
    track_length: usize,
    riders: usize,
    mode: RaceMode,
    seed: u64,
}

fn usage(program: &str) -> String {
    format!("usage: {program} <track_length> <riders> <u|v> [seed]")
}

fn parse_args(mut argv: env::Args) -> Result<Args, String> {
    let program = argv.next().unwrap_or_else(|| "omnium".into());
    let mut required = || argv.next().ok_or_else(|| usage(&program));

    let track_length = required()?
        .parse::<usize>()
        .map_err(|_| "track length must be a positive integer".to_string())?;
    let riders = required()?
        .parse::<usize>()
        .map_err(|_| "rider count must be a positive integer".to_string())?;
    let mode = match required()?.as_str() {
        "u" => RaceMode::Uniform,
        "v" => RaceMode::Variable,
        other => return Err(format!("mode must be 'u' or 'v', got '{other}'")),
    };
    let seed = match argv.next() {
        Some(s) => s
            .parse::<u64>()
            .map_err(|_| "seed must be a non-negative integer".to_string())?,
        None => 0,
    };
    Ok(Args {
        track_length,
        riders,
        mode,
        seed,
    })
}

fn countdown() {
    for remaining in (1..=COUNTDOWN_SECS).rev() {
        println!("start in {remaining}...");
        thread::sleep(Duration::from_secs(1));
    }
    println!("go!");
}

fn run() -> Result<(), String> {
    let args = parse_args(env::args())?;

    let mut config = RaceConfig::new(args.track_length, args.riders, args.mode);
    config.seed = args.seed;
    let (world, events) = RaceWorld::new(config).map_err(|e| e.to_string())?;

    println!(
        "omnium: {} riders, {}-cell track, {} mode, seed {}",
        args.riders,
        args.track_length,
        match args.mode {
            RaceMode::Uniform => "uniform",
            RaceMode::Variable => "variable",
        },
        args.seed,
    );
    for rider in world.riders() {
        println!("  slot {:<3} rider #{}", rider.id, rider.number);
    }

    countdown();

    // Print the stream as it arrives; the race joins its own workers,
    // so the broadcaster is joined after the report comes back.
    let broadcaster = thread::spawn(move || {
        let mut count = 0u64;
        while let Some(event) = events.recv() {
            println!("{event}");
            count += 1;
        }
        count
    });

    let report = world.run().map_err(|e| e.to_string())?;
    let event_count = broadcaster
        .join()
        .map_err(|_| "event broadcaster panicked".to_string())?;

    println!();
    println!(
        "race over after {} ticks ({} events, {} overtakes, {} blocked moves)",
        report.ticks, event_count, report.metrics.overtakes, report.metrics.blocked_moves,
    );
    println!("final standings:");
    for placement in &report.standings {
        println!("  {:>2}. rider #{}", placement.rank, placement.number);
    }
    println!("winner: rider #{}", report.winner.number);
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("omnium: {message}");
            ExitCode::FAILURE
        }
    }
}
