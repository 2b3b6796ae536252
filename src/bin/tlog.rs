//! Keep a local reading history and share it as a dashboard link.

use std::path::PathBuf;
use std::process;

use chrono::{Duration, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use rand::Rng;
use trendlog::{Config, HistoryStore, JsonFileStorage, LogCodec, Reading, Trend};

#[derive(Parser)]
#[command(name = "tlog")]
#[command(about = "Keep a reading history and share it as a link")]
#[command(after_help = "TREND CODES:\n  \
    w  increasing sharply\n  \
    e  increasing\n  \
    d  stable\n  \
    x  decreasing\n  \
    z  decreasing sharply\n  \
    (omit for unknown)")]
struct Args {
    /// JSON config file (defaults apply to missing fields)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// History file, overriding the config
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a reading taken now
    Append {
        /// Value with at most one fractional digit, e.g. 120.5
        value: String,
        /// Trend code
        trend: Option<char>,
    },
    /// List the history, newest first
    Show,
    /// Print a dashboard link carrying the whole history
    Export {
        /// Dashboard page, overriding the config
        #[arg(long)]
        origin: Option<String>,
    },
    /// Print the readings carried by a link or blob
    Decode {
        /// Dashboard link or bare blob
        input: String,
    },
    /// Fill the history with synthetic readings
    Gen {
        /// Number of readings
        #[arg(short, long, default_value = "24")]
        readings: usize,
        /// Minutes between readings
        #[arg(long, default_value = "15")]
        interval: i64,
        /// Starting value in tenths
        #[arg(long, default_value = "1000")]
        base: i64,
    },
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}

fn print_readings(readings: &[Reading], zone: FixedOffset) {
    if readings.is_empty() {
        println!("(no readings)");
        return;
    }
    for r in readings {
        let local = r.timestamp.with_timezone(&zone);
        let symbol = r.trend_kind().map_or(" ", Trend::symbol);
        println!("{}  {:>7} {symbol}  {}", local.format("%Y-%m-%d %H:%M"), r.value, r.describe());
    }
}

/// Readings wandering around `base` tenths, oldest first, ending now
fn generate_readings(count: usize, interval: i64, base: i64) -> Vec<Reading> {
    let mut rng = rand::rng();
    let now = Utc::now();
    let mut tenths = base;
    (0..count)
        .rev()
        .map(|back| {
            let step: i64 = rng.random_range(-25..=25);
            tenths = (tenths + step).clamp(20, 4000);
            let trend = match step {
                s if s > 15 => Trend::RisingSharply,
                s if s > 5 => Trend::Rising,
                s if s < -15 => Trend::FallingSharply,
                s if s < -5 => Trend::Falling,
                _ => Trend::Stable,
            };
            let timestamp = now - Duration::minutes(interval * back as i64);
            Reading::new(timestamp, format!("{}.{}", tenths / 10, tenths % 10), trend.code())
        })
        .collect()
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path).unwrap_or_else(|e| fail(e)),
        None => Config::default(),
    };
    if let Some(history) = args.history {
        config.history_path = history;
    }
    let codec: LogCodec = config.codec().unwrap_or_else(|e| fail(e));
    let store: HistoryStore<JsonFileStorage> = config.open_store();

    match args.command {
        Command::Append { value, trend } => {
            let reading = Reading::new(Utc::now(), value, trend.unwrap_or(' '));
            if let Err(e) = codec.validate(std::slice::from_ref(&reading)) {
                fail(e);
            }
            let line = reading.describe();
            if let Err(e) = store.append(reading) {
                fail(e);
            }
            println!("Recorded {line} ({} in history)", store.len());
        }
        Command::Show => print_readings(&store.read_newest_first(), codec.zone()),
        Command::Export { origin } => {
            let origin = origin.unwrap_or_else(|| config.dashboard_origin.clone());
            let readings = store.read_all();
            if let Err(e) = codec.validate(&readings) {
                eprintln!("Warning: {e}; the link carries the truncated field");
            }
            match codec.export_url(&origin, &readings) {
                Ok(url) => println!("{url}"),
                Err(e) => fail(e),
            }
        }
        Command::Decode { input } => match codec.import_url(&input) {
            Ok(mut readings) => {
                readings.reverse();
                print_readings(&readings, codec.zone());
            }
            Err(e) => fail(e),
        },
        Command::Gen { readings, interval, base } => {
            let generated = generate_readings(readings, interval, base);
            for (i, reading) in generated.into_iter().enumerate() {
                if let Err(e) = store.append(reading) {
                    eprintln!("Warning: Failed to store reading {i}: {e}");
                }
            }
            println!("Generated {readings} readings ({} in history)", store.len());
        }
    }
}
