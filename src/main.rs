//! Weather K-line
//!
//! Syncs daily temperatures for China's provincial capitals, turns them into
//! weekly candlesticks under six analytical modes, renders charts and generates
//! text reports.

mod config;
mod kline;
mod paths;
mod report;
mod retry;
mod weather;

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use kline::Mode;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("weather_kline.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

#[derive(Parser)]
#[command(name = "weather-kline")]
#[command(about = "Weekly temperature candlesticks for China's provincial capitals")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: config.json next to the executable)
    #[arg(short, long, global = true, env = "WEATHER_KLINE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported cities
    Cities,

    /// Fetch daily temperatures for one batch of cities
    Sync {
        /// Catalogue index to start from
        #[arg(short, long, default_value_t = 0)]
        start: usize,

        /// Cities in this batch (default: weather.batch_size)
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Keep going until every city is synced
        #[arg(long)]
        all: bool,
    },

    /// Build weekly candles for a city
    Kline {
        /// City key, e.g. Beijing
        #[arg(long)]
        city: String,

        /// original, zscore, range, cumulative, acceleration or weekChange
        #[arg(short, long, default_value = "original")]
        mode: Mode,

        /// Write candles and summary to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Render a PNG chart to this file
        #[arg(long)]
        chart: Option<PathBuf>,
    },

    /// Show the available modes
    Modes,

    /// Generate and browse text reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Generate the report for one city and mode
    Generate {
        #[arg(long)]
        city: String,

        #[arg(short, long)]
        mode: Mode,
    },

    /// Generate reports for every city and mode
    GenerateAll,

    /// Show a stored report
    Get {
        #[arg(long)]
        city: String,

        #[arg(short, long)]
        mode: Mode,
    },

    /// List stored reports, most recent first
    List,

    /// Report counts
    Stats,
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        let log_path = paths::get_logs_dir().join("weather_kline.log");
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));

    let cli = Cli::parse();

    // Ensure output directories exist
    paths::ensure_directories()?;

    config::init_config(cli.config.as_deref());

    match cli.command {
        Commands::Cities => {
            let synced = weather::WeatherStore::open_default()?.stored_cities()?;
            for (i, city) in weather::PROVINCE_CAPITALS.iter().enumerate() {
                let mark = if synced.iter().any(|s| s == city.en) { "*" } else { " " };
                println!(
                    "{:>2} {} {:<14} {:<6} {:>8.4} {:>9.4}",
                    i, mark, city.en, city.name, city.lat, city.lon
                );
            }
            let synced_count = weather::PROVINCE_CAPITALS
                .iter()
                .filter(|c| synced.iter().any(|s| s == c.en))
                .count();
            println!("{} of {} synced (*)", synced_count, weather::PROVINCE_CAPITALS.len());
            Ok(())
        }
        Commands::Sync { start, count, all } => run_sync(start, count, all),
        Commands::Kline {
            city,
            mode,
            json,
            chart,
        } => run_kline(&city, mode, json, chart),
        Commands::Modes => {
            for mode in Mode::all() {
                let info = mode.info();
                println!("{:<13} {} ({}): {}", mode.id(), info.label, info.unit, info.description);
            }
            Ok(())
        }
        Commands::Report { command } => run_report(command),
    }
}

fn run_sync(start: usize, count: Option<usize>, all: bool) -> Result<()> {
    let mut next = Some(start);

    while let Some(start) = next {
        let outcome = weather::sync_batch(start, count)?;
        for failure in &outcome.errors {
            println!("  {} failed: {}", failure.city, failure.error);
        }
        println!(
            "Synced {}-{} of {}: {} ok, {} failed ({}%)",
            outcome.start_index + 1,
            outcome.end_index,
            outcome.total,
            outcome.success_count,
            outcome.fail_count,
            outcome.progress_percent
        );

        if outcome.is_finished() {
            println!("All cities synced");
            break;
        }
        next = if all { outcome.next_start_index } else { None };
        if !all {
            if let Some(n) = outcome.next_start_index {
                println!("Next batch: --start {}", n);
            }
        }
    }

    Ok(())
}

fn run_kline(city: &str, mode: Mode, json: Option<PathBuf>, chart: Option<PathBuf>) -> Result<()> {
    let city = weather::find_city(city).ok_or_else(|| anyhow!("Unknown city: {}", city))?;
    let output = kline::generate_kline(city.en, mode, json.as_deref(), chart.as_deref())?;

    let display = output.summary.display(mode);
    println!("{} ({}) - {}", city.en, mode.info().label, display.date_range);
    println!(
        "Weeks: {} (up {}, down {})",
        display.total_weeks, display.up_weeks, display.down_weeks
    );
    println!(
        "High: {}  Low: {}  Avg change: {}",
        display.max_high, display.min_low, display.avg_change
    );

    if json.is_none() && chart.is_none() {
        for candle in &output.candles {
            println!(
                "{:<9} {}  O {:>8.2}  C {:>8.2}  H {:>8.2}  L {:>8.2}",
                candle.week.to_string(),
                candle.date,
                candle.open,
                candle.close,
                candle.high,
                candle.low
            );
        }
    }

    Ok(())
}

fn run_report(command: ReportCommands) -> Result<()> {
    match command {
        ReportCommands::Generate { city, mode } => {
            let stored = report::generate_report(&city, mode)?;
            print_report(&stored);
        }
        ReportCommands::GenerateAll => {
            let batch = report::generate_all()?;
            println!(
                "Generated {} reports: {} ok, {} failed",
                batch.total, batch.success, batch.failed
            );
        }
        ReportCommands::Get { city, mode } => match report::get_report(&city, mode)? {
            Some(stored) => print_report(&stored),
            None => println!("No report for {} ({}) yet", city, mode),
        },
        ReportCommands::List => {
            let store = report::ReportStore::open_default();
            let reports = store.list()?;
            if reports.is_empty() {
                println!("No reports in {}", store.path().display());
            }
            for stored in reports {
                println!(
                    "{}  {:<14} {:<13} {}",
                    stored.update_time.format("%Y-%m-%d %H:%M"),
                    stored.city,
                    stored.mode.id(),
                    stored.keywords.join(", ")
                );
            }
        }
        ReportCommands::Stats => {
            let stats = report::ReportStore::open_default().stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}

fn print_report(stored: &report::StoredReport) {
    println!("{} ({}) updated {}", stored.city_name, stored.mode, stored.update_time.to_rfc3339());
    if !stored.keywords.is_empty() {
        println!("Keywords: {}", stored.keywords.join(" / "));
    }
    println!();
    println!("{}", stored.report);
}
