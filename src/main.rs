mod aggregate;
mod config;
mod geodesy;
mod ingest;
mod report;
mod stats;
mod web;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::config::Config;
use crate::ingest::Ingestor;
use crate::report::Report;
use crate::stats::DistanceBounds;
use crate::web::MapView;

#[derive(Parser)]
#[command(name = "ais-beam")]
#[command(about = "Reception statistics for a fixed AIS receiving station")]
struct Cli {
    /// Record file, or directory searched recursively for record files
    input: PathBuf,

    /// Verbose logging; keeps records beyond the sanity range for the report
    #[arg(long)]
    debug: bool,

    /// Serve a map of the filtered positions on this port
    #[arg(long, value_name = "PORT", num_args = 0..=1, default_missing_value = "8080")]
    display: Option<u16>,

    /// Drop samples closer than this many nautical miles (0 = off)
    #[arg(long, value_name = "NM", default_value_t = 0.0)]
    min_distance: f64,

    /// Drop samples farther than this many nautical miles (0 = off)
    #[arg(long, value_name = "NM", default_value_t = 0.0)]
    max_distance: f64,

    /// MMSIs to ignore, comma separated or repeated
    #[arg(long, value_name = "MMSI", value_delimiter = ',')]
    exclude: Vec<u64>,

    /// Station position, overriding the config file
    #[arg(long, value_name = "LAT,LON")]
    station: Option<String>,

    /// YAML config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Maps API key for --display
    #[arg(long, env = "AIS_BEAM_MAPS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if !cli.input.exists() {
        Cli::command()
            .error(
                ErrorKind::InvalidValue,
                format!("input path not found: {}", cli.input.display()),
            )
            .exit();
    }

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error reading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let station = match config.station(cli.station.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let api_key = match cli.display {
        Some(_) => match config.api_key(cli.api_key.as_deref()) {
            Ok(key) => Some(key),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let exclude: HashSet<u64> = cli.exclude.iter().copied().collect();
    let options = config.ingest_options(exclude, cli.debug);

    let outcome = match Ingestor::new(&station, &options).ingest_path(&cli.input) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if outcome.aggregation.is_empty() {
        log::warn!("No samples accepted from {}", cli.input.display());
    }
    if outcome.stats.excluded > 0 {
        log::info!("Excluded {} records in total", outcome.stats.excluded);
    }

    let bounds = DistanceBounds::new(cli.min_distance, cli.max_distance);
    let report = Report::build(station, outcome, bounds);
    if bounds.is_active() && report.filtered.is_empty() {
        log::warn!("Distance filter removed every sample");
    }

    if cli.json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error encoding report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        match report::render_text(&report) {
            Ok(text) => print!("{}", text),
            Err(e) => {
                eprintln!("Error rendering report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    match (cli.display, api_key) {
        (Some(port), Some(key)) => display(MapView::from_report(&report, key), &config, port),
        _ => ExitCode::SUCCESS,
    }
}

fn display(view: MapView, config: &Config, port: u16) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(web::run_server(view, &config.display.bind, port)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}
