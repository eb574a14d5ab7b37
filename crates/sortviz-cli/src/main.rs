//! sortviz CLI
//!
//! Main entry point for serving the visualizer and tracing engines offline.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sortviz_engine::Algorithm;
use sortviz_orchestrator::shuffle::{self, ShuffleRequest};
use sortviz_orchestrator::{create_router, AppState, Config, Driver, TutorSession};
use sortviz_report::{json::JsonGenerator, MarkdownGenerator, TraceReport};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Default port for the HTTP API server.
const DEFAULT_PORT: u16 = 3000;

/// sortviz - Sorting Algorithm Visualizer
///
/// Animates sorting algorithms step by step and streams every frame to the
/// browser, with an optional Socratic tutor steering the display.
#[derive(Parser, Debug)]
#[command(name = "sortviz")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the playback driver with its HTTP API and WebSocket stream
    Serve(ServeArgs),
    /// Run one algorithm offline and print a report of its trace
    Trace(TraceArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Path to configuration file (default: sortviz.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Port for the HTTP API server
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Delay between animation steps in milliseconds
    #[arg(short, long, value_name = "MS")]
    speed: Option<u64>,

    /// Algorithm selected at start-up (e.g. quickSort)
    #[arg(short, long, value_name = "ID")]
    algorithm: Option<String>,

    /// Base URL of the tutor service; enables the tutor
    #[arg(long, value_name = "URL")]
    tutor_url: Option<String>,
}

#[derive(Args, Debug)]
struct TraceArgs {
    /// Algorithm to run (e.g. mergeSort)
    #[arg(value_name = "ALGORITHM")]
    algorithm: String,

    /// Comma-separated input values
    #[arg(short, long, value_name = "VALUES", conflicts_with = "random")]
    data: Option<String>,

    /// Use N random values instead of --data
    #[arg(short, long, value_name = "N")]
    random: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Markdown)]
    format: ReportFormat,

    /// Include every step in the report
    #[arg(long)]
    steps: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Trace(args) => trace(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs the driver and the HTTP server until Ctrl+C.
async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    // Apply CLI argument overrides
    if let Some(speed) = args.speed {
        config.animation_speed_ms = speed;
    }
    if let Some(ref algorithm) = args.algorithm {
        config.default_algorithm = algorithm.parse()?;
    }
    if let Some(ref url) = args.tutor_url {
        config.tutor.enabled = true;
        config.tutor.base_url.clone_from(url);
    }

    // Re-validate after overrides
    config.validate()?;

    tracing::info!(
        algorithm = %config.default_algorithm,
        speed_ms = config.animation_speed_ms,
        tutor = config.tutor.enabled,
        "sortviz starting"
    );

    let driver = Driver::new(&config);
    let mut app_state = AppState::new(driver.clone());
    if let Some(tutor) = TutorSession::from_config(driver.clone(), &config.tutor)? {
        app_state = app_state.with_tutor(tutor);
    }
    let router = create_router(app_state);

    let addr: SocketAddr = ([127, 0, 0, 1], args.port).into();
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("sortviz running on http://{addr}");
    println!("WebSocket stream at ws://{addr}/ws");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(driver))
        .await?;

    println!("Stopped");
    Ok(())
}

/// Waits for Ctrl+C, then stops the animation before the server drains.
async fn shutdown_signal(driver: Driver) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Received Ctrl+C, shutting down");
    let snapshot = driver.stop().await;
    tracing::info!(epoch = snapshot.epoch, "Driver stopped");
}

/// Runs one engine offline and writes its report.
fn trace(args: &TraceArgs) -> anyhow::Result<()> {
    let algorithm: Algorithm = args.algorithm.parse()?;

    let input = match (&args.data, args.random) {
        (Some(data), _) => parse_values(data)?,
        (None, Some(size)) => {
            shuffle::generate(&ShuffleRequest::new(size), &Config::default().shuffle)?
        }
        (None, None) => Config::default().seed_array,
    };

    let report = TraceReport::build(algorithm, &input, args.steps)?;
    tracing::debug!(
        algorithm = %algorithm,
        steps = report.step_count(),
        "Trace complete"
    );

    let rendered = match args.format {
        ReportFormat::Markdown => MarkdownGenerator::new(&report).generate(),
        ReportFormat::Json => JsonGenerator::new(&report).generate_pretty()?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered).map_err(|e| {
                anyhow::anyhow!("Failed to write report to '{}': {e}", path.display())
            })?;
            println!("Report written to {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&Path>) -> anyhow::Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Parses a comma-separated list of numbers.
fn parse_values(input: &str) -> anyhow::Result<Vec<f64>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>().map_err(|_| {
                anyhow::anyhow!(
                    "Invalid value '{part}'\n\nSuggestion: Pass numbers separated by commas, e.g. --data 5,3,8,1"
                )
            })
        })
        .collect()
}
