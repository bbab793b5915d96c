// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// flatscan — command-line front end.
//
// Entry point. Initialises logging, loads the scanner configuration, and runs
// either corner detection or full rectification on a single photo.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use flatscan_core::error::Result;
use flatscan_core::human_errors::humanize_error;
use flatscan_core::{OutputMode, Quadrilateral, ScanConfig, TracingObserver};
use flatscan_document::{DocumentScanner, ImageCodec};

#[derive(Parser)]
#[command(name = "flatscan")]
#[command(about = "Flatten photographed documents into upright A4 pages")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rectify a photo into an A4 page image.
    Rectify(RectifyArgs),

    /// Print the detected page corners as JSON.
    Detect(DetectArgs),
}

#[derive(Debug, Clone, Args)]
struct RectifyArgs {
    /// Path to the input photo.
    input: PathBuf,

    /// Path of the output image; the format follows the extension.
    #[arg(short, long)]
    output: PathBuf,

    /// Page corners as `[[x,y],[x,y],[x,y],[x,y]]`, in any order.
    /// Detected automatically when omitted.
    #[arg(long)]
    corners: Option<String>,

    /// Keep colour or convert to black and white.
    #[arg(long, value_enum, default_value_t = ModeArg::Color)]
    mode: ModeArg,

    /// Scanner configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Path to the input photo.
    input: PathBuf,

    /// Scanner configuration (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Color,
    Bw,
}

impl From<ModeArg> for OutputMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Color => OutputMode::Color,
            ModeArg::Bw => OutputMode::BlackAndWhite,
        }
    }
}

fn main() -> ExitCode {
    // Logs go to stderr so `detect` output stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Rectify(args) => run_rectify(args),
        Commands::Detect(args) => run_detect(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            let human = humanize_error(&err);
            eprintln!("error: {}", human.message);
            eprintln!("  {}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

fn load_scanner(config: Option<&PathBuf>) -> Result<DocumentScanner> {
    let config = match config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    DocumentScanner::new(config)
}

fn run_rectify(args: &RectifyArgs) -> Result<()> {
    let scanner = load_scanner(args.config.as_ref())?;
    let corners = args
        .corners
        .as_deref()
        .map(Quadrilateral::from_json)
        .transpose()?;

    tracing::info!("Loading image: {}", args.input.display());
    let photo = ImageCodec::open(&args.input)?;

    let page = scanner.scan(
        &photo,
        corners.as_ref().map(|q| q.points().as_slice()),
        args.mode.into(),
        &TracingObserver,
    )?;
    ImageCodec::save(&page, &args.output)?;

    tracing::info!("Page written to {}", args.output.display());
    Ok(())
}

fn run_detect(args: &DetectArgs) -> Result<()> {
    let scanner = load_scanner(args.config.as_ref())?;
    let photo = ImageCodec::open(&args.input)?;
    let detection = scanner.detect_corners(&photo, &TracingObserver);
    println!("{}", serde_json::to_string_pretty(&detection)?);
    Ok(())
}
