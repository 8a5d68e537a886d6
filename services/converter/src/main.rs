//! Converter CLI - Builds data/retailers.js from retailer POI dumps
//!
//! Responsibilities:
//! - Collect source files (explicit inputs, a directory, or a sources config)
//! - Run the conversion pipeline
//! - Print a run summary
//! - Publish the artifact with git unless told not to
//!
//! Usage:
//!   # Single workbook:
//!   cargo run --bin converter -- --input Retail_Data.xlsx
//!
//!   # Every spreadsheet/CSV in a directory (sorted by name):
//!   cargo run --bin converter -- --input-dir ./dump --no-publish
//!
//!   # From config:
//!   cargo run --bin converter -- --config config/sources.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use converter::discover::{discover, DEFAULT_PATTERNS};
use converter::emit::group_thousands;
use converter::{
    ConvertError, ConverterConfig, GitPublisher, Publisher, PublishOutcome, RunReport, Settings,
    SheetSelection, SourcePlan, SourceRef, SourceStatus, SourcesConfig,
};

#[derive(Parser, Debug)]
#[command(name = "converter", about = "Converts retailer POI spreadsheets into a JavaScript data file")]
struct Args {
    /// Source file (xlsx, xls, xlsm, xlsb, ods or csv). Repeatable; order is kept
    #[arg(long = "input", short = 'i')]
    inputs: Vec<PathBuf>,

    /// Directory to scan for source files
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Glob patterns used with --input-dir
    #[arg(long = "pattern", default_values_t = DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect::<Vec<_>>())]
    patterns: Vec<String>,

    /// Path to sources config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only use this source id from the config file
    #[arg(long)]
    source_id: Option<String>,

    /// Which workbook sheets to read
    #[arg(long, value_enum, default_value_t = SheetSelection::All)]
    sheets: SheetSelection,

    /// Output file (overrides OUTPUT_FILE)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Title written in the artifact header
    #[arg(long, default_value = converter::emit::DEFAULT_TITLE)]
    title: String,

    /// Add a generation timestamp to the header (output is no longer byte-stable)
    #[arg(long, default_value = "false")]
    stamp: bool,

    /// Skip git add/commit/push
    #[arg(long, default_value = "false")]
    no_publish: bool,
}

fn collect_refs(args: &Args) -> Result<Vec<SourceRef>> {
    let mut refs: Vec<SourceRef> = args
        .inputs
        .iter()
        .map(|p| SourceRef::new(p).with_sheets(args.sheets))
        .collect();

    if let Some(dir) = &args.input_dir {
        refs.extend(discover(dir, &args.patterns, args.sheets)?);
    }

    if let Some(config_path) = &args.config {
        info!("Loading sources from: {}", config_path.display());
        let sources_config = SourcesConfig::load(config_path)?;
        info!("Config version: {}", sources_config.version);
        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let selected = sources_config.source_refs(base, args.source_id.as_deref());
        if selected.is_empty() {
            anyhow::bail!("No sources match the filter criteria");
        }
        refs.extend(selected);
    }

    if refs.is_empty() {
        anyhow::bail!(
            "Must specify at least one of:\n  \
             --input <file>, --input-dir <dir>, or --config <path>"
        );
    }
    Ok(refs)
}

fn print_summary(report: &RunReport) {
    info!("{:=<70}", "");
    for source in &report.sources {
        match &source.status {
            SourceStatus::Complete => info!("  ✓ {} ({} records)", source.name, source.rows),
            status => warn!("  ✗ {} ({} records, {})", source.name, source.rows, status),
        }
    }
    if report.coercion_issues > 0 {
        warn!(
            "  {} field value(s) could not be coerced and were set to null",
            report.coercion_issues
        );
    }
    let meta = &report.metadata;
    info!(
        "  File: {} ({:.2} MB)",
        report.artifact.display(),
        report.emitted.bytes as f64 / (1024.0 * 1024.0)
    );
    info!("  Hash: {}", report.emitted.content_hash);
    info!("  Total retailers: {}", group_thousands(meta.total));
    info!("  Police forces: {}", meta.unique_police_forces);
    info!("  Locations: {}", meta.unique_localities);
    info!("  Categories: {}", meta.unique_categories);

    match &report.publish {
        PublishOutcome::Skipped => info!("  Publish skipped"),
        PublishOutcome::Published => info!("  Pushed to remote"),
        PublishOutcome::Failed {
            error,
            manual_steps,
        } => {
            warn!("  Git error: {}", error);
            warn!("  File created locally. Push manually with:");
            for step in manual_steps {
                warn!("      {}", step);
            }
        }
    }
    info!("{:=<70}", "");
}

fn try_main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let settings = Settings::from_env()?;

    info!("=== Retailer Database Converter ===");

    let refs = collect_refs(&args)?;
    info!("Sources: {}", refs.len());
    for r in &refs {
        info!("  {}", r.path.display());
    }

    let output = args.output.clone().unwrap_or_else(|| settings.output_file.clone());
    let mut config = ConverterConfig::new(output);
    config.title = args.title.clone();
    config.stamp_generated_at = args.stamp;
    config.progress_every = settings.progress_every;
    info!("Output: {}", config.output_path.display());

    let git = GitPublisher::new(&settings.repo_path, &settings.git_remote, &settings.git_branch);
    let publisher: Option<&dyn Publisher> = if args.no_publish { None } else { Some(&git as &dyn Publisher) };

    let plan = SourcePlan::from_refs(&refs);
    match converter::run(&config, plan, publisher) {
        Ok(report) => {
            print_summary(&report);
            info!("Conversion complete!");
            Ok(ExitCode::SUCCESS)
        }
        Err(ConvertError::EmptyInput { sources }) => {
            error!("No retailers extracted from {} source(s); no artifact written", sources);
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e).context("Conversion failed"),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match try_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
