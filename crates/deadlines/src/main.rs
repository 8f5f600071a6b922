mod render;
mod sources;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use deadlines_core::{run, RunConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::render::{deadline_table, problem_lines, report_json};
use crate::sources::{load_config, load_snapshot};

#[derive(Parser, Debug)]
#[command(author, version, about = "Conference deadline aggregator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the filtered deadline list once
    Show(ShowArgs),
    /// Redraw the countdown table on a fixed tick, re-reading sources each time
    Watch(WatchArgs),
    /// Report malformed dates and unusable records across all sources, unfiltered
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Snapshot file (.json, .yml or .yaml); later files override earlier ones
    #[arg(long = "source", required = true)]
    sources: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[command(flatten)]
    input: SourceArgs,
    /// TOML run configuration (defaults to $DEADLINES_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
    /// Also list deadlines that have already passed
    #[arg(long)]
    past: bool,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[command(flatten)]
    input: SourceArgs,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Refresh period in milliseconds
    #[arg(long, default_value_t = 500)]
    interval_ms: u64,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    input: SourceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Show(args) => handle_show(args),
        Command::Watch(args) => handle_watch(args).await,
        Command::Check(args) => handle_check(args),
    }
}

fn handle_show(args: ShowArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let snapshot = load_snapshot(&args.input.sources)?;
    let report = run(&snapshot, &config, Utc::now())?;

    if args.json {
        println!("{}", report_json(&report, args.past)?);
        return Ok(());
    }

    println!("{}", deadline_table(&report.upcoming_rows()));
    if args.past {
        println!("\nPassed deadlines:");
        println!("{}", deadline_table(&report.past_rows()));
    }
    for line in problem_lines(&report) {
        eprintln!("{line}");
    }
    Ok(())
}

async fn handle_watch(args: WatchArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut interval = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    info!(interval_ms = args.interval_ms, sources = args.input.sources.len(), "watching deadlines");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // A source mid-rewrite should not end the watch; the next tick retries.
                if let Err(err) = redraw(&args.input.sources, &config) {
                    warn!(error = %err, "refresh failed");
                }
            }
            _ = &mut shutdown => {
                info!("stopping watch");
                return Ok(());
            }
        }
    }
}

fn redraw(sources: &[PathBuf], config: &RunConfig) -> Result<()> {
    let snapshot = load_snapshot(sources)?;
    let report = run(&snapshot, config, Utc::now())?;
    // clear screen, cursor home
    print!("\x1B[2J\x1B[H");
    println!("{}", deadline_table(&report.upcoming_rows()));
    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<()> {
    let snapshot = load_snapshot(&args.input.sources)?;
    let report = run(&snapshot, &RunConfig::default(), Utc::now())?;

    let problems = problem_lines(&report);
    for line in &problems {
        println!("{line}");
    }
    info!(
        upcoming = report.upcoming.len(),
        past = report.past.len(),
        problems = problems.len(),
        "check finished"
    );
    if !problems.is_empty() {
        bail!("{} problem(s) found across {} source(s)", problems.len(), snapshot.sources.len());
    }
    println!("All sources are clean.");
    Ok(())
}
