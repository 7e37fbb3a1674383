mod category;
mod config;
mod controls;
mod filter;
mod lanes;
mod normalize;
mod scanner;
mod server;
mod view;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use timeline_types::{Category, TimelineData};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const OUTPUT_FILE: &str = "timeline_data.json";

#[derive(Parser)]
#[command(name = "history_timeline", about = "Chinese history timeline builder and viewer")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize dynasties/events/figures CSV tables → timeline_data.json
    Process {
        /// Directory holding dynasties.csv, events.csv and figures.csv
        #[arg(default_value = "data")]
        data_dir: PathBuf,
        /// Output path (default: <data_dir>/timeline_data.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve the interactive timeline page
    Serve {
        /// Consolidated JSON (default: $TIMELINE_DATA or data/timeline_data.json)
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Print dataset statistics
    Summary {
        #[arg(long, default_value = config::DEFAULT_DATA_PATH)]
        data: PathBuf,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Process { data_dir, output } => run_process(&data_dir, output),
        Command::Serve { data } => run_serve(data).await,
        Command::Summary { data } => run_summary(&data),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  JSON FILE HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data).context("serializing timeline")?;
    std::fs::write(path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    eprintln!("  {} ({} bytes)", path.display(), json.len());
    Ok(())
}

fn read_timeline(path: &Path) -> anyhow::Result<TimelineData> {
    let json = std::fs::read_to_string(path).with_context(|| {
        format!(
            "cannot read {} (run `process` first to generate it)",
            path.display()
        )
    })?;
    serde_json::from_str(&json).with_context(|| format!("cannot parse {}", path.display()))
}

// ═══════════════════════════════════════════════════════════════════════
//  PROCESS MODE: CSV tables → consolidated JSON
// ═══════════════════════════════════════════════════════════════════════

fn run_process(data_dir: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    eprintln!("Scanning data directory: {}", data_dir.display());

    let data = normalize::normalize_dir(data_dir).inspect_err(|e| error!(%e, "normalization failed"))?;
    let output = output.unwrap_or_else(|| data_dir.join(OUTPUT_FILE));

    eprintln!("Writing:");
    write_json(&output, &data)?;
    print_stats(&data);
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════
//  SERVE MODE: page + interaction API
// ═══════════════════════════════════════════════════════════════════════

async fn run_serve(data: Option<PathBuf>) -> anyhow::Result<()> {
    let mut settings = config::load_settings()?;
    if let Some(path) = data {
        settings.data_path = path;
    }

    let timeline = read_timeline(&settings.data_path)
        .inspect_err(|e| error!(path = %settings.data_path.display(), error = %e, "failed to load timeline data"))?;
    info!(
        dynasties = timeline.dynasties.len(),
        events = timeline.events.len(),
        figures = timeline.figures.len(),
        "timeline data loaded"
    );

    server::serve(&settings, timeline).await
}

// ═══════════════════════════════════════════════════════════════════════
//  SUMMARY MODE
// ═══════════════════════════════════════════════════════════════════════

fn run_summary(path: &Path) -> anyhow::Result<()> {
    let data = read_timeline(path)?;
    print_stats(&data);
    Ok(())
}

fn print_stats(data: &TimelineData) {
    eprintln!("\n══════════════════════════════════════════");
    eprintln!("  TIMELINE STATISTICS");
    eprintln!("══════════════════════════════════════════");

    eprintln!(
        "\nTime range: {} – {}",
        controls::format_year(data.time_range.min_year),
        controls::format_year(data.time_range.max_year)
    );
    eprintln!("  Dynasties: {}", data.dynasties.len());
    eprintln!("  Events:    {}", data.events.len());
    eprintln!("  Figures:   {}", data.figures.len());

    let mut by_category: HashMap<Category, usize> = HashMap::new();
    let mut unknown = 0usize;
    for e in &data.events {
        match e.category_kind() {
            Some(c) => *by_category.entry(c).or_insert(0) += 1,
            None => unknown += 1,
        }
    }
    eprintln!("\nEvents by category:");
    for c in Category::ALL {
        let count = by_category.get(&c).copied().unwrap_or(0);
        eprintln!("  {}: {count}", c.as_chinese());
    }
    if unknown > 0 {
        eprintln!("  (unrecognized): {unknown}");
    }

    let mut by_importance = [0usize; 5];
    for imp in data
        .events
        .iter()
        .map(|e| e.importance)
        .chain(data.figures.iter().map(|f| f.importance))
    {
        by_importance[usize::from(imp.clamp(1, 5)) - 1] += 1;
    }
    eprintln!("\nEvents + figures by importance:");
    for (i, count) in by_importance.iter().enumerate().rev() {
        eprintln!("  {}: {count}", i + 1);
    }

    let mut longest: Vec<_> = data.dynasties.iter().collect();
    longest.sort_by_key(|d| std::cmp::Reverse(d.duration));
    eprintln!("\nLongest dynasties:");
    for d in longest.iter().take(5) {
        eprintln!("  {} ({} years)", d.id, d.duration);
    }
}
