use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubelens::config::{RunConfig, Section};
use tubelens::engine::{Engine, Report};
use tubelens::models::RawItemRecord;

#[derive(Parser)]
#[command(
    name = "tubelens",
    version,
    about = "Video platform analytics: trend scoring, competitor comparison, keyword extraction",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analytics pipeline over a batch of fetched records
    Analyze {
        /// JSON file holding an array of raw records
        #[arg(short, long)]
        input: PathBuf,

        /// TOML run configuration; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print a human-readable summary instead of the JSON report
        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// Extract and rank keywords from a batch, skipping the other sections
    Keywords {
        /// JSON file holding an array of raw records
        #[arg(short, long)]
        input: PathBuf,

        /// Keep only the top N terms per list
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    tracing::info!("tubelens analytics engine starting");

    match cli.command {
        Commands::Analyze {
            input,
            config,
            pretty,
        } => {
            tracing::info!(
                input = %input.display(),
                config = ?config,
                pretty = %pretty,
                "Starting analyze command"
            );
            analyze(&input, config.as_deref(), pretty).await?;
        }

        Commands::Keywords { input, limit } => {
            tracing::info!(
                input = %input.display(),
                limit = ?limit,
                "Starting keywords command"
            );
            keywords(&input, limit).await?;
        }
    }

    tracing::info!("tubelens completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("tubelens=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("tubelens=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}

fn load_batch(path: &Path) -> Result<Vec<RawItemRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of raw records", path.display()))
}

async fn analyze(input: &Path, config_path: Option<&Path>, pretty: bool) -> Result<()> {
    let batch = load_batch(input)?;
    let config = match config_path {
        Some(path) => RunConfig::from_toml_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };

    let engine = Engine::new(config)?;
    let report = engine.run(batch).await?;

    if pretty {
        print_summary(&report);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn keywords(input: &Path, limit: Option<usize>) -> Result<()> {
    let batch = load_batch(input)?;
    let config = RunConfig {
        sections: vec![Section::Keywords],
        keyword_limit: limit,
        ..Default::default()
    };

    let report = Engine::new(config)?.run(batch).await?;
    match report.keywords.as_ref().and_then(|s| s.available()) {
        Some(output) => {
            println!("{:<28} {:>8} {:>6} {:>10}", "term", "freq", "docs", "score");
            for stat in output.keywords.iter().chain(output.bigrams.iter()) {
                println!(
                    "{:<28} {:>8} {:>6} {:>10.3}",
                    stat.term, stat.frequency, stat.doc_frequency, stat.score
                );
            }
        }
        None => println!("no keywords: batch has no usable text"),
    }
    Ok(())
}

fn print_summary(report: &Report) {
    println!("run {} ({} identifiers)", report.run_id, report.identifiers);
    let d = &report.diagnostics;
    println!(
        "records: {} in, {} kept, {} skipped, {} collisions, {} degenerate pairs, {} excluded points",
        d.records_total, d.records_normalized, d.skipped, d.collisions, d.degenerate,
        d.excluded_points
    );

    if let Some(section) = &report.trend {
        println!("\n== trend ==");
        match section.available() {
            Some(output) => {
                for score in &output.scores {
                    let engagement = score
                        .latest_engagement
                        .map_or_else(|| "n/a".to_string(), |r| format!("{:.2}%", r * 100.0));
                    println!(
                        "{:>3}. {:<24} score {:>12.3}  engagement {}",
                        score.rank, score.id, score.score, engagement
                    );
                }
                for skipped in &output.insufficient {
                    println!(
                        "  -  {:<24} insufficient data ({}/{} observations)",
                        skipped.id, skipped.observations, skipped.required
                    );
                }
            }
            None => println!("(unavailable)"),
        }
    }

    if let Some(section) = &report.comparison {
        println!("\n== comparison ==");
        match section.available() {
            Some(output) => {
                for comparison in &output.comparisons {
                    println!(
                        "{} vs {} ({} points, {} excluded)",
                        comparison.left,
                        comparison.right,
                        comparison.points.len(),
                        comparison.excluded_points
                    );
                    for (metric, summary) in &comparison.per_metric {
                        println!(
                            "  {:<12} {} leads {} / {} / {} ties",
                            metric.as_str(),
                            comparison.left,
                            summary.leaders.left,
                            summary.leaders.right,
                            summary.leaders.ties
                        );
                    }
                }
            }
            None => println!("(unavailable)"),
        }
    }

    if let Some(section) = &report.keywords {
        println!("\n== keywords ==");
        match section.available() {
            Some(output) => {
                for stat in output.keywords.iter().take(15) {
                    println!("  {:<24} score {:.3}", stat.term, stat.score);
                }
            }
            None => println!("(unavailable)"),
        }
    }
}
