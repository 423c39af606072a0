use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use rift_recap::config::Config;
use rift_recap::display::output::{display_error, display_info, display_report, display_success};
use rift_recap::error::AppError;
use rift_recap::pipeline::{ProgressEvent, StatsEngine};
use rift_recap::server;
use rift_recap::server::query::{validate, RawStatsQuery};

#[derive(Parser, Debug)]
#[command(name = "Rift Recap")]
#[command(about = "Per-player season champion and lane statistics from match history", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Bind address (overrides BIND_ADDR)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Print a season report for one player
    Report {
        /// Riot ID, formatted Name#TAG
        riot_id: String,

        /// Season year (default: current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Comma-separated queue ids, e.g. 420,440
        #[arg(short, long)]
        queues: Option<String>,

        /// Force a cluster (americas, asia, europe) instead of
        /// auto-detecting
        #[arg(short, long)]
        cluster: Option<String>,

        /// Maximum matches to retrieve (50-2000)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Bucketing mode: year, patch, patches, splits, custom
        #[arg(short, long)]
        mode: Option<String>,

        /// Patch (MAJOR.MINOR), required with --mode patch
        #[arg(long)]
        patch: Option<String>,

        /// Patch buckets to keep with --mode patches (1-20)
        #[arg(long)]
        patch_count: Option<usize>,

        /// Range start (YYYY-MM-DD) with --mode custom
        #[arg(long)]
        from: Option<String>,

        /// Range end (YYYY-MM-DD) with --mode custom
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rift_recap=info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        display_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    match args.command {
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            let engine = Arc::new(StatsEngine::new(config)?);
            server::serve(engine, &addr).await?;
            Ok(())
        }
        Command::Report {
            riot_id,
            year,
            queues,
            cluster,
            limit,
            mode,
            patch,
            patch_count,
            from,
            to,
        } => {
            config
                .require_api_key()
                .context("set RIOT_API_KEY in the environment or a .env file")?;

            let raw = RawStatsQuery {
                riot_id: Some(riot_id),
                year: year.map(|y| y.to_string()),
                queues,
                cluster,
                limit: limit.map(|l| l.to_string()),
                mode,
                patch,
                patch_count: patch_count.map(|n| n.to_string()),
                from,
                to,
            };
            let req = validate(&raw, &config.default_queues).map_err(|issues| {
                let details = issues
                    .iter()
                    .map(|i| format!("{}: {}", i.field, i.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                anyhow!(AppError::InvalidQuery(issues)).context(details)
            })?;

            let engine = Arc::new(StatsEngine::new(config)?);
            report(engine, req).await
        }
    }
}

/// Drives the progress event channel in the terminal: the same
/// protocol the SSE endpoint speaks, consumed in-process.
async fn report(engine: Arc<StatsEngine>, req: rift_recap::pipeline::StatsRequest) -> anyhow::Result<()> {
    let mut rx = engine.stream(req);
    let mut bar: Option<ProgressBar> = None;

    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::Phase { phase } => {
                display_info(&format!("{phase:?}..."));
            }
            ProgressEvent::Meta { meta } => {
                display_success(&format!(
                    "Resolved {} on {} ({})",
                    meta.riot_id, meta.cluster, meta.year
                ));
            }
            ProgressEvent::Ids { total } => {
                display_success(&format!("Found {total} matches to analyze"));
                let pb = ProgressBar::new(total as u64);
                pb.set_message("Fetching match details");
                bar = Some(pb);
            }
            ProgressEvent::Progress { processed, .. } => {
                if let Some(pb) = &bar {
                    pb.set_position(processed as u64);
                }
            }
            ProgressEvent::Done { result } => {
                if let Some(pb) = bar.take() {
                    pb.finish_with_message("✓ Match data fetched");
                }
                display_report(&result);
                return Ok(());
            }
            ProgressEvent::Error { error } => {
                if let Some(pb) = bar.take() {
                    pb.abandon();
                }
                return Err(anyhow!("stats pipeline failed: {error}"));
            }
        }
    }

    Err(anyhow!("event stream ended without a terminal event"))
}
