use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{CsvUpload, HttpApiClient, SafeRoutesSession};
use shared::domain::Coordinate;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;

use config::load_settings;
use input::{parse_coordinate, parse_route_line};
use render::render_view;

#[derive(Parser, Debug)]
#[command(name = "safe-routes", about = "Accident statistics and safest-route lookup")]
struct Cli {
    /// Overrides the configured accident service base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Per-request timeout; must be at least one second.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the statistics summary.
    Stats,
    /// Upload a semicolon-delimited accident CSV, then refresh statistics.
    Upload { path: Option<PathBuf> },
    /// Compute the safest route and list accidents near the origin.
    Route {
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        origin: Coordinate,
        #[arg(long, value_parser = parse_coordinate, allow_hyphen_values = true)]
        destination: Coordinate,
        #[arg(long)]
        radius_km: Option<f64>,
    },
    /// Read `LAT,LON LAT,LON` lines from stdin; every line supersedes the
    /// previous route request.
    Interactive {
        #[arg(long)]
        radius_km: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = url;
    }
    if let Some(secs) = cli.timeout_secs {
        settings.request_timeout_secs = secs;
    }
    info!(api_base_url = %settings.api_base_url, timeout_secs = settings.request_timeout_secs, "starting");

    let api = HttpApiClient::new(&settings.api_base_url, settings.request_timeout())?;
    let session = SafeRoutesSession::new(Arc::new(api));
    session.start().await;

    match cli.command {
        Command::Stats => {}
        Command::Upload { path } => {
            let file = match path {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            let outcome = session.uploads().submit(file).await?;
            if !outcome.stats_refreshed {
                warn!("statistics were not refreshed after upload");
            }
        }
        Command::Route {
            origin,
            destination,
            radius_km,
        } => {
            let radius_km = radius_km.unwrap_or(settings.nearby_radius_km);
            let outcome = session
                .routes()
                .compute_safe_route(origin, destination, radius_km)
                .await?;
            for failure in &outcome.failures {
                eprintln!("warning: {failure}");
            }
        }
        Command::Interactive { radius_km } => {
            let radius_km = radius_km.unwrap_or(settings.nearby_radius_km);
            run_interactive(Arc::clone(&session), radius_km).await?;
        }
    }

    print!("{}", render_view(&session.snapshot().await));
    Ok(())
}

async fn read_upload(path: &Path) -> Result<CsvUpload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(CsvUpload { filename, bytes })
}

async fn run_interactive(session: Arc<SafeRoutesSession>, radius_km: f64) -> Result<()> {
    let mut updates = session.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let text = render_view(&updates.borrow_and_update());
            println!("{text}");
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut inflight = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let (origin, destination) = match parse_route_line(&line) {
            Ok(pair) => pair,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        // The generation is claimed here, in line order, before the work is
        // handed to a task.
        match session.routes().begin(origin, destination).await {
            Ok(ticket) => {
                let session = Arc::clone(&session);
                inflight.push(tokio::spawn(async move {
                    session.routes().run(ticket, radius_km).await
                }));
            }
            Err(err) => eprintln!("rejected input: {err}"),
        }
    }

    for task in inflight {
        let outcome = task.await.context("route task panicked")?;
        if outcome.superseded {
            info!(generation = outcome.generation.0, "superseded by later input");
            continue;
        }
        for failure in &outcome.failures {
            eprintln!("warning: {failure}");
        }
    }

    renderer.abort();
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
