use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use insert_driver::{Driver, DriverEvent};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing::{info, warn};
use visualizer::{algorithm_page, DocumentLocator, TreeVisualizer};

mod config;
mod demo;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
#[command(name = "inserter", about = "Feeds a fixed key sequence into a red-black tree visualizer")]
struct Cli {
    #[arg(long, default_value = "inserter.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Drive the visualizer with the insert sequence (default).
    Drive,
    /// Print a tree before and after a batch of deletes.
    Print,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (settings, warnings) = load_settings(&cli.config);
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();
    for warning in &warnings {
        warn!("{warning}");
    }

    match cli.command.unwrap_or(Command::Drive) {
        Command::Drive => drive(&settings).await,
        Command::Print => {
            print!("{}", demo::insert_delete_demo());
            Ok(())
        }
    }
}

async fn drive(settings: &Settings) -> Result<()> {
    let page = algorithm_page().context("failed to build the algorithm page")?;
    let view = TreeVisualizer::install(
        &page.document,
        page.insert_field,
        Duration::from_millis(settings.animation_step_ms),
    )?;

    // a missing insert field ends the run right here
    let driver = Driver::attach(&DocumentLocator::new(page.document.clone()))?;
    let total = driver.sequence().len();
    let progress = tokio::spawn(report_progress(
        BroadcastStream::new(driver.subscribe()),
        total,
    ));

    driver.run().await?;
    drop(driver);
    let polls = progress.await.context("progress reporter panicked")?;

    info!(keys = view.snapshot().len(), polls, "visualizer filled");
    if let Err(violation) = view.validate() {
        warn!(%violation, "visualized tree is not balanced");
    }
    if settings.print_tree {
        print!("{}", view.render());
    }
    Ok(())
}

/// Logs every tenth completed insert; returns how many busy polls were seen.
async fn report_progress(mut events: BroadcastStream<DriverEvent>, total: usize) -> u64 {
    let mut polls = 0;
    while let Some(event) = events.next().await {
        match event {
            Ok(DriverEvent::Advanced { cursor }) if (cursor + 1) % 10 == 0 => {
                info!(done = cursor + 1, total, "progress");
            }
            Ok(DriverEvent::Polled { .. }) => polls += 1,
            Ok(_) => {}
            Err(error) => warn!(%error, "progress reporter fell behind"),
        }
    }
    polls
}
