use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use log::info;

use rating_fit::config::{self, Config, arg_value, has_flag};
use rating_fit::fake_source::FakeRecordSource;
use rating_fit::logging;
use rating_fit::players::load_player_list;
use rating_fit::regression::Estimator;
use rating_fit::runner::run_scrape;
use rating_fit::source::{HttpRecordSource, RecordSource};

const DEFAULT_LOG_FILE: &str = "player_stats.log";

fn main() -> Result<()> {
    config::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = Config::from_env()?;
    cfg.apply_args(&args);
    let log_file = cfg
        .log_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    logging::init(Some(log_file.as_path()))?;

    let players = load_player_list(&cfg.players_file, &cfg.date_range)?;
    if players.is_empty() {
        return Err(anyhow!(
            "no players listed in {}",
            cfg.players_file.display()
        ));
    }

    let store = cfg.model_store();
    let mut estimator = if has_flag(&args, "--fresh") {
        Estimator::with_store(store)
    } else {
        Estimator::resume(store).context("resume stored dataset")?
    };
    info!(
        "starting scrape of {} players with {} stored observations",
        players.len(),
        estimator.dataset().len()
    );

    let mut source: Box<dyn RecordSource> = match arg_value(&args, "--replay") {
        Some(path) => Box::new(FakeRecordSource::from_file(&PathBuf::from(path))?),
        None => Box::new(HttpRecordSource::new(
            cfg.fetch_timeout,
            cfg.debug_dir.clone(),
        )?),
    };

    let summary = run_scrape(source.as_mut(), &players, &mut estimator, |player, est| {
        println!("Data received for player: {}", player.name);
        println!("Observations: {}", est.dataset().len());
        if let Some(weights) = est.weights() {
            println!("Weights: {weights}");
        }
        println!("Dataset and weights saved.");
    })
    .context("persist dataset")?;

    println!();
    println!("Scrape complete");
    println!("Players: {}", summary.attempted);
    println!("Accepted: {}", summary.accepted);
    println!("Rejected (zero stats): {}", summary.rejected);
    println!("Unavailable: {}", summary.unavailable);
    println!("Failed: {}", summary.failed);
    if !summary.errors.is_empty() {
        println!("  errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(6) {
            println!("   - {err}");
        }
    }
    println!("Log: {}", log_file.display());
    Ok(())
}
