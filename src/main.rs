use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;

use rating_fit::config::{self, Config, arg_value, has_flag};
use rating_fit::logging;
use rating_fit::predict::{evaluate, predict};
use rating_fit::prompt::prompt_features;
use rating_fit::report_export::export_evaluation;

fn main() -> Result<()> {
    config::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = Config::from_env()?;
    cfg.apply_args(&args);
    logging::init(cfg.log_file.as_deref())?;

    let store = cfg.model_store();
    let weights = store
        .load_weights()
        .with_context(|| format!("load weights from {}", store.weights_path().display()))?;
    let dataset = store
        .load_dataset()
        .context("load stored dataset")?
        .unwrap_or_default();

    match evaluate(&dataset, &weights) {
        Some(report) => {
            println!("{report}");
            if let Some(out) = arg_value(&args, "--out") {
                let out_path = PathBuf::from(out);
                export_evaluation(&out_path, &report, &weights)?;
                println!("report written: {}", out_path.display());
            }
        }
        None => warn!(
            "no stored observations in {}, skipping evaluation",
            store.stats_path().display()
        ),
    }

    if has_flag(&args, "--no-prompt") {
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    match prompt_features(&mut input, &mut output).context("read stats from stdin")? {
        Some(features) => {
            println!("Your predicted rating: {:.2}", predict(&features, &weights));
        }
        None => warn!("input closed before all stats were entered"),
    }
    Ok(())
}
