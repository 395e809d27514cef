use anyhow::{Context, Result, anyhow};

use rating_fit::config::{self, Config};
use rating_fit::logging;
use rating_fit::predict::evaluate;
use rating_fit::regression::Estimator;

fn main() -> Result<()> {
    config::load_dotenv();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = Config::from_env()?;
    cfg.apply_args(&args);
    logging::init(cfg.log_file.as_deref())?;

    let store = cfg.model_store();
    let stats_path = store.stats_path().to_path_buf();
    let mut estimator = Estimator::load(store).context("load stored dataset")?;
    let weights = estimator
        .refit()
        .context("refit stored dataset")?
        .ok_or_else(|| anyhow!("no observations in {}", stats_path.display()))?;

    println!("Observations: {}", estimator.dataset().len());
    println!("Weights: {weights}");
    if let Some(report) = evaluate(estimator.dataset(), &weights) {
        println!("{report}");
    }
    Ok(())
}
