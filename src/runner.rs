use log::{error, info, warn};

use crate::players::PlayerEntry;
use crate::regression::{Estimator, EstimatorError};
use crate::source::RecordSource;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// Fetches each player in turn and feeds usable records to the estimator.
/// Per-player failures are logged and counted; only a persistence failure
/// ends the run early.
pub fn run_scrape<S, F>(
    source: &mut S,
    players: &[PlayerEntry],
    estimator: &mut Estimator,
    mut on_accept: F,
) -> Result<RunSummary, EstimatorError>
where
    S: RecordSource + ?Sized,
    F: FnMut(&PlayerEntry, &Estimator),
{
    let mut summary = RunSummary::default();

    for player in players {
        summary.attempted += 1;

        let record = match source.fetch(player) {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("{}: stats unavailable, skipping", player.name);
                summary.unavailable += 1;
                continue;
            }
            Err(err) => {
                error!("{}: fetch failed: {err:#}", player.name);
                summary.failed += 1;
                summary.errors.push(format!("{}: {err:#}", player.name));
                continue;
            }
        };

        if let Err(err) = record.validate() {
            info!("{}: skipping record, {err}", player.name);
            summary.rejected += 1;
            continue;
        }

        match estimator.accept(record.features, record.rating) {
            Ok(_) => {
                summary.accepted += 1;
                info!(
                    "{}: accepted, dataset now has {} observations",
                    player.name,
                    estimator.dataset().len()
                );
                on_accept(player, estimator);
            }
            Err(EstimatorError::Fit(err)) => {
                error!("{}: fit failed: {err}", player.name);
                summary.failed += 1;
                summary.errors.push(format!("{}: {err}", player.name));
            }
            Err(err @ EstimatorError::Persist(_)) => return Err(err),
        }
    }

    Ok(summary)
}
