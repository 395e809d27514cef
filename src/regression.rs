use std::fmt;

use log::debug;
use thiserror::Error;

use crate::dataset::Dataset;
use crate::features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
use crate::persist::{ModelStore, PersistError};

pub const WEIGHT_COUNT: usize = FEATURE_COUNT + 1;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("cannot fit an empty dataset")]
    EmptyDataset,
    #[error("least-squares solve failed: {0}")]
    Solver(&'static str),
    #[error("non-finite value in the dataset or the fitted weights")]
    NonFinite,
}

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error(transparent)]
    Fit(#[from] FitError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Five feature coefficients followed by the intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightVector(pub [f64; WEIGHT_COUNT]);

impl WeightVector {
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let values: [f64; WEIGHT_COUNT] = values.try_into().ok()?;
        Some(Self(values))
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.0[..FEATURE_COUNT]
    }

    pub fn intercept(&self) -> f64 {
        self.0[FEATURE_COUNT]
    }
}

impl fmt::Display for WeightVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in FEATURE_NAMES.iter().zip(self.coefficients()) {
            write!(f, "{name}={value:.6}, ")?;
        }
        write!(f, "intercept={:.6}", self.intercept())
    }
}

/// Ordinary least squares over the augmented design matrix, solved through
/// the SVD. Singular values below `max(N, 6) * eps * sigma_max` are dropped,
/// so underdetermined and rank-deficient systems yield the minimum-norm
/// solution.
pub fn fit_least_squares(dataset: &Dataset) -> Result<WeightVector, FitError> {
    if dataset.is_empty() {
        return Err(FitError::EmptyDataset);
    }
    // The SVD panics on NaN input.
    let finite = dataset
        .rows()
        .all(|(features, target)| features.is_finite() && target.is_finite());
    if !finite {
        return Err(FitError::NonFinite);
    }
    let a = dataset.augmented_matrix();
    let y = dataset.target_vector();
    let rows = a.nrows();

    let svd = a.svd(true, true);
    let sigma_max = svd.singular_values.max();
    let cutoff = sigma_max * f64::EPSILON * rows.max(WEIGHT_COUNT) as f64;
    let solution = svd.solve(&y, cutoff).map_err(FitError::Solver)?;

    let weights = WeightVector::from_slice(solution.as_slice()).ok_or(FitError::Solver(
        "solution has the wrong length",
    ))?;
    if weights.0.iter().any(|w| !w.is_finite()) {
        return Err(FitError::NonFinite);
    }
    debug!(
        "fitted {} observations, sigma_max={sigma_max:.4e}, cutoff={cutoff:.4e}",
        rows
    );
    Ok(weights)
}

/// Owns the growing dataset and the weights fitted to it. Every accepted
/// observation triggers a full refit and, when a store is attached, a
/// rewrite of the persisted tables.
#[derive(Debug, Clone, Default)]
pub struct Estimator {
    dataset: Dataset,
    weights: Option<WeightVector>,
    store: Option<ModelStore>,
}

impl Estimator {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn with_store(store: ModelStore) -> Self {
        Self {
            dataset: Dataset::new(),
            weights: None,
            store: Some(store),
        }
    }

    /// Loads the stored dataset without fitting it.
    pub fn load(store: ModelStore) -> Result<Self, EstimatorError> {
        let dataset = store.load_dataset()?.unwrap_or_default();
        Ok(Self {
            dataset,
            weights: None,
            store: Some(store),
        })
    }

    /// Picks up the dataset left by an earlier run and refits it in memory.
    pub fn resume(store: ModelStore) -> Result<Self, EstimatorError> {
        let mut estimator = Self::load(store)?;
        if !estimator.dataset.is_empty() {
            estimator.weights = Some(fit_least_squares(&estimator.dataset)?);
        }
        Ok(estimator)
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn weights(&self) -> Option<&WeightVector> {
        self.weights.as_ref()
    }

    /// Appends one observation, refits, persists. A failed fit leaves the
    /// dataset and weights as they were.
    pub fn accept(
        &mut self,
        features: FeatureVector,
        target: f64,
    ) -> Result<WeightVector, EstimatorError> {
        self.dataset.append(features, target);
        let weights = match fit_least_squares(&self.dataset) {
            Ok(weights) => weights,
            Err(err) => {
                self.dataset.pop();
                return Err(err.into());
            }
        };
        self.weights = Some(weights);

        if let Some(store) = &self.store {
            store.save(&self.dataset, &weights)?;
        }
        Ok(weights)
    }

    /// Refits the current dataset and persists the weights.
    pub fn refit(&mut self) -> Result<Option<WeightVector>, EstimatorError> {
        if self.dataset.is_empty() {
            return Ok(None);
        }
        let weights = fit_least_squares(&self.dataset)?;
        self.weights = Some(weights);
        if let Some(store) = &self.store {
            store.save_weights(&weights)?;
        }
        Ok(Some(weights))
    }
}
