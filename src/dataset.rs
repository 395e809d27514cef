use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::features::{FEATURE_COUNT, FeatureVector};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("feature rows ({features}) and targets ({targets}) differ in length")]
    LengthMismatch { features: usize, targets: usize },
}

/// Observations in insertion order. Features and targets always have the
/// same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    features: Vec<FeatureVector>,
    targets: Vec<f64>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        features: Vec<FeatureVector>,
        targets: Vec<f64>,
    ) -> Result<Self, DatasetError> {
        if features.len() != targets.len() {
            return Err(DatasetError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        Ok(Self { features, targets })
    }

    pub fn append(&mut self, features: FeatureVector, target: f64) {
        self.features.push(features);
        self.targets.push(target);
    }

    pub(crate) fn pop(&mut self) -> Option<(FeatureVector, f64)> {
        let features = self.features.pop()?;
        let target = self.targets.pop()?;
        Some((features, target))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn features(&self) -> &[FeatureVector] {
        &self.features
    }

    pub fn targets(&self) -> &[f64] {
        &self.targets
    }

    pub fn rows(&self) -> impl Iterator<Item = (&FeatureVector, f64)> + '_ {
        self.features.iter().zip(self.targets.iter().copied())
    }

    /// N×6 design matrix: the feature columns followed by a column of ones
    /// for the intercept.
    pub fn augmented_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.len(), FEATURE_COUNT + 1, |row, col| {
            if col < FEATURE_COUNT {
                self.features[row].0[col]
            } else {
                1.0
            }
        })
    }

    pub fn target_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&self.targets)
    }

    pub fn mean_target(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.targets.iter().sum::<f64>() / self.len() as f64)
    }
}
