use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::dataset::{Dataset, DatasetError};
use crate::features::{FEATURE_COUNT, FeatureVector};
use crate::regression::{WEIGHT_COUNT, WeightVector};

pub const STATS_FILE: &str = "player_stats_matrix.txt";
pub const RATINGS_FILE: &str = "player_ratings_matrix.txt";
pub const WEIGHTS_FILE: &str = "player_weights_matrix.txt";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{}: row {row} has {found} values, expected {expected}", .path.display())]
    Shape {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("{}: row {row} holds non-numeric value {value:?}", .path.display())]
    InvalidNumber {
        path: PathBuf,
        row: usize,
        value: String,
    },
    #[error("{}: stored dataset is inconsistent: {source}", .path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: DatasetError,
    },
}

/// Locations of the three comma-delimited tables: feature matrix, ratings
/// column and weight vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelStore {
    stats_path: PathBuf,
    ratings_path: PathBuf,
    weights_path: PathBuf,
}

impl ModelStore {
    pub fn new(stats_path: PathBuf, ratings_path: PathBuf, weights_path: PathBuf) -> Self {
        Self {
            stats_path,
            ratings_path,
            weights_path,
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(
            dir.join(STATS_FILE),
            dir.join(RATINGS_FILE),
            dir.join(WEIGHTS_FILE),
        )
    }

    pub fn stats_path(&self) -> &Path {
        &self.stats_path
    }

    pub fn ratings_path(&self) -> &Path {
        &self.ratings_path
    }

    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    pub fn save(&self, dataset: &Dataset, weights: &WeightVector) -> Result<(), PersistError> {
        self.save_dataset(dataset)?;
        self.save_weights(weights)
    }

    pub fn save_dataset(&self, dataset: &Dataset) -> Result<(), PersistError> {
        write_table(
            &self.stats_path,
            dataset.features().iter().map(|f| f.0.to_vec()),
        )?;
        write_table(
            &self.ratings_path,
            dataset.targets().iter().map(|t| vec![*t]),
        )
    }

    pub fn save_weights(&self, weights: &WeightVector) -> Result<(), PersistError> {
        write_table(&self.weights_path, std::iter::once(weights.0.to_vec()))
    }

    /// `Ok(None)` when no feature matrix has been written yet.
    pub fn load_dataset(&self) -> Result<Option<Dataset>, PersistError> {
        if !self.stats_path.exists() {
            return Ok(None);
        }
        let rows = read_table(&self.stats_path)?;
        let mut features = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            let Some(vector) = FeatureVector::from_slice(row) else {
                return Err(PersistError::Shape {
                    path: self.stats_path.clone(),
                    row: idx + 1,
                    expected: FEATURE_COUNT,
                    found: row.len(),
                });
            };
            features.push(vector);
        }

        let targets = if self.ratings_path.exists() {
            read_table(&self.ratings_path)?
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
        } else {
            Vec::new()
        };

        Dataset::from_parts(features, targets)
            .map(Some)
            .map_err(|source| PersistError::Dataset {
                path: self.ratings_path.clone(),
                source,
            })
    }

    /// Accepts one row of six values or six rows of one value.
    pub fn load_weights(&self) -> Result<WeightVector, PersistError> {
        let values = read_table(&self.weights_path)?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        WeightVector::from_slice(&values).ok_or_else(|| PersistError::Shape {
            path: self.weights_path.clone(),
            row: 1,
            expected: WEIGHT_COUNT,
            found: values.len(),
        })
    }
}

fn write_table<I>(path: &Path, rows: I) -> Result<(), PersistError>
where
    I: IntoIterator<Item = Vec<f64>>,
{
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|source| PersistError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let tmp = tmp_path(path);
    let csv_err = |source: csv::Error| PersistError::Csv {
        path: tmp.clone(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&tmp)
        .map_err(csv_err)?;
    for row in rows {
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| PersistError::Io {
        path: tmp.clone(),
        source,
    })?;
    drop(writer);

    fs::rename(&tmp, path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_table(path: &Path) -> Result<Vec<Vec<f64>>, PersistError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|source| PersistError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|source| PersistError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let mut row = Vec::with_capacity(record.len());
        for field in record.iter().filter(|f| !f.is_empty()) {
            let value = field
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| PersistError::InvalidNumber {
                    path: path.to_path_buf(),
                    row: idx + 1,
                    value: field.to_string(),
                })?;
            row.push(value);
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
