use std::fmt;

use crate::dataset::Dataset;
use crate::features::FeatureVector;
use crate::regression::WeightVector;

const COL_WIDTH: usize = 15;

pub fn predict(features: &FeatureVector, weights: &WeightVector) -> f64 {
    features
        .0
        .iter()
        .zip(weights.coefficients())
        .map(|(x, w)| x * w)
        .sum::<f64>()
        + weights.intercept()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationRow {
    pub actual: f64,
    pub predicted: f64,
    pub abs_error: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub rows: Vec<EvaluationRow>,
    pub mean_abs_error: f64,
    pub mean_actual: f64,
    /// Mean absolute error as a percentage of the mean rating. `None` when
    /// the mean rating is zero.
    pub error_percent: Option<f64>,
}

/// Scores every stored observation against `weights`. `None` for an empty
/// dataset.
pub fn evaluate(dataset: &Dataset, weights: &WeightVector) -> Option<EvaluationReport> {
    let mean_actual = dataset.mean_target()?;
    let rows = dataset
        .rows()
        .map(|(features, actual)| {
            let predicted = predict(features, weights);
            EvaluationRow {
                actual,
                predicted,
                abs_error: (actual - predicted).abs(),
            }
        })
        .collect::<Vec<_>>();
    let mean_abs_error = rows.iter().map(|r| r.abs_error).sum::<f64>() / rows.len() as f64;
    let error_percent = (mean_actual != 0.0).then(|| mean_abs_error / mean_actual * 100.0);

    Some(EvaluationReport {
        rows,
        mean_abs_error,
        mean_actual,
        error_percent,
    })
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(COL_WIDTH * 3 + 4);
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "|{:^w$}|{:^w$}|{:^w$}|",
            "Actual",
            "Predicted",
            "Abs error",
            w = COL_WIDTH
        )?;
        writeln!(f, "{rule}")?;
        for row in &self.rows {
            writeln!(
                f,
                "|{:^w$.2}|{:^w$.2}|{:^w$.2}|",
                row.actual,
                row.predicted,
                row.abs_error,
                w = COL_WIDTH
            )?;
        }
        writeln!(f, "{rule}")?;
        match self.error_percent {
            Some(pct) => write!(f, "Total error: {pct:.2}%"),
            None => write!(f, "Total error: n/a (mean rating is zero)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_is_dot_product_plus_intercept() {
        let v = FeatureVector([1.0, 80.0, 0.7, 0.3, 0.45]);
        let w = WeightVector([10.0, 0.5, 5.0, 3.0, 20.0, 5.0]);
        assert!((predict(&v, &w) - 63.4).abs() < 1e-9);

        let zero = FeatureVector([0.0; 5]);
        assert_eq!(predict(&zero, &w), 5.0);
    }

    #[test]
    fn predict_is_affine_in_features() {
        let w = WeightVector([0.3, 0.01, 1.2, -0.4, 0.8, 0.1]);
        let v1 = FeatureVector([1.1, 80.0, 0.7, 0.1, 0.45]);
        let v2 = FeatureVector([0.9, 70.0, 0.6, 0.2, 0.30]);
        let (a, b) = (2.0, -0.5);
        let mixed: [f64; 5] = std::array::from_fn(|i| a * v1.0[i] + b * v2.0[i]);
        let lhs = predict(&FeatureVector(mixed), &w);
        let rhs = a * predict(&v1, &w) + b * predict(&v2, &w) - (a + b - 1.0) * w.intercept();
        assert!((lhs - rhs).abs() < 1e-9);
    }

    #[test]
    fn evaluation_reports_mean_error_percent() {
        let w = WeightVector([0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let mut ds = Dataset::new();
        ds.append(FeatureVector([1.0; 5]), 1.5);
        ds.append(FeatureVector([1.0; 5]), 0.5);
        let report = evaluate(&ds, &w).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].abs_error, 0.5);
        assert_eq!(report.mean_abs_error, 0.5);
        assert_eq!(report.mean_actual, 1.0);
        assert_eq!(report.error_percent, Some(50.0));

        let text = report.to_string();
        assert!(text.contains("Actual"));
        assert!(text.contains("1.50"));
        assert!(text.ends_with("Total error: 50.00%"));
    }

    #[test]
    fn empty_dataset_has_no_report() {
        let w = WeightVector([0.0; 6]);
        assert!(evaluate(&Dataset::new(), &w).is_none());
    }
}
