use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::features::FEATURE_NAMES;
use crate::predict::EvaluationReport;
use crate::regression::WeightVector;

/// Writes the evaluation table and the weights to a two-sheet workbook.
pub fn export_evaluation(
    path: &Path,
    report: &EvaluationReport,
    weights: &WeightVector,
) -> Result<()> {
    let mut workbook = Workbook::new();

    let rows_sheet = workbook.add_worksheet();
    rows_sheet
        .set_name("Evaluation")
        .context("name evaluation sheet")?;
    write_header(rows_sheet, &["Row", "Actual", "Predicted", "Abs error"])?;
    for (idx, row) in report.rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        write_numbers(
            rows_sheet,
            r,
            &[(idx + 1) as f64, row.actual, row.predicted, row.abs_error],
        )?;
    }
    let summary_row = report.rows.len() as u32 + 2;
    rows_sheet
        .write_string(summary_row, 0, "Mean abs error")
        .context("write summary label")?;
    rows_sheet
        .write_number(summary_row, 3, report.mean_abs_error)
        .context("write mean abs error")?;
    if let Some(pct) = report.error_percent {
        rows_sheet
            .write_string(summary_row + 1, 0, "Total error %")
            .context("write percent label")?;
        rows_sheet
            .write_number(summary_row + 1, 3, pct)
            .context("write error percent")?;
    }

    let weights_sheet = workbook.add_worksheet();
    weights_sheet
        .set_name("Weights")
        .context("name weights sheet")?;
    write_header(weights_sheet, &["Term", "Weight"])?;
    let terms = FEATURE_NAMES.iter().copied().chain(std::iter::once("intercept"));
    for (idx, (term, value)) in terms.zip(weights.0.iter()).enumerate() {
        let r = (idx + 1) as u32;
        weights_sheet
            .write_string(r, 0, term)
            .with_context(|| format!("write term {term}"))?;
        weights_sheet
            .write_number(r, 1, *value)
            .with_context(|| format!("write weight {term}"))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save {}", path.display()))?;
    Ok(())
}

fn write_header(worksheet: &mut Worksheet, labels: &[&str]) -> Result<()> {
    for (col_idx, label) in labels.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *label)
            .with_context(|| format!("write header {label}"))?;
    }
    Ok(())
}

fn write_numbers(worksheet: &mut Worksheet, row_idx: u32, values: &[f64]) -> Result<()> {
    for (col_idx, value) in values.iter().enumerate() {
        worksheet
            .write_number(row_idx, col_idx as u16, *value)
            .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::features::FeatureVector;
    use crate::predict::evaluate;

    #[test]
    fn workbook_is_written() {
        let dir = std::env::temp_dir().join(format!("rating_fit_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.xlsx");
        let _ = std::fs::remove_file(&path);

        let weights = WeightVector([0.1, 0.01, 0.2, 0.3, 0.4, 0.5]);
        let mut ds = Dataset::new();
        ds.append(FeatureVector([1.1, 80.0, 0.7, 0.1, 0.45]), 1.1);
        let report = evaluate(&ds, &weights).unwrap();

        export_evaluation(&path, &report, &weights).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
    }
}
