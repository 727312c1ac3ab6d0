//! Export a curve table to CSV.
//!
//! One row per sample point, meant for spreadsheets and downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::domain::CurveFile;
use crate::error::AppError;

/// Write `x` and every series as columns.
pub fn write_curve_csv(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);

    let header: Vec<&str> = std::iter::once(curve.x.name.as_str())
        .chain(curve.series.iter().map(|s| s.name.as_str()))
        .collect();
    writeln!(out, "{}", header.join(","))
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (i, x) in curve.x.values.iter().enumerate() {
        let mut row = format!("{x}");
        for s in &curve.series {
            row.push(',');
            if let Some(v) = s.values.get(i) {
                row.push_str(&format!("{v:.10e}"));
            }
        }
        writeln!(out, "{row}").map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))?;
    info!(path = %path.display(), rows = curve.x.values.len(), "csv exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::BinomialConfig;
    use crate::io::binomial_curve;
    use crate::models::BinomialModel;

    #[test]
    fn binomial_csv_has_one_row_per_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binomial.csv");
        let model = BinomialModel::new(BinomialConfig {
            sample_size: 3,
            p_fail: 0.5,
            ..BinomialConfig::default()
        })
        .unwrap();

        write_curve_csv(&path, &binomial_curve(&model, Utc::now())).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "k,pmf,cdf");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("0,1.2500000000e-1,"), "{}", lines[1]);
        assert!(lines[4].starts_with("3,"));
    }

    #[test]
    fn unwritable_path_maps_to_exit_code_two() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let model = BinomialModel::new(BinomialConfig::default()).unwrap();
        let err = write_curve_csv(&path, &binomial_curve(&model, Utc::now())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
