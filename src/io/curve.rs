//! Build, read and write curve JSON files.
//!
//! A curve file is the portable form of one model's current output:
//! - curve kind and its parameters
//! - a generation timestamp (UTC)
//! - the x column plus one or more named series of the same length
//!
//! The schema is defined by `domain::CurveFile`; CSV export reuses it.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{CurveFile, CurveKind, NamedValue, SeriesColumn};
use crate::error::AppError;
use crate::models::{BinomialModel, OcCurve, WeibullModel};

const TOOL: &str = "relc";

fn param(name: &str, value: f64) -> NamedValue {
    NamedValue {
        name: name.to_string(),
        value,
    }
}

fn column(name: &str, values: &[f64]) -> SeriesColumn {
    SeriesColumn {
        name: name.to_string(),
        values: values.to_vec(),
    }
}

pub fn binomial_curve(model: &BinomialModel, generated_at: DateTime<Utc>) -> CurveFile {
    let s = model.series();
    let ks: Vec<f64> = s.k.iter().map(|&k| f64::from(k)).collect();
    CurveFile {
        tool: TOOL.to_string(),
        generated_at,
        kind: CurveKind::Binomial,
        parameters: vec![
            param("n", f64::from(model.sample_size())),
            param("p", model.p_fail()),
        ],
        x: column("k", &ks),
        series: vec![column("pmf", &s.pmf), column("cdf", &s.cdf)],
    }
}

pub fn weibull_curve(model: &WeibullModel, generated_at: DateTime<Utc>) -> CurveFile {
    let s = model.series();
    CurveFile {
        tool: TOOL.to_string(),
        generated_at,
        kind: CurveKind::Weibull,
        parameters: vec![param("m", model.shape()), param("c", model.scale())],
        x: column("t", &s.t),
        series: vec![
            column("pdf", &s.pdf),
            column("cdf", &s.cdf),
            column("hazard", &s.hazard),
        ],
    }
}

pub fn oc_curve(curve: &OcCurve, generated_at: DateTime<Utc>) -> CurveFile {
    let l = curve.limits();
    CurveFile {
        tool: TOOL.to_string(),
        generated_at,
        kind: CurveKind::Oc,
        parameters: vec![
            param("n", f64::from(curve.sample_size())),
            param("k", f64::from(curve.acceptance_number())),
            param("alpha", l.alpha),
            param("aql", l.aql),
            param("beta", l.beta),
            param("rql", l.rql),
        ],
        x: column("p", curve.p()),
        series: vec![column("accept", curve.accept())],
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    info!(path = %path.display(), kind = ?curve.kind, "curve exported");
    Ok(())
}

/// Read a curve JSON file. Every series must match the length of `x`.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;

    if let Some(bad) = curve.series.iter().find(|s| s.values.len() != curve.x.values.len()) {
        return Err(AppError::new(
            2,
            format!(
                "Invalid curve JSON: series '{}' has {} values, '{}' has {}",
                bad.name,
                bad.values.len(),
                curve.x.name,
                curve.x.values.len()
            ),
        ));
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::{OcConfig, WeibullConfig};

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn oc_curve_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oc.json");

        let curve = OcCurve::new(OcConfig::default()).unwrap();
        let file = oc_curve(&curve, stamp());
        write_curve_json(&path, &file).unwrap();

        let back = read_curve_json(&path).unwrap();
        assert_eq!(back.kind, CurveKind::Oc);
        assert_eq!(back.generated_at, file.generated_at);
        for (a, b) in back.series[0].values.iter().zip(&file.series[0].values) {
            assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0));
        }
        assert_eq!(back.x.values.len(), 200);
        assert_eq!(back.parameters[1].name, "k");
    }

    #[test]
    fn json_uses_lowercase_kind_and_rfc3339_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.json");
        let model = WeibullModel::new(WeibullConfig::default()).unwrap();
        write_curve_json(&path, &weibull_curve(&model, stamp())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"kind\": \"weibull\""));
        assert!(text.contains("\"generated_at\": \"2025-06-01T12:00:00Z\""));
    }

    #[test]
    fn mismatched_series_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let model = WeibullModel::new(WeibullConfig::default()).unwrap();
        let mut file = weibull_curve(&model, stamp());
        file.series[0].values.pop();
        write_curve_json(&path, &file).unwrap();

        let err = read_curve_json(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("series 'pdf'"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_curve_json(&dir.path().join("nope.json")).is_err());
    }
}
