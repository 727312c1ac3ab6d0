//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed into model constructors as explicit configuration
//! - exported to JSON/CSV
//! - reloaded later for plotting

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on accepted sample sizes (binomial and OC).
pub const MAX_SAMPLE_SIZE: u32 = 10_000;

/// Binomial model defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinomialConfig {
    /// Number of trials `n`.
    pub sample_size: u32,
    /// Per-trial failure probability `p`.
    pub p_fail: f64,
    /// Emission stops once the CDF exceeds `1 - tolerance`.
    pub tolerance: f64,
    /// Largest `n` accepted from user input.
    pub max_sample_size: u32,
}

impl Default for BinomialConfig {
    fn default() -> Self {
        Self {
            sample_size: 100,
            p_fail: 0.05,
            tolerance: 1e-6,
            max_sample_size: MAX_SAMPLE_SIZE,
        }
    }
}

/// Weibull model defaults.
///
/// Time is expressed in multiples of the scale parameter when `scale = 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeibullConfig {
    pub shape: f64,
    pub scale: f64,
    pub t_start: f64,
    pub t_end: f64,
    pub t_count: usize,
}

impl Default for WeibullConfig {
    fn default() -> Self {
        Self {
            shape: 1.0,
            scale: 1.0,
            t_start: 1e-2,
            t_end: 2.0,
            t_count: 100,
        }
    }
}

/// Sampling plan and OC grid defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcConfig {
    pub sample_size: u32,
    pub acceptance_number: u32,
    /// Producer risk.
    pub alpha: f64,
    /// Consumer risk.
    pub beta: f64,
    /// Exclusive end of the lot-defect-rate grid.
    pub p_end: f64,
    pub p_step: f64,
    pub max_sample_size: u32,
}

impl Default for OcConfig {
    fn default() -> Self {
        Self {
            sample_size: 300,
            acceptance_number: 3,
            alpha: 0.05,
            beta: 0.10,
            p_end: 0.20,
            p_step: 0.001,
            max_sample_size: MAX_SAMPLE_SIZE,
        }
    }
}

/// A user-editable parameter.
///
/// Every variant arrives as text and passes through `domain::params` before
/// it reaches a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    BinomialSampleSize,
    BinomialPFail,
    WeibullShape,
    WeibullScale,
    OcSampleSize,
    OcAcceptanceNumber,
    OcAlpha,
    OcBeta,
    OcAql,
    OcRql,
}

impl Field {
    pub const BINOMIAL: [Field; 2] = [Field::BinomialPFail, Field::BinomialSampleSize];
    pub const WEIBULL: [Field; 2] = [Field::WeibullShape, Field::WeibullScale];
    pub const OC: [Field; 6] = [
        Field::OcSampleSize,
        Field::OcAcceptanceNumber,
        Field::OcAlpha,
        Field::OcAql,
        Field::OcBeta,
        Field::OcRql,
    ];

    /// Short parameter name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Field::BinomialSampleSize | Field::OcSampleSize => "sample size",
            Field::BinomialPFail => "probability of failure",
            Field::WeibullShape => "shape parameter",
            Field::WeibullScale => "scale parameter",
            Field::OcAcceptanceNumber => "acceptance number",
            Field::OcAlpha => "alpha",
            Field::OcBeta => "beta",
            Field::OcAql => "AQL",
            Field::OcRql => "RQL",
        }
    }

    /// Label shown next to the field in the settings panel.
    pub fn label(self) -> &'static str {
        match self {
            Field::BinomialSampleSize => "Sample size n",
            Field::BinomialPFail => "Probability of failure p",
            Field::WeibullShape => "Shape m",
            Field::WeibullScale => "Scale c",
            Field::OcSampleSize => "Sample size n",
            Field::OcAcceptanceNumber => "Acceptance number k",
            Field::OcAlpha => "Alpha (producer risk)",
            Field::OcBeta => "Beta (consumer risk)",
            Field::OcAql => "AQL",
            Field::OcRql => "RQL",
        }
    }
}

/// Which curve a saved file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveKind {
    Binomial,
    Weibull,
    Oc,
}

impl CurveKind {
    pub fn display_name(self) -> &'static str {
        match self {
            CurveKind::Binomial => "Binomial Distribution",
            CurveKind::Weibull => "Weibull Model",
            CurveKind::Oc => "OC Curve",
        }
    }
}

/// One named parameter stored alongside a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: f64,
}

/// One named column of sample values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// A saved curve file (JSON).
///
/// `x` is the horizontal axis; each entry of `series` has the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub kind: CurveKind,
    pub parameters: Vec<NamedValue>,
    pub x: SeriesColumn,
    pub series: Vec<SeriesColumn>,
}
