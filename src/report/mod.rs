//! Reporting utilities: derived figures and formatted terminal output.

mod format;

pub use format::{format_binomial_summary, format_exactly, format_oc_summary, format_weibull_summary};

use crate::error::ModelResult;
use crate::math::trapezoid_area;
use crate::models::{OcCurve, QualityLimits, WeibullSeries};

/// Area under the sampled pdf next to the analytic CDF increase over the same span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaCheck {
    pub area: f64,
    pub cdf_span: f64,
}

impl AreaCheck {
    pub fn abs_error(&self) -> f64 {
        (self.area - self.cdf_span).abs()
    }
}

pub fn weibull_area_check(series: &WeibullSeries) -> ModelResult<AreaCheck> {
    let area = trapezoid_area(&series.t, &series.pdf)?;
    let cdf_span = match (series.cdf.first(), series.cdf.last()) {
        (Some(a), Some(b)) => b - a,
        _ => 0.0,
    };
    Ok(AreaCheck { area, cdf_span })
}

/// Interpolated limits plus the nearest grid samples, for comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitReport {
    pub limits: QualityLimits,
    pub nearest_aql: Option<f64>,
    pub nearest_rql: Option<f64>,
}

pub fn oc_limit_report(curve: &OcCurve) -> LimitReport {
    let limits = curve.limits();
    LimitReport {
        limits,
        nearest_aql: curve.nearest_p_for_acceptance(1.0 - limits.alpha),
        nearest_rql: curve.nearest_p_for_acceptance(limits.beta),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OcConfig, WeibullConfig};
    use crate::models::WeibullModel;

    #[test]
    fn exponential_area_matches_cdf_span() {
        let model = WeibullModel::new(WeibullConfig::default()).unwrap();
        let check = weibull_area_check(model.series()).unwrap();
        // (-e^{-2}) - (-e^{-0.01})
        assert!((check.cdf_span - 0.8547146).abs() < 1e-6);
        assert!(check.abs_error() < 1e-4, "{check:?}");
    }

    #[test]
    fn nearest_limits_sit_on_the_grid() {
        let curve = OcCurve::new(OcConfig::default()).unwrap();
        let report = oc_limit_report(&curve);
        assert!((report.nearest_rql.unwrap() - 0.022).abs() < 1e-12);
        assert!((report.nearest_aql.unwrap() - 0.005).abs() < 1e-12);
    }
}
