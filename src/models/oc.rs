//! Operating-characteristic (OC) curves for single sampling plans.
//!
//! A plan draws `n` items and accepts the lot when at most `k` are defective.
//! At lot defect rate `p` the acceptance probability is the binomial CDF
//! `P(X <= k; n, p)`.
//!
//! Quality limits are read off the sampled curve by local linear
//! interpolation:
//!
//! - AQL: the defect rate accepted with probability `1 - alpha`
//! - RQL: the defect rate accepted with probability `beta`
//!
//! Accuracy depends on grid density near the target. Targets outside the
//! sampled range are extrapolated from the end samples and are approximate.

use tracing::debug;

use crate::domain::{OcConfig, params};
use crate::error::{ModelError, ModelResult};
use crate::math::{arange, interpolate_x, interpolate_y, nearest_index};
use crate::models::binomial;

fn check_plan(k: u32, n: u32) -> ModelResult<()> {
    if n == 0 {
        return Err(ModelError::invalid("sample size", 0.0, "must be at least 1"));
    }
    params::validate_acceptance_number(i64::from(k), n)?;
    Ok(())
}

/// Probability of accepting a lot with defect rate `p`.
pub fn accept_probability(k: u32, n: u32, p: f64) -> ModelResult<f64> {
    check_plan(k, n)?;
    params::validate_probability("lot defect probability", p)?;
    Ok(binomial::cdf(k, n, p))
}

/// Acceptance probability at every `p` in `ps`.
pub fn compute(k: u32, n: u32, ps: &[f64]) -> ModelResult<Vec<f64>> {
    check_plan(k, n)?;
    ps.iter()
        .map(|&p| {
            params::validate_probability("lot defect probability", p)?;
            Ok(binomial::cdf(k, n, p))
        })
        .collect()
}

/// Risk targets and the defect rates they map to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityLimits {
    pub alpha: f64,
    pub aql: f64,
    pub beta: f64,
    pub rql: f64,
}

/// A sampling plan, its sampled OC curve, and the current quality limits.
#[derive(Debug, Clone)]
pub struct OcCurve {
    config: OcConfig,
    p: Vec<f64>,
    accept: Vec<f64>,
    limits: QualityLimits,
}

impl OcCurve {
    pub fn new(config: OcConfig) -> ModelResult<Self> {
        params::validate_sample_size(i64::from(config.sample_size), config.max_sample_size)?;
        params::validate_probability("alpha", config.alpha)?;
        params::validate_probability("beta", config.beta)?;

        let p = arange(0.0, config.p_end, config.p_step)?;
        let accept = compute(config.acceptance_number, config.sample_size, &p)?;
        let limits = derive_limits(&p, &accept, config.alpha, config.beta)?;
        debug!(
            n = config.sample_size,
            k = config.acceptance_number,
            points = p.len(),
            "oc curve computed"
        );
        Ok(Self {
            config,
            p,
            accept,
            limits,
        })
    }

    pub fn sample_size(&self) -> u32 {
        self.config.sample_size
    }

    pub fn acceptance_number(&self) -> u32 {
        self.config.acceptance_number
    }

    pub fn max_sample_size(&self) -> u32 {
        self.config.max_sample_size
    }

    pub fn p(&self) -> &[f64] {
        &self.p
    }

    pub fn accept(&self) -> &[f64] {
        &self.accept
    }

    pub fn limits(&self) -> QualityLimits {
        self.limits
    }

    pub fn p_end(&self) -> f64 {
        self.config.p_end
    }

    pub fn p_step(&self) -> f64 {
        self.config.p_step
    }

    /// Defect rate at which the sampled curve reaches `target` acceptance.
    pub fn find_p_for_acceptance(&self, target: f64) -> ModelResult<f64> {
        params::validate_probability("acceptance probability", target)?;
        interpolate_x(&self.p, &self.accept, target)
    }

    /// Acceptance probability of the sampled curve at defect rate `target_p`.
    pub fn find_acceptance_for_p(&self, target_p: f64) -> ModelResult<f64> {
        params::validate_probability("lot defect probability", target_p)?;
        interpolate_y(&self.p, &self.accept, target_p)
    }

    /// The sampled defect rate whose acceptance is nearest `target`, without interpolation.
    pub fn nearest_p_for_acceptance(&self, target: f64) -> Option<f64> {
        nearest_index(&self.accept, target).map(|i| self.p[i])
    }

    /// Change `n`; the current `k` must stay below it.
    pub fn set_sample_size(&mut self, n: u32) -> ModelResult<()> {
        params::validate_sample_size(i64::from(n), self.config.max_sample_size)?;
        self.set_plan(n, self.config.acceptance_number)
    }

    pub fn set_acceptance_number(&mut self, k: u32) -> ModelResult<()> {
        self.set_plan(self.config.sample_size, k)
    }

    /// Replace the plan and recompute the curve and both limits.
    pub fn set_plan(&mut self, n: u32, k: u32) -> ModelResult<()> {
        params::validate_sample_size(i64::from(n), self.config.max_sample_size)?;
        let accept = compute(k, n, &self.p)?;
        let limits = derive_limits(&self.p, &accept, self.limits.alpha, self.limits.beta)?;
        debug!(n, k, "oc plan updated");
        self.config.sample_size = n;
        self.config.acceptance_number = k;
        self.accept = accept;
        self.limits = limits;
        Ok(())
    }

    /// Regenerate the curve over a new `p` grid `[0, p_end)`.
    pub fn set_range(&mut self, p_end: f64, p_step: f64) -> ModelResult<()> {
        params::validate_probability("p end", p_end)?;
        let p = arange(0.0, p_end, p_step)?;
        if p.len() < 2 {
            return Err(ModelError::InsufficientData { needed: 2, got: p.len() });
        }
        let accept = compute(self.config.acceptance_number, self.config.sample_size, &p)?;
        let limits = derive_limits(&p, &accept, self.limits.alpha, self.limits.beta)?;
        self.config.p_end = p_end;
        self.config.p_step = p_step;
        self.p = p;
        self.accept = accept;
        self.limits = limits;
        Ok(())
    }

    /// Set producer risk; AQL follows.
    pub fn set_alpha(&mut self, alpha: f64) -> ModelResult<()> {
        params::validate_probability("alpha", alpha)?;
        let aql = self.find_p_for_acceptance(1.0 - alpha)?;
        self.limits.alpha = alpha;
        self.limits.aql = aql;
        Ok(())
    }

    /// Set AQL; alpha follows as `1 - accept(AQL)`.
    pub fn set_aql(&mut self, aql: f64) -> ModelResult<()> {
        let accept = self.find_acceptance_for_p(aql)?;
        self.limits.alpha = (1.0 - accept).clamp(0.0, 1.0);
        self.limits.aql = aql;
        Ok(())
    }

    /// Set consumer risk; RQL follows.
    pub fn set_beta(&mut self, beta: f64) -> ModelResult<()> {
        params::validate_probability("beta", beta)?;
        let rql = self.find_p_for_acceptance(beta)?;
        self.limits.beta = beta;
        self.limits.rql = rql;
        Ok(())
    }

    /// Set RQL; beta follows as `accept(RQL)`.
    pub fn set_rql(&mut self, rql: f64) -> ModelResult<()> {
        let accept = self.find_acceptance_for_p(rql)?;
        self.limits.beta = accept.clamp(0.0, 1.0);
        self.limits.rql = rql;
        Ok(())
    }
}

fn derive_limits(p: &[f64], accept: &[f64], alpha: f64, beta: f64) -> ModelResult<QualityLimits> {
    Ok(QualityLimits {
        alpha,
        aql: interpolate_x(p, accept, 1.0 - alpha)?,
        beta,
        rql: interpolate_x(p, accept, beta)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_curve() -> OcCurve {
        OcCurve::new(OcConfig::default()).unwrap()
    }

    #[test]
    fn accept_probability_is_one_at_zero_defects() {
        assert_eq!(accept_probability(3, 300, 0.0).unwrap(), 1.0);
        let curve = default_curve();
        assert_eq!(curve.accept()[0], 1.0);
    }

    #[test]
    fn accept_probability_reference_values() {
        // Direct summation of C(300, j) p^j (1-p)^(300-j), j = 0..=3.
        let a = accept_probability(3, 300, 0.01).unwrap();
        assert!((a - 0.6472337746425383).abs() < 1e-9, "{a}");
        let a = accept_probability(3, 300, 0.05).unwrap();
        assert!((a - 0.0001640639094717545).abs() < 1e-12, "{a}");
    }

    #[test]
    fn curve_is_non_increasing() {
        let curve = default_curve();
        assert_eq!(curve.p().len(), 200);
        assert!(curve.accept().windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn plan_validation() {
        assert!(compute(3, 3, &[0.1]).is_err());
        assert!(compute(0, 0, &[0.1]).is_err());
        assert!(compute(1, 10, &[1.2]).is_err());
        assert!(accept_probability(2, 10, -0.01).is_err());
    }

    #[test]
    fn default_quality_limits() {
        let limits = default_curve().limits();
        // Exact inverses of the binomial CDF are 0.004567 and 0.022133.
        assert!((limits.aql - 0.004567).abs() < 2e-4, "aql={}", limits.aql);
        assert!((limits.rql - 0.022133).abs() < 2e-4, "rql={}", limits.rql);
        assert_eq!(limits.alpha, 0.05);
        assert_eq!(limits.beta, 0.10);
    }

    #[test]
    fn interpolation_round_trip_inside_range() {
        let curve = default_curve();
        for p0 in [0.0023, 0.0123, 0.0301] {
            let a = curve.find_acceptance_for_p(p0).unwrap();
            let back = curve.find_p_for_acceptance(a).unwrap();
            assert!((back - p0).abs() < 1e-9, "p0={p0} back={back}");
        }
    }

    #[test]
    fn nearest_sample_limit() {
        let curve = default_curve();
        let p = curve.nearest_p_for_acceptance(0.10).unwrap();
        assert!((p - 0.022).abs() < 1e-9, "{p}");
    }

    #[test]
    fn alpha_and_aql_are_coupled() {
        let mut curve = default_curve();
        curve.set_aql(0.01).unwrap();
        let expected = 1.0 - accept_probability(3, 300, 0.01).unwrap();
        assert!((curve.limits().alpha - expected).abs() < 1e-3);

        curve.set_alpha(0.05).unwrap();
        assert!((curve.limits().aql - 0.004567).abs() < 2e-4);
    }

    #[test]
    fn beta_and_rql_are_coupled() {
        let mut curve = default_curve();
        curve.set_rql(0.02).unwrap();
        let expected = accept_probability(3, 300, 0.02).unwrap();
        assert!((curve.limits().beta - expected).abs() < 1e-3);
        assert_eq!(curve.limits().rql, 0.02);
    }

    #[test]
    fn plan_change_recomputes_limits() {
        let mut curve = default_curve();
        let before = curve.limits();
        curve.set_sample_size(150).unwrap();
        let after = curve.limits();
        assert!(after.aql > before.aql);
        assert!(after.rql > before.rql);
        assert_eq!(after.alpha, before.alpha);
    }

    #[test]
    fn rejected_plan_change_keeps_state() {
        let mut curve = default_curve();
        let accept = curve.accept().to_vec();
        let limits = curve.limits();

        assert!(curve.set_sample_size(3).is_err());
        assert!(curve.set_sample_size(0).is_err());
        assert!(curve.set_acceptance_number(300).is_err());
        assert!(curve.set_alpha(1.5).is_err());
        assert!(curve.set_aql(-0.2).is_err());

        assert_eq!(curve.sample_size(), 300);
        assert_eq!(curve.acceptance_number(), 3);
        assert_eq!(curve.accept(), accept.as_slice());
        assert_eq!(curve.limits(), limits);
    }

    #[test]
    fn custom_range() {
        let mut curve = default_curve();
        curve.set_range(0.1, 0.02).unwrap();
        assert_eq!(curve.p().len(), 5);
        assert!(curve.set_range(0.01, 0.02).is_err());
    }
}
