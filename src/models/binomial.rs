//! Binomial distribution evaluator.
//!
//! For `n` trials with failure probability `p`, produces `P(X = k)` and
//! `P(X <= k)` for `k = 0..=n`. Probabilities are computed in log space and
//! the CDF comes from the regularized incomplete beta function, which keeps
//! both accurate for `n` in the thousands and for `p` near 0 or 1.

use tracing::debug;

use crate::domain::{BinomialConfig, params};
use crate::error::{ModelError, ModelResult};
use crate::math::{ln_choose, regularized_incomplete_beta};

/// Default early-exit tolerance on the CDF.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Parallel outcome / pmf / cdf sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinomialSeries {
    pub k: Vec<u32>,
    pub pmf: Vec<f64>,
    pub cdf: Vec<f64>,
}

impl BinomialSeries {
    pub fn len(&self) -> usize {
        self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }
}

/// Reject `n = 0` and `p` outside `[0, 1]`.
pub fn validate(n: u32, p: f64) -> ModelResult<()> {
    if n == 0 {
        return Err(ModelError::invalid("sample size", 0.0, "must be at least 1"));
    }
    params::validate_probability("probability of failure", p)?;
    Ok(())
}

/// `P(X = k)` for validated `n`, `p`.
pub fn pmf(k: u32, n: u32, p: f64) -> f64 {
    if k > n {
        return 0.0;
    }
    if p == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }

    let k_f = f64::from(k);
    let n_f = f64::from(n);
    (ln_choose(u64::from(n), u64::from(k)) + k_f * p.ln() + (n_f - k_f) * (-p).ln_1p()).exp()
}

/// `P(X <= k)` for validated `n`, `p`.
pub fn cdf(k: u32, n: u32, p: f64) -> f64 {
    if k >= n || p == 0.0 {
        return 1.0;
    }
    if p == 1.0 {
        return 0.0;
    }
    // P(X <= k) = I_{1-p}(n - k, k + 1)
    regularized_incomplete_beta(1.0 - p, f64::from(n - k), f64::from(k) + 1.0).clamp(0.0, 1.0)
}

/// Evaluate with the default early-exit tolerance.
pub fn compute(n: u32, p: f64) -> ModelResult<BinomialSeries> {
    compute_with_tolerance(n, p, DEFAULT_TOLERANCE)
}

/// Evaluate `k = 0..=n` without early exit.
pub fn compute_full(n: u32, p: f64) -> ModelResult<BinomialSeries> {
    validate(n, p)?;
    Ok(evaluate(n, p, None))
}

/// Evaluate, stopping after the first `k` with `cdf[k] > 1 - tolerance`.
///
/// The returned sequences end at that point; they are not padded out to `n`.
pub fn compute_with_tolerance(n: u32, p: f64, tolerance: f64) -> ModelResult<BinomialSeries> {
    validate(n, p)?;
    if !tolerance.is_finite() || tolerance <= 0.0 || tolerance >= 1.0 {
        return Err(ModelError::invalid("tolerance", tolerance, "must be within (0, 1)"));
    }
    Ok(evaluate(n, p, Some(tolerance)))
}

fn evaluate(n: u32, p: f64, tolerance: Option<f64>) -> BinomialSeries {
    let mut out = BinomialSeries {
        k: Vec::with_capacity(n as usize + 1),
        pmf: Vec::with_capacity(n as usize + 1),
        cdf: Vec::with_capacity(n as usize + 1),
    };

    let mut prev_cdf = 0.0_f64;
    for k in 0..=n {
        // Keep the CDF non-decreasing against last-ulp noise in the beta function.
        let c = cdf(k, n, p).max(prev_cdf).min(1.0);
        out.k.push(k);
        out.pmf.push(pmf(k, n, p));
        out.cdf.push(c);
        prev_cdf = c;

        if let Some(tol) = tolerance {
            if c > 1.0 - tol {
                break;
            }
        }
    }
    out
}

/// `P(X = k)` as a function of `p`, for a fixed `k` and `n`.
pub fn pmf_over_p(k: u32, n: u32, ps: &[f64]) -> ModelResult<Vec<f64>> {
    if k > n {
        return Err(ModelError::invalid(
            "failure count",
            f64::from(k),
            format!("must be within [0, {n}]"),
        ));
    }
    ps.iter()
        .map(|&p| {
            validate(n, p)?;
            Ok(pmf(k, n, p))
        })
        .collect()
}

/// Binomial model: parameters plus the last computed series.
#[derive(Debug, Clone)]
pub struct BinomialModel {
    config: BinomialConfig,
    series: BinomialSeries,
}

impl BinomialModel {
    pub fn new(config: BinomialConfig) -> ModelResult<Self> {
        params::validate_sample_size(i64::from(config.sample_size), config.max_sample_size)?;
        let series = compute_with_tolerance(config.sample_size, config.p_fail, config.tolerance)?;
        debug!(n = config.sample_size, p = config.p_fail, points = series.len(), "binomial computed");
        Ok(Self { config, series })
    }

    pub fn sample_size(&self) -> u32 {
        self.config.sample_size
    }

    pub fn p_fail(&self) -> f64 {
        self.config.p_fail
    }

    pub fn max_sample_size(&self) -> u32 {
        self.config.max_sample_size
    }

    pub fn series(&self) -> &BinomialSeries {
        &self.series
    }

    /// Change `n` and recompute. On error nothing changes.
    pub fn set_sample_size(&mut self, n: u32) -> ModelResult<()> {
        params::validate_sample_size(i64::from(n), self.config.max_sample_size)?;
        self.recompute(n, self.config.p_fail)
    }

    /// Change `p` and recompute. On error nothing changes.
    pub fn set_p_fail(&mut self, p: f64) -> ModelResult<()> {
        self.recompute(self.config.sample_size, p)
    }

    fn recompute(&mut self, n: u32, p: f64) -> ModelResult<()> {
        let series = compute_with_tolerance(n, p, self.config.tolerance)?;
        debug!(n, p, points = series.len(), "binomial recomputed");
        self.config.sample_size = n;
        self.config.p_fail = p;
        self.series = series;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand::rngs::StdRng;
    use rand_distr::Binomial as BinomialSampler;

    use super::*;

    /// Direct summation reference for small n.
    fn reference_cdf(k: u32, n: u32, p: f64) -> f64 {
        let mut coef = 1.0_f64;
        let mut total = 0.0;
        for j in 0..=k {
            if j > 0 {
                coef *= f64::from(n - j + 1) / f64::from(j);
            }
            total += coef * p.powi(j as i32) * (1.0 - p).powi((n - j) as i32);
        }
        total
    }

    #[test]
    fn cdf_at_five_failures_in_hundred() {
        let s = compute(100, 0.05).unwrap();
        assert!((s.cdf[5] - 0.6159991279561384).abs() < 1e-9, "cdf[5] = {}", s.cdf[5]);
        assert!((s.pmf[5] - 0.1800178272704284).abs() < 1e-9);
    }

    #[test]
    fn truncates_once_cdf_reaches_tolerance() {
        let s = compute(100, 0.05).unwrap();
        // P(X <= 17) < 1 - 1e-6 < P(X <= 18) for n = 100, p = 0.05.
        assert_eq!(s.len(), 19);
        assert_eq!(*s.k.last().unwrap(), 18);
        assert!(*s.cdf.last().unwrap() > 1.0 - DEFAULT_TOLERANCE);
        assert!(s.cdf[s.len() - 2] <= 1.0 - DEFAULT_TOLERANCE);
    }

    #[test]
    fn full_range_pmf_sums_to_one() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..40 {
            let n = rng.gen_range(1..=2_000u32);
            let p = rng.gen_range(0.0..=1.0);
            let s = compute_full(n, p).unwrap();
            assert_eq!(s.len(), n as usize + 1);
            let total: f64 = s.pmf.iter().sum();
            assert!((total - 1.0).abs() < 1e-6, "n={n} p={p} sum={total}");
            assert!((s.cdf[n as usize] - 1.0).abs() < 1e-6);
            assert!(s.cdf.windows(2).all(|w| w[1] >= w[0]), "n={n} p={p}");
        }
    }

    #[test]
    fn pmf_is_cdf_increment() {
        let s = compute_full(60, 0.3).unwrap();
        let mut prev = 0.0;
        for (pm, c) in s.pmf.iter().zip(&s.cdf) {
            assert!((pm - (c - prev)).abs() < 1e-9);
            prev = *c;
        }
    }

    #[test]
    fn matches_direct_summation_for_small_n() {
        for &(n, p) in &[(10u32, 0.5), (20, 0.1), (50, 0.02), (35, 0.9)] {
            for k in 0..n {
                let got = cdf(k, n, p);
                let want = reference_cdf(k, n, p);
                assert!((got - want).abs() < 1e-10, "n={n} p={p} k={k}: {got} vs {want}");
            }
        }
    }

    #[test]
    fn large_n_stays_finite_and_normalised() {
        let s = compute_full(10_000, 0.37).unwrap();
        assert!(s.pmf.iter().all(|v| v.is_finite() && *v >= 0.0));
        let total: f64 = s.pmf.iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "sum={total}");
    }

    #[test]
    fn degenerate_probabilities() {
        let s = compute(10, 0.0).unwrap();
        assert_eq!(s.k, vec![0]);
        assert_eq!(s.pmf, vec![1.0]);

        let s = compute(10, 1.0).unwrap();
        assert_eq!(s.len(), 11);
        assert_eq!(s.pmf[10], 1.0);
        assert_eq!(s.cdf[9], 0.0);
        assert_eq!(s.cdf[10], 1.0);
    }

    #[test]
    fn invalid_inputs_fail_fast() {
        assert!(matches!(compute(0, 0.5).unwrap_err(), ModelError::InvalidParameter { .. }));
        assert!(compute(10, -0.1).is_err());
        assert!(compute(10, 1.1).is_err());
        assert!(compute(10, f64::NAN).is_err());
        assert!(compute_with_tolerance(10, 0.5, 0.0).is_err());
    }

    #[test]
    fn empirical_cdf_agrees_with_sampler() {
        let (n, p) = (40u32, 0.15);
        let mut rng = StdRng::seed_from_u64(11);
        let sampler = BinomialSampler::new(u64::from(n), p).unwrap();
        let draws = 20_000;
        let at_most_six = (0..draws).filter(|_| sampler.sample(&mut rng) <= 6).count();
        let empirical = at_most_six as f64 / draws as f64;
        assert!((empirical - cdf(6, n, p)).abs() < 0.02);
    }

    #[test]
    fn pmf_over_p_peaks_near_k_over_n() {
        let ps = crate::math::arange(0.0, 1.0, 0.0005).unwrap();
        let ys = pmf_over_p(3, 30, &ps).unwrap();
        let peak = crate::math::nearest_index(&ys, ys.iter().cloned().fold(0.0, f64::max)).unwrap();
        assert!((ps[peak] - 0.1).abs() < 1e-3);
        assert_eq!(ys[0], 0.0);
        assert!(pmf_over_p(31, 30, &ps).is_err());
    }

    #[test]
    fn model_rejects_bad_update_without_mutation() {
        let mut model = BinomialModel::new(BinomialConfig::default()).unwrap();
        let before = model.series().clone();

        assert!(model.set_sample_size(0).is_err());
        assert!(model.set_sample_size(10_001).is_err());
        assert!(model.set_p_fail(-0.1).is_err());
        assert!(model.set_p_fail(1.1).is_err());

        assert_eq!(model.sample_size(), 100);
        assert_eq!(model.p_fail(), 0.05);
        assert_eq!(model.series(), &before);
    }

    #[test]
    fn model_recomputes_on_update() {
        let mut model = BinomialModel::new(BinomialConfig::default()).unwrap();
        model.set_p_fail(0.5).unwrap();
        assert_eq!(model.p_fail(), 0.5);
        assert!(model.series().len() > 19);
        model.set_sample_size(20).unwrap();
        assert!(model.series().len() <= 21);
    }
}
