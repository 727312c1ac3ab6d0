//! Runtime settings: per-model defaults plus environment overrides.
//!
//! Overrides are read from the process environment (after loading a `.env`
//! file if one exists). Each value goes through the same parse-and-validate
//! boundary as interactive input, so a bad override fails loudly.

use crate::domain::{BinomialConfig, OcConfig, WeibullConfig, params};
use crate::error::{ModelError, ModelResult};
use crate::math::MAX_GRID_POINTS;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "RELC_";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub binomial: BinomialConfig,
    pub weibull: WeibullConfig,
    pub oc: OcConfig,
}

impl Settings {
    /// Defaults overridden by `RELC_*` variables from the environment / `.env`.
    pub fn from_env() -> ModelResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `RELC_*` key.
    pub fn from_lookup<F>(lookup: F) -> ModelResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));
        let mut s = Settings::default();

        if let Some(v) = get("MAX_SAMPLE_SIZE") {
            // Binomial tables are sized n + 1 up front.
            let max = params::parse_sample_size(&v, MAX_GRID_POINTS as u32)?;
            s.binomial.max_sample_size = max;
            s.oc.max_sample_size = max;
        }

        if let Some(v) = get("BINOMIAL_N") {
            s.binomial.sample_size = params::parse_sample_size(&v, s.binomial.max_sample_size)?;
        }
        if let Some(v) = get("BINOMIAL_P") {
            s.binomial.p_fail = params::parse_probability("probability of failure", &v)?;
        }
        if let Some(v) = get("BINOMIAL_TOLERANCE") {
            let tol = params::parse_positive("tolerance", &v)?;
            if tol >= 1.0 {
                return Err(ModelError::invalid("tolerance", tol, "must be below 1"));
            }
            s.binomial.tolerance = tol;
        }

        if let Some(v) = get("WEIBULL_M") {
            s.weibull.shape = params::parse_positive("shape parameter", &v)?;
        }
        if let Some(v) = get("WEIBULL_C") {
            s.weibull.scale = params::parse_positive("scale parameter", &v)?;
        }
        if let Some(v) = get("WEIBULL_T_START") {
            s.weibull.t_start = params::parse_positive("t start", &v)?;
        }
        if let Some(v) = get("WEIBULL_T_END") {
            s.weibull.t_end = params::parse_positive("t end", &v)?;
        }
        if let Some(v) = get("WEIBULL_T_COUNT") {
            s.weibull.t_count = params::parse_grid_count("t count", &v)?;
        }

        if let Some(v) = get("OC_SAMPLE_SIZE") {
            s.oc.sample_size = params::parse_sample_size(&v, s.oc.max_sample_size)?;
        }
        if let Some(v) = get("OC_ACCEPTANCE_NUMBER") {
            s.oc.acceptance_number = params::parse_acceptance_number(&v, s.oc.sample_size)?;
        }
        if let Some(v) = get("OC_ALPHA") {
            s.oc.alpha = params::parse_probability("alpha", &v)?;
        }
        if let Some(v) = get("OC_BETA") {
            s.oc.beta = params::parse_probability("beta", &v)?;
        }
        if let Some(v) = get("OC_P_END") {
            s.oc.p_end = params::parse_probability("p end", &v)?;
        }
        if let Some(v) = get("OC_P_STEP") {
            s.oc.p_step = params::parse_positive("p step", &v)?;
        }

        s.validate()?;
        Ok(s)
    }

    /// Cross-field checks that single-value parsing cannot catch.
    pub fn validate(&self) -> ModelResult<()> {
        if self.weibull.t_end <= self.weibull.t_start {
            return Err(ModelError::invalid(
                "t end",
                self.weibull.t_end,
                format!("must exceed t start ({})", self.weibull.t_start),
            ));
        }
        if self.weibull.t_count < 2 {
            return Err(ModelError::InsufficientData {
                needed: 2,
                got: self.weibull.t_count,
            });
        }
        if self.weibull.t_count > MAX_GRID_POINTS {
            return Err(ModelError::invalid(
                "t count",
                self.weibull.t_count as f64,
                format!("must be at most {MAX_GRID_POINTS}"),
            ));
        }
        if self.oc.acceptance_number >= self.oc.sample_size {
            return Err(ModelError::invalid(
                "acceptance number",
                f64::from(self.oc.acceptance_number),
                format!("must be within [0, {})", self.oc.sample_size),
            ));
        }
        if self.oc.p_step >= self.oc.p_end {
            return Err(ModelError::invalid(
                "p step",
                self.oc.p_step,
                format!("must be below p end ({})", self.oc.p_end),
            ));
        }
        if self.oc.p_end / self.oc.p_step > MAX_GRID_POINTS as f64 {
            return Err(ModelError::invalid(
                "p step",
                self.oc.p_step,
                format!("yields more than {MAX_GRID_POINTS} grid points"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let s = Settings::from_lookup(|_| None).unwrap();
        assert_eq!(s.binomial.sample_size, 100);
        assert_eq!(s.binomial.p_fail, 0.05);
        assert_eq!(s.weibull.t_count, 100);
        assert_eq!(s.oc.sample_size, 300);
        assert_eq!(s.oc.acceptance_number, 3);
        assert_eq!(s.oc.alpha, 0.05);
        assert_eq!(s.oc.beta, 0.10);
    }

    #[test]
    fn overrides_are_applied() {
        let s = Settings::from_lookup(lookup_from(&[
            ("RELC_BINOMIAL_N", "250"),
            ("RELC_WEIBULL_M", "2.5"),
            ("RELC_OC_SAMPLE_SIZE", "50"),
            ("RELC_OC_ACCEPTANCE_NUMBER", "1"),
        ]))
        .unwrap();
        assert_eq!(s.binomial.sample_size, 250);
        assert_eq!(s.weibull.shape, 2.5);
        assert_eq!(s.oc.sample_size, 50);
        assert_eq!(s.oc.acceptance_number, 1);
    }

    #[test]
    fn bad_override_is_an_error() {
        let err = Settings::from_lookup(lookup_from(&[("RELC_BINOMIAL_P", "1.5")])).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { .. }));

        let err = Settings::from_lookup(lookup_from(&[("RELC_OC_SAMPLE_SIZE", "ten")])).unwrap_err();
        assert!(matches!(err, ModelError::Parse { .. }));
    }

    #[test]
    fn grid_sizes_are_bounded() {
        let err = Settings::from_lookup(lookup_from(&[("RELC_OC_P_STEP", "1e-300")])).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { name: "p step", .. }));

        let err = Settings::from_lookup(lookup_from(&[("RELC_WEIBULL_T_COUNT", "4000000000")])).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { name: "t count", .. }));

        assert!(Settings::from_lookup(lookup_from(&[("RELC_MAX_SAMPLE_SIZE", "4000000000")])).is_err());

        let s = Settings::from_lookup(lookup_from(&[("RELC_WEIBULL_T_COUNT", "5000")])).unwrap();
        assert_eq!(s.weibull.t_count, 5000);
    }

    #[test]
    fn acceptance_number_checked_against_overridden_sample_size() {
        let err = Settings::from_lookup(lookup_from(&[("RELC_OC_SAMPLE_SIZE", "3")])).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { name: "acceptance number", .. }));
    }
}
