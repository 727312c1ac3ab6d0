//! Two-parameter Weibull evaluator.
//!
//! With shape `m` and scale `c` (characteristic life), and `x = (t / c)^m`:
//!
//! - `cdf(t) = 1 - exp(-x)`
//! - `pdf(t) = (m / t) * x * exp(-x)`
//! - `hazard(t) = (m / t) * x`
//! - `reliability(t) = exp(-x)`
//!
//! The hazard rises, stays flat, or falls with `t` for `m > 1`, `m = 1`, `m < 1`.

use tracing::debug;

use crate::domain::{WeibullConfig, params};
use crate::error::{ModelError, ModelResult};
use crate::math::linspace;

fn check(t: f64, m: f64, c: f64) -> ModelResult<f64> {
    params::validate_positive("shape parameter", m)?;
    params::validate_positive("scale parameter", c)?;
    // t = 0 makes the hazard 0/0 for m < 1; exclude it at the boundary.
    params::validate_positive("t", t)?;
    Ok((t / c).powf(m))
}

pub fn cdf(t: f64, m: f64, c: f64) -> ModelResult<f64> {
    let x = check(t, m, c)?;
    Ok(-(-x).exp_m1())
}

/// Evaluated in log space so a huge `x` underflows to 0 instead of `inf * 0`.
pub fn pdf(t: f64, m: f64, c: f64) -> ModelResult<f64> {
    let x = check(t, m, c)?;
    let ln_x = m * (t / c).ln();
    finite("pdf", t, (m.ln() - t.ln() + ln_x - x).exp())
}

/// Fails where `(m / t) * x` leaves the `f64` range, e.g. `t -> 0` with `m < 1`.
pub fn hazard(t: f64, m: f64, c: f64) -> ModelResult<f64> {
    let x = check(t, m, c)?;
    finite("hazard", t, m / t * x)
}

fn finite(what: &str, t: f64, value: f64) -> ModelResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ModelError::invalid("t", t, format!("{what} is not finite at this t")))
    }
}

/// Survival probability `R(t) = 1 - cdf(t)`.
pub fn reliability(t: f64, m: f64, c: f64) -> ModelResult<f64> {
    let x = check(t, m, c)?;
    Ok((-x).exp())
}

/// Parallel `t` / pdf / cdf / hazard sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeibullSeries {
    pub t: Vec<f64>,
    pub pdf: Vec<f64>,
    pub cdf: Vec<f64>,
    pub hazard: Vec<f64>,
}

/// Which Weibull function a view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeibullFunction {
    #[default]
    Cdf,
    Pdf,
    Hazard,
}

impl WeibullFunction {
    pub fn label(self) -> &'static str {
        match self {
            WeibullFunction::Cdf => "cdf",
            WeibullFunction::Pdf => "pdf",
            WeibullFunction::Hazard => "hazard",
        }
    }

    pub fn next(self) -> Self {
        match self {
            WeibullFunction::Cdf => WeibullFunction::Pdf,
            WeibullFunction::Pdf => WeibullFunction::Hazard,
            WeibullFunction::Hazard => WeibullFunction::Cdf,
        }
    }

    pub fn values(self, series: &WeibullSeries) -> &[f64] {
        match self {
            WeibullFunction::Cdf => &series.cdf,
            WeibullFunction::Pdf => &series.pdf,
            WeibullFunction::Hazard => &series.hazard,
        }
    }
}

/// Apply pdf, cdf and hazard elementwise. Fails on the first invalid `t`.
pub fn evaluate_series(ts: &[f64], m: f64, c: f64) -> ModelResult<WeibullSeries> {
    let mut out = WeibullSeries {
        t: Vec::with_capacity(ts.len()),
        pdf: Vec::with_capacity(ts.len()),
        cdf: Vec::with_capacity(ts.len()),
        hazard: Vec::with_capacity(ts.len()),
    };
    for &t in ts {
        out.t.push(t);
        out.pdf.push(pdf(t, m, c)?);
        out.cdf.push(cdf(t, m, c)?);
        out.hazard.push(hazard(t, m, c)?);
    }
    Ok(out)
}

/// Weibull model: shape, scale, a fixed `t` grid, and the last computed series.
#[derive(Debug, Clone)]
pub struct WeibullModel {
    config: WeibullConfig,
    series: WeibullSeries,
}

impl WeibullModel {
    pub fn new(config: WeibullConfig) -> ModelResult<Self> {
        let ts = time_grid(config.t_start, config.t_end, config.t_count)?;
        let series = evaluate_series(&ts, config.shape, config.scale)?;
        debug!(m = config.shape, c = config.scale, points = ts.len(), "weibull computed");
        Ok(Self { config, series })
    }

    pub fn shape(&self) -> f64 {
        self.config.shape
    }

    pub fn scale(&self) -> f64 {
        self.config.scale
    }

    pub fn config(&self) -> &WeibullConfig {
        &self.config
    }

    pub fn series(&self) -> &WeibullSeries {
        &self.series
    }

    pub fn set_shape(&mut self, m: f64) -> ModelResult<()> {
        let series = evaluate_series(&self.series.t, m, self.config.scale)?;
        debug!(m, "weibull shape updated");
        self.config.shape = m;
        self.series = series;
        Ok(())
    }

    pub fn set_scale(&mut self, c: f64) -> ModelResult<()> {
        let series = evaluate_series(&self.series.t, self.config.shape, c)?;
        debug!(c, "weibull scale updated");
        self.config.scale = c;
        self.series = series;
        Ok(())
    }

    /// Replace the `t` grid. On error the old grid and data stay.
    pub fn set_time_range(&mut self, t_start: f64, t_end: f64, t_count: usize) -> ModelResult<()> {
        let ts = time_grid(t_start, t_end, t_count)?;
        let series = evaluate_series(&ts, self.config.shape, self.config.scale)?;
        self.config.t_start = t_start;
        self.config.t_end = t_end;
        self.config.t_count = t_count;
        self.series = series;
        Ok(())
    }
}

fn time_grid(t_start: f64, t_end: f64, t_count: usize) -> ModelResult<Vec<f64>> {
    params::validate_positive("t start", t_start)?;
    if t_end <= t_start {
        return Err(ModelError::invalid(
            "t end",
            t_end,
            format!("must exceed t start ({t_start})"),
        ));
    }
    linspace(t_start, t_end, t_count)
}
