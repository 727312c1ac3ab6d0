//! Formatted terminal output.
//!
//! Formatting lives here so model code stays free of presentation and output
//! changes stay local (the golden tests below pin the layout).

use crate::models::{BinomialModel, OcCurve, WeibullModel, binomial};
use crate::report::{AreaCheck, LimitReport};

/// Header plus the `k | P(X = k) | P(X <= k)` table.
pub fn format_binomial_summary(model: &BinomialModel) -> String {
    let mut out = String::new();
    let series = model.series();

    out.push_str("=== relc - Binomial Distribution ===\n");
    out.push_str(&format!(
        "n={} | p={} | rows={}",
        model.sample_size(),
        model.p_fail(),
        series.len()
    ));
    if series.len() < model.sample_size() as usize + 1 {
        out.push_str(" (truncated once P(X <= k) ~ 1)");
    }
    out.push_str("\n\n");

    out.push_str(&format!("{:>6} {:>12} {:>12}\n", "k", "P(X = k)", "P(X <= k)"));
    out.push_str(&format!("{:->6} {:->12} {:->12}\n", "", "", ""));
    for ((k, pmf), cdf) in series.k.iter().zip(&series.pmf).zip(&series.cdf) {
        out.push_str(&format!("{k:>6} {pmf:>12.6} {cdf:>12.6}\n"));
    }

    out
}

/// Point probabilities for a single outcome.
pub fn format_exactly(k: u32, n: u32, p: f64) -> String {
    format!(
        "P(X = {k}) = {:.6} | P(X <= {k}) = {:.6}\n",
        binomial::pmf(k, n, p),
        binomial::cdf(k, n, p)
    )
}

pub fn format_weibull_summary(model: &WeibullModel, check: &AreaCheck) -> String {
    let mut out = String::new();
    let cfg = model.config();
    let s = model.series();

    out.push_str("=== relc - Weibull Model ===\n");
    out.push_str(&format!(
        "m={} | c={} | t=[{}, {}] ({} points)\n",
        model.shape(),
        model.scale(),
        cfg.t_start,
        cfg.t_end,
        s.t.len()
    ));
    out.push_str(&format!("Hazard trend: {}\n", hazard_trend(model.shape())));
    out.push('\n');

    if let (Some(first), Some(last)) = (s.t.first(), s.t.last()) {
        let n = s.t.len() - 1;
        out.push_str(&format!("{:>10} {:>12} {:>12} {:>12}\n", "t", "pdf", "cdf", "hazard"));
        out.push_str(&format!("{:->10} {:->12} {:->12} {:->12}\n", "", "", "", ""));
        out.push_str(&format!(
            "{first:>10.4} {:>12.6} {:>12.6} {:>12.6}\n",
            s.pdf[0], s.cdf[0], s.hazard[0]
        ));
        out.push_str(&format!(
            "{last:>10.4} {:>12.6} {:>12.6} {:>12.6}\n",
            s.pdf[n], s.cdf[n], s.hazard[n]
        ));
        out.push('\n');
    }

    out.push_str(&format!(
        "Area under pdf: {:.6} | cdf(t_end) - cdf(t_start): {:.6} | |diff|: {:.2e}\n",
        check.area,
        check.cdf_span,
        check.abs_error()
    ));

    out
}

fn hazard_trend(shape: f64) -> &'static str {
    if shape > 1.0 {
        "increasing (wear-out)"
    } else if shape < 1.0 {
        "decreasing (infant mortality)"
    } else {
        "constant (random failures)"
    }
}

pub fn format_oc_summary(curve: &OcCurve, report: &LimitReport) -> String {
    let mut out = String::new();
    let l = &report.limits;

    out.push_str("=== relc - OC Curve ===\n");
    out.push_str(&format!(
        "Plan: n={} | k={} | p=[0, {}) step {} ({} points)\n",
        curve.sample_size(),
        curve.acceptance_number(),
        curve.p_end(),
        curve.p_step(),
        curve.p().len()
    ));
    out.push('\n');

    out.push_str(&format!(
        "{:<6} {:>8} {:>12} {:>12}\n",
        "limit", "risk", "p (interp)", "p (nearest)"
    ));
    out.push_str(&format!("{:-<6} {:->8} {:->12} {:->12}\n", "", "", "", ""));
    out.push_str(&format!(
        "{:<6} {:>8.4} {:>12.6} {:>12}\n",
        "AQL",
        l.alpha,
        l.aql,
        fmt_opt(report.nearest_aql)
    ));
    out.push_str(&format!(
        "{:<6} {:>8.4} {:>12.6} {:>12}\n",
        "RQL",
        l.beta,
        l.rql,
        fmt_opt(report.nearest_rql)
    ));

    out
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{x:.6}"),
        None => "-".to_string(),
    }
}
