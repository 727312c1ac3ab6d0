//! Terminal plots for each model.

mod ascii;

pub use ascii::{PlotSeries, VerticalMarker, render_curve_file, render_plot};

use crate::models::{BinomialModel, OcCurve, WeibullFunction, WeibullModel};

/// pmf and cdf against the outcome count `k`.
pub fn binomial_series(model: &BinomialModel) -> Vec<PlotSeries> {
    let s = model.series();
    let ks: Vec<f64> = s.k.iter().map(|&k| f64::from(k)).collect();
    vec![
        PlotSeries::new("P(X <= k)", '-', &ks, &s.cdf),
        PlotSeries::new("P(X = k)", '*', &ks, &s.pmf),
    ]
}

pub fn weibull_series(model: &WeibullModel, function: WeibullFunction) -> Vec<PlotSeries> {
    let s = model.series();
    vec![PlotSeries::new(function.label(), '-', &s.t, function.values(s))]
}

/// The OC curve plus AQL (`A`) and RQL (`R`) columns.
pub fn oc_series(curve: &OcCurve) -> (Vec<PlotSeries>, Vec<VerticalMarker>) {
    let limits = curve.limits();
    (
        vec![PlotSeries::new("P(accept)", '-', curve.p(), curve.accept())],
        vec![
            VerticalMarker { x: limits.aql, glyph: 'A' },
            VerticalMarker { x: limits.rql, glyph: 'R' },
        ],
    )
}

pub fn render_binomial(model: &BinomialModel, width: usize, height: usize) -> String {
    render_plot("k", &binomial_series(model), &[], width, height)
}

pub fn render_weibull(model: &WeibullModel, function: WeibullFunction, width: usize, height: usize) -> String {
    render_plot("t", &weibull_series(model, function), &[], width, height)
}

pub fn render_oc(curve: &OcCurve, width: usize, height: usize) -> String {
    let (series, markers) = oc_series(curve);
    render_plot("p", &series, &markers, width, height)
}
