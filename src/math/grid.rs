//! Sample grids and sampled-curve integration.
//!
//! Curves are evaluated on deterministic grids: Weibull time values are
//! linearly spaced with both endpoints included, OC defect rates step from 0
//! up to (but excluding) an end value.

use crate::error::{ModelError, ModelResult};

/// Largest grid either builder will allocate.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// `count` evenly spaced points from `start` to `end` (inclusive).
pub fn linspace(start: f64, end: f64, count: usize) -> ModelResult<Vec<f64>> {
    if !(start.is_finite() && end.is_finite()) {
        return Err(ModelError::invalid("range", end, "grid bounds must be finite"));
    }
    if count < 2 {
        return Err(ModelError::InsufficientData { needed: 2, got: count });
    }
    if count > MAX_GRID_POINTS {
        return Err(too_many_points(count as f64));
    }

    let step = (end - start) / (count as f64 - 1.0);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(start + step * i as f64);
    }
    // Pin the endpoint against accumulated rounding.
    out[count - 1] = end;
    Ok(out)
}

/// Points `start, start + step, ...` strictly below `end`.
pub fn arange(start: f64, end: f64, step: f64) -> ModelResult<Vec<f64>> {
    if !(start.is_finite() && end.is_finite()) || end <= start {
        return Err(ModelError::invalid("range", end, format!("must exceed start ({start})")));
    }
    if !step.is_finite() || step <= 0.0 {
        return Err(ModelError::invalid("step", step, "must be greater than 0"));
    }

    // The small slack keeps e.g. 0.2 / 0.001 from yielding an extra point.
    let count = ((end - start) / step - 1e-9).ceil().max(1.0);
    if count > MAX_GRID_POINTS as f64 {
        return Err(too_many_points(count));
    }
    let count = count as usize;
    Ok((0..count).map(|i| start + step * i as f64).collect())
}

fn too_many_points(count: f64) -> ModelError {
    ModelError::invalid("grid points", count, format!("must be at most {MAX_GRID_POINTS}"))
}

/// Area under a sampled curve by the trapezoid rule.
pub fn trapezoid_area(x: &[f64], y: &[f64]) -> ModelResult<f64> {
    if x.len() != y.len() {
        return Err(ModelError::InsufficientData {
            needed: x.len(),
            got: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(ModelError::InsufficientData { needed: 2, got: x.len() });
    }

    Ok(x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[1] + ys[0]))
        .sum())
}
