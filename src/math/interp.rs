//! Local linear interpolation on sampled monotone curves.
//!
//! A target value is bracketed by binary search over a monotone sequence and
//! a straight line is fitted through the two adjacent samples. Targets outside
//! the sampled range use the end pair nearest to them, i.e. they extrapolate;
//! those results are approximate and callers should treat them as such.

use crate::error::{ModelError, ModelResult};

/// Indices of the two adjacent samples that bracket `target`.
///
/// `values` must be monotone (either direction). Out-of-range targets get the
/// end pair on their side.
pub fn bracket(values: &[f64], target: f64) -> ModelResult<(usize, usize)> {
    let n = values.len();
    if n < 2 {
        return Err(ModelError::InsufficientData { needed: 2, got: n });
    }

    let ascending = values[0] <= values[n - 1];
    let idx = if ascending {
        values.partition_point(|&v| v < target)
    } else {
        values.partition_point(|&v| v > target)
    };

    let lo = idx.saturating_sub(1).min(n - 2);
    Ok((lo, lo + 1))
}

/// Slope and intercept of the line through `(x0, y0)` and `(x1, y1)`.
///
/// `None` when the points share an x value.
pub fn line_through((x0, y0): (f64, f64), (x1, y1): (f64, f64)) -> Option<(f64, f64)> {
    let dx = x1 - x0;
    if dx == 0.0 {
        return None;
    }
    let slope = (y1 - y0) / dx;
    Some((slope, y0 - slope * x0))
}

/// x at which the sampled curve reaches `y_target` (`ys` monotone).
///
/// When the bracketing samples have equal y the line has no unique solution;
/// the x of the sample nearest the target is returned instead.
pub fn interpolate_x(xs: &[f64], ys: &[f64], y_target: f64) -> ModelResult<f64> {
    check_lengths(xs, ys)?;
    let (lo, hi) = bracket(ys, y_target)?;

    match line_through((xs[lo], ys[lo]), (xs[hi], ys[hi])) {
        Some((slope, intercept)) if slope != 0.0 => Ok((y_target - intercept) / slope),
        _ => Ok(if (ys[lo] - y_target).abs() <= (ys[hi] - y_target).abs() {
            xs[lo]
        } else {
            xs[hi]
        }),
    }
}

/// y of the sampled curve at `x_target` (`xs` monotone).
pub fn interpolate_y(xs: &[f64], ys: &[f64], x_target: f64) -> ModelResult<f64> {
    check_lengths(xs, ys)?;
    let (lo, hi) = bracket(xs, x_target)?;

    match line_through((xs[lo], ys[lo]), (xs[hi], ys[hi])) {
        Some((slope, intercept)) => Ok(slope * x_target + intercept),
        None => Ok(ys[lo]),
    }
}

/// Index of the element closest to `target`; ties keep the first.
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| {
            let d = (v - target).abs();
            match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((i, d)),
            }
        })
        .map(|(i, _)| i)
}

fn check_lengths(xs: &[f64], ys: &[f64]) -> ModelResult<()> {
    if xs.len() != ys.len() {
        return Err(ModelError::InsufficientData {
            needed: xs.len(),
            got: ys.len(),
        });
    }
    Ok(())
}
