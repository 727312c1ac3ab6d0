//! Parse-and-validate boundary for user-supplied text.
//!
//! Front ends (CLI flags, environment overrides, TUI text boxes) hand raw text
//! to these functions. Only validated values are passed on to the models, so a
//! rejected input never touches model state.

use crate::error::{ModelError, ModelResult};
use crate::math::MAX_GRID_POINTS;

/// Parse a finite floating-point number.
pub fn parse_f64(name: &'static str, text: &str) -> ModelResult<f64> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| ModelError::Parse {
        name,
        input: trimmed.to_string(),
        expected: "number",
    })?;
    if !value.is_finite() {
        return Err(ModelError::invalid(name, value, "must be finite"));
    }
    Ok(value)
}

/// Parse a whole number. Negative values parse and are rejected by the range checks.
pub fn parse_integer(name: &'static str, text: &str) -> ModelResult<i64> {
    let trimmed = text.trim();
    trimmed.parse().map_err(|_| ModelError::Parse {
        name,
        input: trimmed.to_string(),
        expected: "integer",
    })
}

pub fn validate_probability(name: &'static str, value: f64) -> ModelResult<f64> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ModelError::invalid(name, value, "must be within [0, 1]"));
    }
    Ok(value)
}

pub fn validate_positive(name: &'static str, value: f64) -> ModelResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ModelError::invalid(name, value, "must be greater than 0"));
    }
    Ok(value)
}

pub fn validate_sample_size(value: i64, max: u32) -> ModelResult<u32> {
    if value < 1 {
        return Err(ModelError::invalid("sample size", value as f64, "must be at least 1"));
    }
    if value > i64::from(max) {
        return Err(ModelError::invalid(
            "sample size",
            value as f64,
            format!("must be at most {max}"),
        ));
    }
    Ok(value as u32)
}

/// Acceptance number `k` must satisfy `0 <= k < n`.
pub fn validate_acceptance_number(value: i64, sample_size: u32) -> ModelResult<u32> {
    if value < 0 || value >= i64::from(sample_size) {
        return Err(ModelError::invalid(
            "acceptance number",
            value as f64,
            format!("must be within [0, {sample_size})"),
        ));
    }
    Ok(value as u32)
}

pub fn parse_probability(name: &'static str, text: &str) -> ModelResult<f64> {
    validate_probability(name, parse_f64(name, text)?)
}

pub fn parse_positive(name: &'static str, text: &str) -> ModelResult<f64> {
    validate_positive(name, parse_f64(name, text)?)
}

pub fn parse_sample_size(text: &str, max: u32) -> ModelResult<u32> {
    validate_sample_size(parse_integer("sample size", text)?, max)
}

/// Grid point count, capped at [`MAX_GRID_POINTS`].
pub fn parse_grid_count(name: &'static str, text: &str) -> ModelResult<usize> {
    let value = parse_integer(name, text)?;
    if value < 1 || value > MAX_GRID_POINTS as i64 {
        return Err(ModelError::invalid(
            name,
            value as f64,
            format!("must be within [1, {MAX_GRID_POINTS}]"),
        ));
    }
    Ok(value as usize)
}

pub fn parse_acceptance_number(text: &str, sample_size: u32) -> ModelResult<u32> {
    validate_acceptance_number(parse_integer("acceptance number", text)?, sample_size)
}
