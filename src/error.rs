use thiserror::Error;

/// Errors raised by the parameter boundary and the evaluators.
///
/// Evaluators validate at entry and return one of these instead of letting
/// NaN or infinity reach the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Numeric input outside the domain of the function.
    #[error("invalid {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },

    /// Text that does not parse as the required kind of number.
    #[error("invalid {name}: '{input}' is not a valid {expected}")]
    Parse {
        name: &'static str,
        input: String,
        expected: &'static str,
    },

    /// A sampled-curve routine was given too few (or mismatched) points.
    #[error("need at least {needed} sample points, got {got}")]
    InsufficientData { needed: usize, got: usize },
}

impl ModelError {
    pub fn invalid(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

/// Convenience alias for evaluator results.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        Self::new(2, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_error_maps_to_usage_exit_code() {
        let err: AppError = ModelError::invalid("p", 1.5, "must be within [0, 1]").into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "invalid p = 1.5: must be within [0, 1]");
    }
}
