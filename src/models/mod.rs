//! Statistical evaluators and the stateful models that cache their output.
//!
//! Evaluators are small, pure functions so that the session and the front ends
//! can stay generic. Each model wrapper owns the last computed sequences and
//! recomputes them in full whenever one of its parameters changes.

pub mod binomial;
pub mod oc;
pub mod weibull;

pub use binomial::{BinomialModel, BinomialSeries};
pub use oc::{OcCurve, QualityLimits};
pub use weibull::{WeibullFunction, WeibullModel, WeibullSeries};
