//! Domain types shared by the models, the session, and the front ends.
//!
//! This module defines:
//!
//! - per-model configuration structs (`BinomialConfig`, `WeibullConfig`, `OcConfig`)
//! - the editable parameter names (`Field`)
//! - exported curve files (`CurveFile`, `CurveKind`, `SeriesColumn`)
//! - the text parse-and-validate boundary (`params`)

pub mod params;
pub mod types;

pub use params::*;
pub use types::*;
