//! Input/output helpers.
//!
//! - curve JSON build/read/write (`curve`)
//! - CSV export of the same table (`export`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
