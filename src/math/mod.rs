//! Mathematical utilities: special functions, sample grids, and local interpolation.

pub mod grid;
pub mod interp;
pub mod special;

pub use grid::*;
pub use interp::*;
pub use special::*;
