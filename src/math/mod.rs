//! Numerical utilities: sky grids, rotations and blackbody spectra.

pub mod blackbody;
pub mod grid;
pub mod rotation;

pub use blackbody::*;
pub use grid::*;
pub use rotation::*;
