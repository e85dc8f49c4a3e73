//! Input/output helpers.
//!
//! - measurement and template JSON read/write (`measurement`)
//! - extraction result exports (CSV/JSON) (`export`)

pub mod export;
pub mod measurement;

pub use export::*;
pub use measurement::*;
