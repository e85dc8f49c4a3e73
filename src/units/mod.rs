//! Physical quantities written as `"<number> <unit>"` strings.
//!
//! - unit table + constants (`table`)
//! - parsing, conversion and serde support (`quantity`)

pub mod quantity;
pub mod table;

pub use quantity::*;
pub use table::*;
