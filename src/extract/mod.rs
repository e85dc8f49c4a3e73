//! Signal extraction.
//!
//! Responsibilities:
//!
//! - fit every template against the data (parallel)
//! - build per-output cost maps on the sky grid
//! - report the most likely planet cell and its flux spectrum

pub mod mlm;

pub use mlm::*;
