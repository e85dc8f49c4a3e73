//! `sygn` library crate.
//!
//! Configuration and target documents for a space-based nulling
//! interferometer simulation, plus ML extraction of planet signals from
//! differential photon counts. The binary (`sygn`) is a thin wrapper around
//! this library so that:
//!
//! - core logic is testable without spawning processes
//! - documents and extraction are reusable from other tools

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod extract;
pub mod instrument;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod target;
pub mod units;
