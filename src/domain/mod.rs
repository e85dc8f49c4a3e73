//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement kinds and sky positions (`MeasurementKind`, `SkyPosition`)
//! - dense differential signals (`SignalCube`)
//! - extraction templates (`Template`)

pub mod types;

pub use types::*;
