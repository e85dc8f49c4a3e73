//! Spectral binning of the instrument wavelength range.
//!
//! Bins follow the spectral resolving power `R = λ / Δλ`: starting at the
//! lower limit, each bin is `λ / R` wide, so bins widen towards the red end.
//! Whatever is left below the upper limit becomes one final, narrower bin.

use serde::Serialize;

use crate::config::{ConfigError, InstrumentParameters};
use crate::units::Dimension;

/// Bins narrower than this (in metres) are dropped.
const MIN_BIN_WIDTH: f64 = 1e-15;

/// Upper bound on the number of wavelength bins an instrument may produce.
pub const MAX_WAVELENGTH_BINS: usize = 100_000;

/// Approximate bin count for `[lower, upper]` at resolving power `r`:
/// `ln(upper / lower) / ln(1 + 1/r)` full bins plus one remainder bin.
pub fn expected_bin_count(lower: f64, upper: f64, r: f64) -> f64 {
    (upper / lower).ln() / (1.0 / r).ln_1p() + 1.0
}

/// Reject resolving powers whose binning would exceed [`MAX_WAVELENGTH_BINS`].
pub(crate) fn check_bin_count(lower: f64, upper: f64, r: f64) -> Result<(), ConfigError> {
    let count = expected_bin_count(lower, upper, r);
    if !(count.is_finite() && count <= MAX_WAVELENGTH_BINS as f64) {
        return Err(ConfigError::invalid(
            "observatory.instrument_parameters.spectral_resolving_power",
            format!("R={r} yields about {count:.0} wavelength bins, more than {MAX_WAVELENGTH_BINS}"),
        ));
    }
    Ok(())
}

/// Wavelength bin centers and widths in metres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WavelengthBins {
    centers: Vec<f64>,
    widths: Vec<f64>,
}

impl WavelengthBins {
    /// Bin the instrument's wavelength range.
    pub fn from_instrument(instrument: &InstrumentParameters) -> Result<Self, ConfigError> {
        let lower = instrument
            .wavelength_range_lower_limit
            .si_as(Dimension::Length)
            .map_err(|source| ConfigError::Quantity {
                key: "observatory.instrument_parameters.wavelength_range_lower_limit".to_string(),
                source,
            })?;
        let upper = instrument
            .wavelength_range_upper_limit
            .si_as(Dimension::Length)
            .map_err(|source| ConfigError::Quantity {
                key: "observatory.instrument_parameters.wavelength_range_upper_limit".to_string(),
                source,
            })?;
        Self::from_range(lower, upper, instrument.spectral_resolving_power)
    }

    /// Bin `[lower, upper]` (metres) at resolving power `r`.
    pub fn from_range(lower: f64, upper: f64, r: f64) -> Result<Self, ConfigError> {
        if !(lower.is_finite() && upper.is_finite() && lower > 0.0 && upper > lower) {
            return Err(ConfigError::invalid(
                "observatory.instrument_parameters.wavelength_range_lower_limit",
                format!("invalid wavelength range [{lower}, {upper}] m"),
            ));
        }
        if !(r.is_finite() && r > 0.0) {
            return Err(ConfigError::invalid(
                "observatory.instrument_parameters.spectral_resolving_power",
                "must be finite and > 0",
            ));
        }
        check_bin_count(lower, upper, r)?;

        let mut centers = Vec::new();
        let mut widths = Vec::new();

        let mut current = lower;
        while current + current / r < upper {
            let width = current / r;
            centers.push(current + width / 2.0);
            widths.push(width);
            current += width;
        }

        let last = upper - current;
        if last > MIN_BIN_WIDTH {
            centers.push(current + last / 2.0);
            widths.push(last);
        }

        Ok(Self { centers, widths })
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn len(&self) -> usize {
        self.centers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// Iterate `(center, width)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.centers.iter().copied().zip(self.widths.iter().copied())
    }
}
