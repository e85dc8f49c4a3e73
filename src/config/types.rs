//! Typed configuration document.
//!
//! The document has three sections (`settings`, `mission`, `observatory`).
//! Field names match the YAML keys one to one; physical values are
//! [`Quantity`]s so their units survive a load/save round trip.

use serde::{Deserialize, Serialize};

use crate::units::{Dimension, Quantity};

/// The full configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    pub settings: Settings,
    pub mission: Mission,
    pub observatory: Observatory,
}

/// Simulation resolution, time stepping and noise toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Number of sky grid cells per axis.
    pub grid_size: usize,
    /// Duration of a single time step.
    pub time_step_size: Quantity,

    #[serde(default)]
    pub stellar_leakage: bool,
    #[serde(default)]
    pub local_zodi_leakage: bool,
    #[serde(default)]
    pub exozodi_leakage: bool,
    #[serde(default)]
    pub fiber_injection_variability: bool,
    #[serde(default)]
    pub optical_path_difference_variability: OpdVariability,
}

/// Optical path difference (OPD) variability toggle.
///
/// The perturbation is described by a power-law spectrum with the given
/// exponent, normalized to `rms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpdVariability {
    #[serde(default)]
    pub apply: bool,
    #[serde(default = "default_power_law_exponent")]
    pub power_law_exponent: f64,
    #[serde(default = "zero_length")]
    pub rms: Quantity,
}

impl Default for OpdVariability {
    fn default() -> Self {
        Self {
            apply: false,
            power_law_exponent: default_power_law_exponent(),
            rms: zero_length(),
        }
    }
}

fn default_power_law_exponent() -> f64 {
    1.0
}

fn zero_length() -> Quantity {
    Quantity::from_si(0.0, Dimension::Length)
}

/// Mission timing and baseline limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mission {
    pub integration_time: Quantity,
    pub modulation_period: Quantity,
    /// Ratio between the long and the short baseline of the array.
    pub baseline_ratio: u32,
    pub baseline_maximum: Quantity,
    pub baseline_minimum: Quantity,
    pub optimized_star_separation: OptimizedStarSeparation,
    pub optimized_wavelength: Quantity,
}

/// What the baseline is optimized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizedStarSeparation {
    /// Center of the host star's habitable zone.
    HabitableZone,
    /// Angular separation of the target planet.
    Planet,
}

impl OptimizedStarSeparation {
    pub const ALL: [OptimizedStarSeparation; 2] = [
        OptimizedStarSeparation::HabitableZone,
        OptimizedStarSeparation::Planet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptimizedStarSeparation::HabitableZone => "habitable-zone",
            OptimizedStarSeparation::Planet => "planet",
        }
    }
}

/// Observatory layout plus instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Observatory {
    pub array_configuration: ArrayConfiguration,
    pub beam_combination_scheme: BeamCombinationScheme,
    pub instrument_parameters: InstrumentParameters,
}

/// Collector array layout and its motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayConfiguration {
    EmmaXCircularRotation,
    EmmaXDoubleStretch,
    EquilateralTriangleCircularRotation,
    RegularPentagonCircularRotation,
}

impl ArrayConfiguration {
    pub const ALL: [ArrayConfiguration; 4] = [
        ArrayConfiguration::EmmaXCircularRotation,
        ArrayConfiguration::EmmaXDoubleStretch,
        ArrayConfiguration::EquilateralTriangleCircularRotation,
        ArrayConfiguration::RegularPentagonCircularRotation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArrayConfiguration::EmmaXCircularRotation => "emma-x-circular-rotation",
            ArrayConfiguration::EmmaXDoubleStretch => "emma-x-double-stretch",
            ArrayConfiguration::EquilateralTriangleCircularRotation => {
                "equilateral-triangle-circular-rotation"
            }
            ArrayConfiguration::RegularPentagonCircularRotation => {
                "regular-pentagon-circular-rotation"
            }
        }
    }

    /// Number of collector spacecraft.
    pub fn aperture_count(self) -> usize {
        match self {
            ArrayConfiguration::EmmaXCircularRotation | ArrayConfiguration::EmmaXDoubleStretch => 4,
            ArrayConfiguration::EquilateralTriangleCircularRotation => 3,
            ArrayConfiguration::RegularPentagonCircularRotation => 5,
        }
    }

    /// Whether the array rotates (as opposed to stretching) during the mission.
    pub fn is_rotating(self) -> bool {
        !matches!(self, ArrayConfiguration::EmmaXDoubleStretch)
    }
}

/// How the collector beams are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeamCombinationScheme {
    DoubleBracewell,
    #[serde(rename = "kernel-3")]
    Kernel3,
    #[serde(rename = "kernel-4")]
    Kernel4,
    #[serde(rename = "kernel-5")]
    Kernel5,
}

impl BeamCombinationScheme {
    pub const ALL: [BeamCombinationScheme; 4] = [
        BeamCombinationScheme::DoubleBracewell,
        BeamCombinationScheme::Kernel3,
        BeamCombinationScheme::Kernel4,
        BeamCombinationScheme::Kernel5,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BeamCombinationScheme::DoubleBracewell => "double-bracewell",
            BeamCombinationScheme::Kernel3 => "kernel-3",
            BeamCombinationScheme::Kernel4 => "kernel-4",
            BeamCombinationScheme::Kernel5 => "kernel-5",
        }
    }

    /// Number of input beams the combiner expects.
    pub fn input_count(self) -> usize {
        match self {
            BeamCombinationScheme::DoubleBracewell | BeamCombinationScheme::Kernel4 => 4,
            BeamCombinationScheme::Kernel3 => 3,
            BeamCombinationScheme::Kernel5 => 5,
        }
    }

    /// Number of differential outputs the combiner produces.
    pub fn differential_output_count(self) -> usize {
        match self {
            BeamCombinationScheme::DoubleBracewell
            | BeamCombinationScheme::Kernel3 => 1,
            BeamCombinationScheme::Kernel4 => 3,
            BeamCombinationScheme::Kernel5 => 2,
        }
    }
}

/// Instrument aperture and spectral parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentParameters {
    pub aperture_diameter: Quantity,
    pub spectral_resolving_power: f64,
    pub wavelength_range_lower_limit: Quantity,
    pub wavelength_range_upper_limit: Quantity,
    /// Fraction of collected light reaching the detector.
    pub unperturbed_instrument_throughput: f64,
}
