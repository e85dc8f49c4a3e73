//! SI-resolved view of a configuration.
//!
//! Downstream numerics work on plain `f64`s in SI base units (m, s, rad).
//! This view is also what `sygn show --resolved` prints as JSON.

use serde::Serialize;

use crate::config::{
    ArrayConfiguration, BeamCombinationScheme, ConfigError, Configuration, OptimizedStarSeparation,
};
use crate::instrument::WavelengthBins;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfiguration {
    pub settings: ResolvedSettings,
    pub mission: ResolvedMission,
    pub observatory: ResolvedObservatory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSettings {
    pub grid_size: usize,
    pub time_step_size_s: f64,
    pub time_step_count: usize,
    pub stellar_leakage: bool,
    pub local_zodi_leakage: bool,
    pub exozodi_leakage: bool,
    pub fiber_injection_variability: bool,
    pub opd_variability_apply: bool,
    pub opd_variability_power_law_exponent: f64,
    pub opd_variability_rms_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedMission {
    pub integration_time_s: f64,
    pub modulation_period_s: f64,
    pub baseline_ratio: u32,
    pub baseline_maximum_m: f64,
    pub baseline_minimum_m: f64,
    pub optimized_star_separation: OptimizedStarSeparation,
    pub optimized_wavelength_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedObservatory {
    pub array_configuration: ArrayConfiguration,
    pub beam_combination_scheme: BeamCombinationScheme,
    pub aperture_count: usize,
    pub differential_output_count: usize,
    pub aperture_diameter_m: f64,
    pub spectral_resolving_power: f64,
    pub wavelength_range_lower_limit_m: f64,
    pub wavelength_range_upper_limit_m: f64,
    pub wavelength_bin_count: usize,
    pub unperturbed_instrument_throughput: f64,
}

impl Configuration {
    /// Validate, then convert every quantity to SI.
    pub fn resolve(&self) -> Result<ResolvedConfiguration, ConfigError> {
        self.validate()?;

        let settings = &self.settings;
        let mission = &self.mission;
        let observatory = &self.observatory;
        let instrument = &observatory.instrument_parameters;
        let opd = &settings.optical_path_difference_variability;

        // Dimensions were checked by `validate`, so `to_si` is safe here.
        Ok(ResolvedConfiguration {
            settings: ResolvedSettings {
                grid_size: settings.grid_size,
                time_step_size_s: settings.time_step_size.to_si(),
                time_step_count: self.time_step_count()?,
                stellar_leakage: settings.stellar_leakage,
                local_zodi_leakage: settings.local_zodi_leakage,
                exozodi_leakage: settings.exozodi_leakage,
                fiber_injection_variability: settings.fiber_injection_variability,
                opd_variability_apply: opd.apply,
                opd_variability_power_law_exponent: opd.power_law_exponent,
                opd_variability_rms_m: opd.rms.to_si(),
            },
            mission: ResolvedMission {
                integration_time_s: mission.integration_time.to_si(),
                modulation_period_s: mission.modulation_period.to_si(),
                baseline_ratio: mission.baseline_ratio,
                baseline_maximum_m: mission.baseline_maximum.to_si(),
                baseline_minimum_m: mission.baseline_minimum.to_si(),
                optimized_star_separation: mission.optimized_star_separation,
                optimized_wavelength_m: mission.optimized_wavelength.to_si(),
            },
            observatory: ResolvedObservatory {
                array_configuration: observatory.array_configuration,
                beam_combination_scheme: observatory.beam_combination_scheme,
                aperture_count: observatory.array_configuration.aperture_count(),
                differential_output_count: observatory
                    .beam_combination_scheme
                    .differential_output_count(),
                aperture_diameter_m: instrument.aperture_diameter.to_si(),
                spectral_resolving_power: instrument.spectral_resolving_power,
                wavelength_range_lower_limit_m: instrument.wavelength_range_lower_limit.to_si(),
                wavelength_range_upper_limit_m: instrument.wavelength_range_upper_limit.to_si(),
                wavelength_bin_count: WavelengthBins::from_instrument(instrument)?.len(),
                unperturbed_instrument_throughput: instrument.unperturbed_instrument_throughput,
            },
        })
    }
}
