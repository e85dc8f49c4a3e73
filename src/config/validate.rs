//! Semantic checks applied after the document has been parsed.
//!
//! Serde already rejects unknown keys, unknown enumeration names and
//! wrongly typed values. What remains are dimension checks on quantities
//! and the range invariants between related keys.

use tracing::warn;

use crate::config::{ConfigError, Configuration, MAX_GRID_SIZE};
use crate::instrument::check_bin_count;
use crate::units::{Dimension, Quantity};

impl Configuration {
    /// Check dimensions and ranges. Fails on the first violation, naming the
    /// dotted key path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.settings;
        let mission = &self.mission;
        let instrument = &self.observatory.instrument_parameters;

        if settings.grid_size == 0 || settings.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::invalid(
                "settings.grid_size",
                format!("must be in 1..={MAX_GRID_SIZE}"),
            ));
        }

        let step = si("settings.time_step_size", &settings.time_step_size, Dimension::Time)?;
        positive("settings.time_step_size", step)?;

        let opd = &settings.optical_path_difference_variability;
        let rms = si(
            "settings.optical_path_difference_variability.rms",
            &opd.rms,
            Dimension::Length,
        )?;
        if rms < 0.0 {
            return Err(ConfigError::invalid(
                "settings.optical_path_difference_variability.rms",
                "must be >= 0",
            ));
        }
        if !opd.power_law_exponent.is_finite() {
            return Err(ConfigError::invalid(
                "settings.optical_path_difference_variability.power_law_exponent",
                "must be finite",
            ));
        }

        let integration = si("mission.integration_time", &mission.integration_time, Dimension::Time)?;
        positive("mission.integration_time", integration)?;
        let modulation = si("mission.modulation_period", &mission.modulation_period, Dimension::Time)?;
        positive("mission.modulation_period", modulation)?;

        if step > integration {
            return Err(ConfigError::invalid(
                "settings.time_step_size",
                format!(
                    "{} exceeds mission.integration_time ({})",
                    settings.time_step_size, mission.integration_time
                ),
            ));
        }

        if mission.baseline_ratio == 0 {
            return Err(ConfigError::invalid("mission.baseline_ratio", "must be >= 1"));
        }

        let b_min = si("mission.baseline_minimum", &mission.baseline_minimum, Dimension::Length)?;
        let b_max = si("mission.baseline_maximum", &mission.baseline_maximum, Dimension::Length)?;
        positive("mission.baseline_minimum", b_min)?;
        if b_min >= b_max {
            return Err(ConfigError::invalid(
                "mission.baseline_minimum",
                format!(
                    "{} must be smaller than mission.baseline_maximum ({})",
                    mission.baseline_minimum, mission.baseline_maximum
                ),
            ));
        }

        let optimized = si(
            "mission.optimized_wavelength",
            &mission.optimized_wavelength,
            Dimension::Length,
        )?;
        positive("mission.optimized_wavelength", optimized)?;

        let aperture = si(
            "observatory.instrument_parameters.aperture_diameter",
            &instrument.aperture_diameter,
            Dimension::Length,
        )?;
        positive("observatory.instrument_parameters.aperture_diameter", aperture)?;

        let r = instrument.spectral_resolving_power;
        if !(r.is_finite() && r > 0.0) {
            return Err(ConfigError::invalid(
                "observatory.instrument_parameters.spectral_resolving_power",
                "must be finite and > 0",
            ));
        }

        let lower = si(
            "observatory.instrument_parameters.wavelength_range_lower_limit",
            &instrument.wavelength_range_lower_limit,
            Dimension::Length,
        )?;
        let upper = si(
            "observatory.instrument_parameters.wavelength_range_upper_limit",
            &instrument.wavelength_range_upper_limit,
            Dimension::Length,
        )?;
        positive("observatory.instrument_parameters.wavelength_range_lower_limit", lower)?;
        if lower >= upper {
            return Err(ConfigError::invalid(
                "observatory.instrument_parameters.wavelength_range_lower_limit",
                format!(
                    "{} must be smaller than wavelength_range_upper_limit ({})",
                    instrument.wavelength_range_lower_limit, instrument.wavelength_range_upper_limit
                ),
            ));
        }
        check_bin_count(lower, upper, r)?;

        let throughput = instrument.unperturbed_instrument_throughput;
        if !(throughput > 0.0 && throughput <= 1.0) {
            return Err(ConfigError::invalid(
                "observatory.instrument_parameters.unperturbed_instrument_throughput",
                "must be in (0, 1]",
            ));
        }

        let array = self.observatory.array_configuration;
        let scheme = self.observatory.beam_combination_scheme;
        if array.aperture_count() != scheme.input_count() {
            return Err(ConfigError::invalid(
                "observatory.beam_combination_scheme",
                format!(
                    "'{}' combines {} beams but '{}' has {} apertures",
                    scheme.as_str(),
                    scheme.input_count(),
                    array.as_str(),
                    array.aperture_count()
                ),
            ));
        }

        if optimized < lower || optimized > upper {
            warn!(
                optimized_wavelength = %mission.optimized_wavelength,
                lower = %instrument.wavelength_range_lower_limit,
                upper = %instrument.wavelength_range_upper_limit,
                "optimized wavelength lies outside the instrument wavelength range"
            );
        }

        Ok(())
    }
}

fn si(key: &str, quantity: &Quantity, dimension: Dimension) -> Result<f64, ConfigError> {
    quantity.si_as(dimension).map_err(|source| ConfigError::Quantity {
        key: key.to_string(),
        source,
    })
}

fn positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, "must be > 0"))
    }
}
