//! Configuration document: loading, validation and SI resolution.
//!
//! - typed document (`types`)
//! - semantic validation (`validate`)
//! - SI view (`resolved`)

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::units::{Dimension, QuantityError};

pub mod resolved;
pub mod types;
pub mod validate;

pub use resolved::*;
pub use types::*;

/// Environment variable naming the default configuration file.
pub const CONFIG_ENV: &str = "SYGN_CONFIG";

/// Largest accepted `settings.grid_size`; sky maps hold `grid_size²` cells.
pub const MAX_GRID_SIZE: usize = 1024;

/// Errors raised while loading or validating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{key}: {source}")]
    Quantity {
        key: String,
        #[source]
        source: QuantityError,
    },

    #[error("{key}: {message}")]
    Invalid { key: String, message: String },
}

impl ConfigError {
    pub fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Dotted key the error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::Quantity { key, .. } | ConfigError::Invalid { key, .. } => Some(key),
            ConfigError::Io { .. } | ConfigError::Yaml(_) => None,
        }
    }
}

impl Configuration {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading configuration");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Configuration = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to YAML. Quantities keep their original unit.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Number of time steps covering the integration time.
    pub fn time_step_count(&self) -> Result<usize, ConfigError> {
        self.settings.time_step_count(&self.mission)
    }
}

impl Settings {
    /// `ceil(integration_time / time_step_size)`, at least 1.
    pub fn time_step_count(&self, mission: &Mission) -> Result<usize, ConfigError> {
        let step = self
            .time_step_size
            .si_as(Dimension::Time)
            .map_err(|source| ConfigError::Quantity {
                key: "settings.time_step_size".to_string(),
                source,
            })?;
        let total = mission
            .integration_time
            .si_as(Dimension::Time)
            .map_err(|source| ConfigError::Quantity {
                key: "mission.integration_time".to_string(),
                source,
            })?;

        let ratio = total / step;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(ConfigError::invalid(
                "settings.time_step_size",
                "does not divide mission.integration_time into a finite number of steps",
            ));
        }
        // Guard against 100 d / 1 d evaluating to 100.00000000000001.
        let count = (ratio - 1e-9).ceil().max(1.0);
        Ok(count as usize)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const EXAMPLE: &str = r#"
settings:
  grid_size: 50
  time_step_size: 1 d
  stellar_leakage: true
  local_zodi_leakage: true
  exozodi_leakage: true
  fiber_injection_variability: false
  optical_path_difference_variability:
    apply: true
    power_law_exponent: 1
    rms: 0.1 nm

mission:
  integration_time: 100 d
  modulation_period: 100 d
  baseline_ratio: 6
  baseline_maximum: 600 m
  baseline_minimum: 9 m
  optimized_star_separation: habitable-zone
  optimized_wavelength: 15 um

observatory:
  array_configuration: emma-x-circular-rotation
  beam_combination_scheme: double-bracewell
  instrument_parameters:
    aperture_diameter: 4 m
    spectral_resolving_power: 20
    wavelength_range_lower_limit: 4 um
    wavelength_range_upper_limit: 18.5 um
    unperturbed_instrument_throughput: 0.05
"#;

    pub(crate) fn example() -> Configuration {
        Configuration::from_yaml(EXAMPLE).unwrap()
    }

    fn with(from: &str, to: &str) -> String {
        assert!(EXAMPLE.contains(from), "fixture does not contain '{from}'");
        EXAMPLE.replacen(from, to, 1)
    }

    fn invalid_key(yaml: &str) -> String {
        let err = Configuration::from_yaml(yaml).unwrap_err();
        err.key()
            .unwrap_or_else(|| panic!("expected a keyed error, got: {err}"))
            .to_string()
    }

    #[test]
    fn demo_document_loads() {
        let config = Configuration::load(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/config.yaml")).unwrap();
        assert_eq!(config.time_step_count().unwrap(), 100);
    }

    #[test]
    fn loads_the_example_document() {
        let config = example();
        assert_eq!(config.settings.grid_size, 50);
        assert!(config.settings.stellar_leakage);
        assert!(!config.settings.fiber_injection_variability);
        let opd = &config.settings.optical_path_difference_variability;
        assert!(opd.apply);
        assert_eq!(opd.power_law_exponent, 1.0);
        assert!((opd.rms.to_si() - 1e-10).abs() < 1e-22);

        assert_eq!(config.mission.baseline_ratio, 6);
        assert_eq!(
            config.mission.optimized_star_separation,
            OptimizedStarSeparation::HabitableZone
        );
        assert_eq!(
            config.observatory.array_configuration,
            ArrayConfiguration::EmmaXCircularRotation
        );
        assert_eq!(
            config.observatory.beam_combination_scheme,
            BeamCombinationScheme::DoubleBracewell
        );
        assert_eq!(
            config.observatory.instrument_parameters.spectral_resolving_power,
            20.0
        );
        assert_eq!(config.time_step_count().unwrap(), 100);
    }

    #[test]
    fn round_trips_through_yaml_without_loss() {
        let config = example();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("integration_time: 100 d"));
        assert!(yaml.contains("rms: 0.1 nm"));
        assert!(yaml.contains("wavelength_range_upper_limit: 18.5 um"));
        assert!(yaml.contains("array_configuration: emma-x-circular-rotation"));

        let again = Configuration::from_yaml(&yaml).unwrap();
        assert_eq!(again, config);

        let written = with("rms: 0.1 nm", "rms: 1e-1 nm")
            .replacen("time_step_size: 1 d", "time_step_size: 1d", 1)
            .replacen("aperture_diameter: 4 m", "aperture_diameter: 4.0 m", 1);
        let config = Configuration::from_yaml(&written).unwrap();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("rms: 1e-1 nm"), "{yaml}");
        assert!(yaml.contains("time_step_size: 1d"), "{yaml}");
        assert!(yaml.contains("aperture_diameter: 4.0 m"), "{yaml}");
        assert_eq!(Configuration::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn noise_toggles_default_to_off() {
        let yaml = EXAMPLE
            .lines()
            .filter(|l| {
                !(l.contains("leakage")
                    || l.contains("fiber_injection")
                    || l.contains("optical_path")
                    || l.contains("apply")
                    || l.contains("power_law")
                    || l.contains("rms"))
            })
            .collect::<Vec<_>>()
            .join("\n");
        let config = Configuration::from_yaml(&yaml).unwrap();
        assert!(!config.settings.stellar_leakage);
        assert!(!config.settings.exozodi_leakage);
        assert_eq!(
            config.settings.optical_path_difference_variability,
            OpdVariability::default()
        );
    }

    #[test]
    fn rejects_unknown_keys_and_enum_values() {
        let err = Configuration::from_yaml(&with("grid_size: 50", "grid_size: 50\n  grid_sise: 4"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().contains("grid_sise"), "{err}");

        let err = Configuration::from_yaml(&with("double-bracewell", "triple-bracewell")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("triple-bracewell"), "{msg}");
        assert!(msg.contains("double-bracewell"), "{msg}");

        let err = Configuration::from_yaml(&with("habitable-zone", "moon")).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn rejects_missing_sections_and_keys() {
        assert!(Configuration::from_yaml("").is_err());
        let no_mission: String = EXAMPLE.split("mission:").next().unwrap().to_string();
        let err = Configuration::from_yaml(&no_mission).unwrap_err();
        assert!(err.to_string().contains("mission"), "{err}");

        let err = Configuration::from_yaml(&with("  baseline_ratio: 6\n", "")).unwrap_err();
        assert!(err.to_string().contains("baseline_ratio"), "{err}");
    }

    #[test]
    fn wrong_dimension_names_the_key() {
        let yaml = with("integration_time: 100 d", "integration_time: 100 m");
        let err = Configuration::from_yaml(&yaml).unwrap_err();
        assert_eq!(err.key(), Some("mission.integration_time"));
        assert_eq!(
            err.to_string(),
            "mission.integration_time: expected time, got length"
        );
    }

    #[test]
    fn range_invariants_name_the_key() {
        assert_eq!(invalid_key(&with("grid_size: 50", "grid_size: 0")), "settings.grid_size");
        assert_eq!(invalid_key(&with("grid_size: 50", "grid_size: 4294967296")), "settings.grid_size");
        assert_eq!(
            invalid_key(&with("modulation_period: 100 d", "modulation_period: 0 d")),
            "mission.modulation_period"
        );
        assert_eq!(
            invalid_key(&with("integration_time: 100 d", "integration_time: 0 d")),
            "mission.integration_time"
        );
        assert_eq!(
            invalid_key(&with("aperture_diameter: 4 m", "aperture_diameter: 0 m")),
            "observatory.instrument_parameters.aperture_diameter"
        );
        assert_eq!(
            invalid_key(&with("power_law_exponent: 1", "power_law_exponent: .nan")),
            "settings.optical_path_difference_variability.power_law_exponent"
        );
        assert_eq!(
            invalid_key(&with("spectral_resolving_power: 20", "spectral_resolving_power: 1e9")),
            "observatory.instrument_parameters.spectral_resolving_power"
        );
        assert_eq!(
            invalid_key(&with("baseline_minimum: 9 m", "baseline_minimum: 700 m")),
            "mission.baseline_minimum"
        );
        assert_eq!(
            invalid_key(&with("lower_limit: 4 um", "lower_limit: 20 um")),
            "observatory.instrument_parameters.wavelength_range_lower_limit"
        );
        assert_eq!(
            invalid_key(&with("throughput: 0.05", "throughput: 1.5")),
            "observatory.instrument_parameters.unperturbed_instrument_throughput"
        );
        assert_eq!(
            invalid_key(&with("baseline_ratio: 6", "baseline_ratio: 0")),
            "mission.baseline_ratio"
        );
        assert_eq!(
            invalid_key(&with("time_step_size: 1 d", "time_step_size: 200 d")),
            "settings.time_step_size"
        );
        assert_eq!(
            invalid_key(&with("rms: 0.1 nm", "rms: -0.1 nm")),
            "settings.optical_path_difference_variability.rms"
        );
        assert_eq!(
            invalid_key(&with("spectral_resolving_power: 20", "spectral_resolving_power: 0")),
            "observatory.instrument_parameters.spectral_resolving_power"
        );
    }

    #[test]
    fn beam_combiner_must_match_aperture_count() {
        let yaml = with("double-bracewell", "kernel-3");
        assert_eq!(invalid_key(&yaml), "observatory.beam_combination_scheme");

        let yaml = with("emma-x-circular-rotation", "equilateral-triangle-circular-rotation")
            .replacen("double-bracewell", "kernel-3", 1);
        assert!(Configuration::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn optimized_wavelength_outside_range_is_only_a_warning() {
        let yaml = with("optimized_wavelength: 15 um", "optimized_wavelength: 30 um");
        assert!(Configuration::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn resolves_to_si() {
        let resolved = example().resolve().unwrap();
        assert_eq!(resolved.settings.time_step_count, 100);
        assert_eq!(resolved.settings.time_step_size_s, 86_400.0);
        assert_eq!(resolved.mission.baseline_maximum_m, 600.0);
        assert!((resolved.mission.optimized_wavelength_m - 15e-6).abs() < 1e-18);
        assert_eq!(resolved.observatory.aperture_count, 4);
        assert_eq!(resolved.observatory.differential_output_count, 1);
        assert!(resolved.observatory.wavelength_bin_count > 0);

        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(
            json["observatory"]["array_configuration"],
            "emma-x-circular-rotation"
        );
        assert_eq!(json["mission"]["optimized_star_separation"], "habitable-zone");
    }

    #[test]
    fn enum_names_round_trip() {
        for a in ArrayConfiguration::ALL {
            let parsed: ArrayConfiguration = serde_yaml::from_str(a.as_str()).unwrap();
            assert_eq!(parsed, a);
        }
        for s in BeamCombinationScheme::ALL {
            let parsed: BeamCombinationScheme = serde_yaml::from_str(s.as_str()).unwrap();
            assert_eq!(parsed, s);
        }
        for o in OptimizedStarSeparation::ALL {
            let parsed: OptimizedStarSeparation = serde_yaml::from_str(o.as_str()).unwrap();
            assert_eq!(parsed, o);
        }
    }

    #[test]
    fn load_reports_missing_files() {
        let err = Configuration::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
