//! Target system: one host star and its planets.
//!
//! Target documents are YAML files with the same `"<number> <unit>"`
//! convention as the configuration document:
//!
//! ```yaml
//! star:
//!   name: Sun
//!   temperature: 5780 K
//!   radius: 1 Rsun
//!   mass: 1 Msun
//!   distance: 10 pc
//!   luminosity: 1 Lsun
//!   right_ascension: 10 deg
//!   declination: 45 deg
//! planets:
//!   - name: Earth
//!     temperature: 254 K
//!     radius: 1 Rearth
//!     mass: 1 Mearth
//!     star_separation_x: 1 au
//!     star_separation_y: 0 au
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConfigError;
use crate::units::{Dimension, Quantity};

pub mod planet;
pub mod star;

pub use planet::*;
pub use star::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSystem {
    pub star: Star,
    #[serde(default)]
    pub planets: Vec<Planet>,
}

impl TargetSystem {
    /// Read and validate a target file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading target system");
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a target document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let target: TargetSystem = serde_yaml::from_str(yaml)?;
        target.validate()?;
        Ok(target)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.star.validate()?;

        let mut names = HashSet::new();
        for (i, planet) in self.planets.iter().enumerate() {
            planet.validate(i)?;
            if !names.insert(planet.name.as_str()) {
                return Err(ConfigError::invalid(
                    &format!("planets[{i}].name"),
                    format!("duplicate planet name '{}'", planet.name),
                ));
            }
        }
        Ok(())
    }

    pub fn planet(&self, name: &str) -> Option<&Planet> {
        self.planets.iter().find(|p| p.name == name)
    }
}

pub(crate) fn check(key: &str, quantity: &Quantity, dimension: Dimension) -> Result<f64, ConfigError> {
    quantity.si_as(dimension).map_err(|source| ConfigError::Quantity {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn check_positive(key: &str, quantity: &Quantity, dimension: Dimension) -> Result<f64, ConfigError> {
    let value = check(key, quantity, dimension)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::invalid(key, "must be > 0"))
    }
}
