//! Host star.

use std::f64::consts::PI;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::instrument::WavelengthBins;
use crate::math::{blackbody_photon_flux, meshgrid};
use crate::target::{check, check_positive};
use crate::units::{ASTRONOMICAL_UNIT, Dimension, Quantity, SOLAR_LUMINOSITY};

/// Margin added around a source so it is fully contained in its sky map.
pub(crate) const MAP_MARGIN: f64 = 1.05;

/// Effective temperature of the Sun used by the habitable zone fit [K].
const SUN_TEMPERATURE: f64 = 5780.0;

/// Kopparapu et al. (2013) coefficients: `(S_eff_sun, a, b, c)`.
/// Inner edge: runaway greenhouse. Outer edge: maximum greenhouse.
const HZ_INNER: (f64, f64, f64, f64) = (1.7665, 1.3351e-4, 3.1515e-9, -3.3488e-12);
const HZ_OUTER: (f64, f64, f64, f64) = (0.3240, 5.3221e-5, 1.4288e-9, -1.1049e-12);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Star {
    pub name: String,
    pub temperature: Quantity,
    pub radius: Quantity,
    pub mass: Quantity,
    pub distance: Quantity,
    pub luminosity: Quantity,
    pub right_ascension: Quantity,
    pub declination: Quantity,
}

impl Star {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_positive("star.temperature", &self.temperature, Dimension::Temperature)?;
        check_positive("star.radius", &self.radius, Dimension::Length)?;
        check_positive("star.mass", &self.mass, Dimension::Mass)?;
        check_positive("star.distance", &self.distance, Dimension::Length)?;
        check_positive("star.luminosity", &self.luminosity, Dimension::Power)?;
        check("star.right_ascension", &self.right_ascension, Dimension::Angle)?;
        let dec = check("star.declination", &self.declination, Dimension::Angle)?;
        if dec.abs() > PI / 2.0 + 1e-12 {
            return Err(ConfigError::invalid("star.declination", "must lie within ±90 deg"));
        }
        Ok(())
    }

    /// Distance in metres.
    pub fn distance_m(&self) -> f64 {
        self.distance.to_si()
    }

    /// Angular radius of the stellar disk [rad].
    pub fn angular_radius(&self) -> f64 {
        self.radius.to_si() / self.distance_m()
    }

    /// Solid angle of the stellar disk [sr].
    pub fn solid_angle(&self) -> f64 {
        PI * self.angular_radius().powi(2)
    }

    /// Radius of the habitable zone centre [m].
    ///
    /// Mean of the inner and outer edges from the Kopparapu et al. (2013)
    /// effective-flux fits, valid for effective temperatures 2600–7200 K.
    pub fn habitable_zone_central_radius(&self) -> f64 {
        let dt = self.temperature.to_si() - SUN_TEMPERATURE;
        let luminosity = self.luminosity.to_si() / SOLAR_LUMINOSITY;

        let flux = |(s, a, b, c): (f64, f64, f64, f64)| s + a * dt + b * dt.powi(2) + c * dt.powi(3);
        let inner = (luminosity / flux(HZ_INNER)).sqrt();
        let outer = (luminosity / flux(HZ_OUTER)).sqrt();

        (inner + outer) / 2.0 * ASTRONOMICAL_UNIT
    }

    /// Habitable zone centre as seen from the observer [rad].
    pub fn habitable_zone_central_angular_radius(&self) -> f64 {
        self.habitable_zone_central_radius() / self.distance_m()
    }

    /// Sky coordinate maps [rad] just large enough to contain the disk.
    pub fn sky_coordinates(&self, grid_size: usize) -> (DMatrix<f64>, DMatrix<f64>) {
        meshgrid(2.0 * MAP_MARGIN * self.angular_radius(), grid_size)
    }

    /// Photon spectral flux density per wavelength bin [ph s⁻¹ m⁻² m⁻¹].
    pub fn mean_spectral_flux_density(&self, bins: &WavelengthBins) -> Vec<f64> {
        blackbody_photon_flux(self.temperature.to_si(), bins.centers(), self.solid_angle())
    }

    /// One map per wavelength bin: cells inside the disk carry the star's
    /// spectral flux density, all others are zero.
    pub fn sky_brightness_distribution(&self, grid_size: usize, bins: &WavelengthBins) -> Vec<DMatrix<f64>> {
        let (x, y) = self.sky_coordinates(grid_size);
        let radius = self.angular_radius();
        let disk = x.zip_map(&y, |xi, yi| if xi.hypot(yi) <= radius { 1.0 } else { 0.0 });

        self.mean_spectral_flux_density(bins)
            .into_iter()
            .map(|flux| &disk * flux)
            .collect()
    }
}
