//! Planets orbiting the host star.
//!
//! Planet geometry is expressed relative to the star, so every angular
//! quantity needs the star distance (metres).

use std::f64::consts::PI;

use nalgebra::{DMatrix, Vector2};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::instrument::WavelengthBins;
use crate::math::{blackbody_photon_flux, index_of_closest, meshgrid, rotation_matrix_2d};
use crate::target::star::MAP_MARGIN;
use crate::target::{check, check_positive};
use crate::units::{Dimension, Quantity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Planet {
    pub name: String,
    pub temperature: Quantity,
    pub radius: Quantity,
    pub mass: Quantity,
    /// Projected separation from the star along x.
    pub star_separation_x: Quantity,
    /// Projected separation from the star along y.
    pub star_separation_y: Quantity,
}

/// Position of a planet on a sky grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl Planet {
    pub(crate) fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let key = |field: &str| format!("planets[{index}].{field}");
        check_positive(&key("temperature"), &self.temperature, Dimension::Temperature)?;
        check_positive(&key("radius"), &self.radius, Dimension::Length)?;
        check_positive(&key("mass"), &self.mass, Dimension::Mass)?;
        let x = check(&key("star_separation_x"), &self.star_separation_x, Dimension::Length)?;
        let y = check(&key("star_separation_y"), &self.star_separation_y, Dimension::Length)?;
        if x == 0.0 && y == 0.0 {
            return Err(ConfigError::invalid(
                &key("star_separation_x"),
                "planet cannot sit on top of its star (both separations are zero)",
            ));
        }
        Ok(())
    }

    /// Solid angle of the planetary disk [sr].
    pub fn solid_angle(&self, star_distance: f64) -> f64 {
        PI * (self.radius.to_si() / star_distance).powi(2)
    }

    /// Angular separation from the star along x [rad].
    pub fn angular_separation_x(&self, star_distance: f64) -> f64 {
        self.star_separation_x.to_si() / star_distance
    }

    /// Angular separation from the star along y [rad].
    pub fn angular_separation_y(&self, star_distance: f64) -> f64 {
        self.star_separation_y.to_si() / star_distance
    }

    /// Total angular separation [rad].
    pub fn angular_separation(&self, star_distance: f64) -> f64 {
        self.angular_separation_x(star_distance)
            .hypot(self.angular_separation_y(star_distance))
    }

    /// Sky coordinate maps [rad] wide enough to contain the planet on both axes.
    pub fn sky_coordinates(&self, star_distance: f64, grid_size: usize) -> (DMatrix<f64>, DMatrix<f64>) {
        let extent = self
            .angular_separation_x(star_distance)
            .abs()
            .max(self.angular_separation_y(star_distance).abs());
        meshgrid(2.0 * MAP_MARGIN * extent, grid_size)
    }

    /// Grid cell closest to the planet on its own sky coordinate maps.
    pub fn grid_cell(&self, star_distance: f64, grid_size: usize) -> Option<GridCell> {
        let (x, y) = self.sky_coordinates(star_distance, grid_size);
        if grid_size == 0 {
            return None;
        }
        let xs: Vec<f64> = x.row(0).iter().copied().collect();
        let ys: Vec<f64> = y.column(0).iter().copied().collect();
        let col = index_of_closest(&xs, self.angular_separation_x(star_distance))?;
        let row = index_of_closest(&ys, self.angular_separation_y(star_distance))?;
        Some(GridCell { row, col })
    }

    /// Map with a single 1 at the planet's grid cell.
    pub fn position_map(&self, star_distance: f64, grid_size: usize) -> DMatrix<f64> {
        let mut map = DMatrix::zeros(grid_size, grid_size);
        if let Some(cell) = self.grid_cell(star_distance, grid_size) {
            map[(cell.row, cell.col)] = 1.0;
        }
        map
    }

    /// Photon spectral flux density per wavelength bin [ph s⁻¹ m⁻² m⁻¹].
    pub fn mean_spectral_flux_density(&self, star_distance: f64, bins: &WavelengthBins) -> Vec<f64> {
        blackbody_photon_flux(
            self.temperature.to_si(),
            bins.centers(),
            self.solid_angle(star_distance),
        )
    }

    /// One map per wavelength bin with the planet flux at its grid cell.
    pub fn sky_brightness_distribution(
        &self,
        star_distance: f64,
        grid_size: usize,
        bins: &WavelengthBins,
    ) -> Vec<DMatrix<f64>> {
        let position = self.position_map(star_distance, grid_size);
        self.mean_spectral_flux_density(star_distance, bins)
            .into_iter()
            .map(|flux| &position * flux)
            .collect()
    }

    /// Apparent planet position [rad] in the array frame at each time step.
    ///
    /// The array rotates once per `modulation_period`, so in its frame the
    /// sky rotates the opposite way.
    pub fn sky_track(
        &self,
        star_distance: f64,
        time_steps: usize,
        time_step: f64,
        modulation_period: f64,
    ) -> Vec<Vector2<f64>> {
        let p = Vector2::new(
            self.angular_separation_x(star_distance),
            self.angular_separation_y(star_distance),
        );
        (0..time_steps)
            .map(|i| rotation_matrix_2d(i as f64 * time_step, modulation_period).transpose() * p)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::tests::earth;
    use crate::units::{ASTRONOMICAL_UNIT, PARSEC};

    const D: f64 = 10.0 * PARSEC;

    #[test]
    fn separations_are_angles() {
        let p = earth();
        assert!((p.angular_separation_x(D) - ASTRONOMICAL_UNIT / D).abs() < 1e-20);
        assert_eq!(p.angular_separation_y(D), 0.0);
        // 1 au at 10 pc is 0.1 arcsec.
        let arcsec = p.angular_separation(D) / (PI / 180.0 / 3600.0);
        assert!((arcsec - 0.1).abs() < 1e-6, "{arcsec}");
    }

    #[test]
    fn position_map_marks_one_cell() {
        let p = earth();
        let map = p.position_map(D, 11);
        assert_eq!(map.sum(), 1.0);
        let cell = p.grid_cell(D, 11).unwrap();
        // x = +sep sits near the right edge (inside the margin), y = 0 at the centre row.
        assert_eq!(cell, GridCell { row: 5, col: 10 });
        assert_eq!(map[(5, 10)], 1.0);
    }

    #[test]
    fn negative_separation_lands_on_the_left() {
        let mut p = earth();
        p.star_separation_x = Quantity::parse("-1 au").unwrap();
        p.star_separation_y = Quantity::parse("0.5 au").unwrap();
        let cell = p.grid_cell(D, 21).unwrap();
        assert_eq!(cell.col, 0);
        // y = 0.5 · extent/2 / 1.05 → between centre and bottom row.
        assert!(cell.row > 10 && cell.row < 20);
    }

    #[test]
    fn sky_track_rotates_against_the_array() {
        let p = earth();
        let track = p.sky_track(D, 5, 25.0, 100.0);
        assert_eq!(track.len(), 5);
        let r = p.angular_separation(D);
        for v in &track {
            assert!((v.norm() - r).abs() < 1e-18);
        }
        // After a quarter rotation the planet appears along -y.
        assert!(track[1].x.abs() < 1e-18);
        assert!((track[1].y + r).abs() < 1e-18);
        assert!((track[4] - track[0]).norm() < 1e-18);
    }

    #[test]
    fn planet_flux_is_tiny_compared_to_star() {
        let star = crate::target::tests::sun_at_10pc();
        let p = earth();
        let bins = WavelengthBins::from_range(4e-6, 18.5e-6, 20.0).unwrap();
        let fp = p.mean_spectral_flux_density(D, &bins);
        let fs = star.mean_spectral_flux_density(&bins);
        for (a, b) in fp.iter().zip(fs.iter()) {
            assert!(a < b);
            assert!(*a > 0.0);
        }
    }

    #[test]
    fn validation_rejects_zero_separation() {
        let mut p = earth();
        p.star_separation_x = Quantity::parse("0 au").unwrap();
        let err = p.validate(2).unwrap_err();
        assert_eq!(err.key(), Some("planets[2].star_separation_x"));
    }
}
