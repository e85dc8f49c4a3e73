//! Blackbody photon spectra.
//!
//! Planck's law gives the spectral radiance
//!
//! ```text
//! B_λ(T) = 2 h c² / λ⁵ · 1 / (exp(h c / (λ k T)) - 1)     [W m⁻² sr⁻¹ m⁻¹]
//! ```
//!
//! Dividing by the photon energy `h c / λ` and multiplying by the solid angle
//! of the source yields a photon spectral flux density in `ph s⁻¹ m⁻² m⁻¹`.

/// Planck constant [J s].
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Speed of light [m/s].
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Boltzmann constant [J/K].
pub const BOLTZMANN: f64 = 1.380_649e-23;

/// Photon spectral radiance at one wavelength [ph s⁻¹ m⁻² sr⁻¹ m⁻¹].
pub fn photon_radiance(temperature: f64, wavelength: f64) -> f64 {
    if !(temperature > 0.0 && wavelength > 0.0) {
        return 0.0;
    }
    let x = PLANCK * SPEED_OF_LIGHT / (wavelength * BOLTZMANN * temperature);
    // B_λ / (h c / λ) = 2 c / λ⁴ / (e^x - 1)
    2.0 * SPEED_OF_LIGHT / wavelength.powi(4) / x.exp_m1()
}

/// Photon spectral flux density of a source at each wavelength.
pub fn blackbody_photon_flux(temperature: f64, wavelengths: &[f64], solid_angle: f64) -> Vec<f64> {
    wavelengths
        .iter()
        .map(|&l| photon_radiance(temperature, l) * solid_angle)
        .collect()
}
