//! Unit symbol table and the physical constants behind it.
//!
//! Every symbol maps to a dimension and a factor that converts one unit into
//! the SI base unit of that dimension (m, s, kg, K, rad, W).

use std::f64::consts::PI;
use std::fmt;

use serde::Serialize;

/// Astronomical unit in metres (IAU 2012).
pub const ASTRONOMICAL_UNIT: f64 = 1.495_978_707e11;
/// Parsec in metres.
pub const PARSEC: f64 = 3.085_677_581_491_367e16;
/// Light year in metres (Julian year).
pub const LIGHT_YEAR: f64 = 9.460_730_472_580_8e15;
/// Nominal solar radius in metres (IAU 2015 B3).
pub const SOLAR_RADIUS: f64 = 6.957e8;
/// Equatorial Earth radius in metres.
pub const EARTH_RADIUS: f64 = 6.378_1e6;
/// Equatorial Jupiter radius in metres.
pub const JUPITER_RADIUS: f64 = 7.149_2e7;
/// Solar mass in kilograms.
pub const SOLAR_MASS: f64 = 1.988_409_87e30;
/// Earth mass in kilograms.
pub const EARTH_MASS: f64 = 5.972_2e24;
/// Jupiter mass in kilograms.
pub const JUPITER_MASS: f64 = 1.898_125e27;
/// Nominal solar luminosity in watts (IAU 2015 B3).
pub const SOLAR_LUMINOSITY: f64 = 3.828e26;
/// Seconds per day.
pub const DAY: f64 = 86_400.0;
/// Seconds per Julian year.
pub const YEAR: f64 = 365.25 * DAY;

/// Radians per arcsecond.
pub const ARCSEC: f64 = PI / (180.0 * 3600.0);
/// Radians per milliarcsecond.
pub const MILLIARCSEC: f64 = 1e-3 * ARCSEC;

/// Physical dimension of a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Dimensionless,
    Length,
    Time,
    Mass,
    Temperature,
    Angle,
    Power,
}

impl Dimension {
    /// Symbol of the SI unit quantities of this dimension are resolved to.
    pub fn si_symbol(self) -> &'static str {
        match self {
            Dimension::Dimensionless => "",
            Dimension::Length => "m",
            Dimension::Time => "s",
            Dimension::Mass => "kg",
            Dimension::Temperature => "K",
            Dimension::Angle => "rad",
            Dimension::Power => "W",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Dimensionless => "dimensionless",
            Dimension::Length => "length",
            Dimension::Time => "time",
            Dimension::Mass => "mass",
            Dimension::Temperature => "temperature",
            Dimension::Angle => "angle",
            Dimension::Power => "power",
        };
        f.write_str(name)
    }
}

/// A known unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    pub symbol: &'static str,
    pub dimension: Dimension,
    /// Multiply a magnitude in this unit by `factor` to get SI.
    pub factor: f64,
}

const fn unit(symbol: &'static str, dimension: Dimension, factor: f64) -> Unit {
    Unit {
        symbol,
        dimension,
        factor,
    }
}

static UNITS: &[Unit] = &[
    unit("", Dimension::Dimensionless, 1.0),
    // Length
    unit("m", Dimension::Length, 1.0),
    unit("km", Dimension::Length, 1e3),
    unit("cm", Dimension::Length, 1e-2),
    unit("mm", Dimension::Length, 1e-3),
    unit("um", Dimension::Length, 1e-6),
    unit("µm", Dimension::Length, 1e-6),
    unit("micron", Dimension::Length, 1e-6),
    unit("nm", Dimension::Length, 1e-9),
    unit("pm", Dimension::Length, 1e-12),
    unit("au", Dimension::Length, ASTRONOMICAL_UNIT),
    unit("AU", Dimension::Length, ASTRONOMICAL_UNIT),
    unit("pc", Dimension::Length, PARSEC),
    unit("ly", Dimension::Length, LIGHT_YEAR),
    unit("Rsun", Dimension::Length, SOLAR_RADIUS),
    unit("R_sun", Dimension::Length, SOLAR_RADIUS),
    unit("Rearth", Dimension::Length, EARTH_RADIUS),
    unit("R_earth", Dimension::Length, EARTH_RADIUS),
    unit("Rjup", Dimension::Length, JUPITER_RADIUS),
    // Time
    unit("s", Dimension::Time, 1.0),
    unit("min", Dimension::Time, 60.0),
    unit("h", Dimension::Time, 3600.0),
    unit("d", Dimension::Time, DAY),
    unit("day", Dimension::Time, DAY),
    unit("yr", Dimension::Time, YEAR),
    // Mass
    unit("kg", Dimension::Mass, 1.0),
    unit("g", Dimension::Mass, 1e-3),
    unit("Msun", Dimension::Mass, SOLAR_MASS),
    unit("M_sun", Dimension::Mass, SOLAR_MASS),
    unit("Mearth", Dimension::Mass, EARTH_MASS),
    unit("M_earth", Dimension::Mass, EARTH_MASS),
    unit("Mjup", Dimension::Mass, JUPITER_MASS),
    // Temperature (absolute scales only)
    unit("K", Dimension::Temperature, 1.0),
    // Angle
    unit("rad", Dimension::Angle, 1.0),
    unit("deg", Dimension::Angle, PI / 180.0),
    unit("arcmin", Dimension::Angle, 60.0 * ARCSEC),
    unit("arcsec", Dimension::Angle, ARCSEC),
    unit("mas", Dimension::Angle, MILLIARCSEC),
    // Power
    unit("W", Dimension::Power, 1.0),
    unit("Lsun", Dimension::Power, SOLAR_LUMINOSITY),
    unit("L_sun", Dimension::Power, SOLAR_LUMINOSITY),
];

impl Unit {
    /// Look up a unit by its exact symbol (case-sensitive: `m` is not `M`).
    pub fn lookup(symbol: &str) -> Option<Unit> {
        UNITS.iter().copied().find(|u| u.symbol == symbol)
    }

    /// The SI base unit of a dimension.
    pub fn si(dimension: Dimension) -> Unit {
        Unit::lookup(dimension.si_symbol()).unwrap_or(unit("", dimension, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_dimension_has_an_si_unit_in_the_table() {
        for dim in [
            Dimension::Dimensionless,
            Dimension::Length,
            Dimension::Time,
            Dimension::Mass,
            Dimension::Temperature,
            Dimension::Angle,
            Dimension::Power,
        ] {
            let u = Unit::lookup(dim.si_symbol()).unwrap();
            assert_eq!(u.dimension, dim);
            assert_eq!(u.factor, 1.0);
        }
    }

    #[test]
    fn symbols_are_unique() {
        for (i, a) in UNITS.iter().enumerate() {
            for b in &UNITS[i + 1..] {
                assert_ne!(a.symbol, b.symbol, "duplicate unit symbol");
            }
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(Unit::lookup("M").is_none());
        assert_eq!(Unit::lookup("mas").unwrap().dimension, Dimension::Angle);
        assert_eq!(Unit::lookup("min").unwrap().dimension, Dimension::Time);
    }
}
