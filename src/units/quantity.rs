//! `"<number> <unit>"` scalars.
//!
//! Configuration and target documents write physical values as strings such
//! as `"100 d"`, `"4 m"` or `"0.1 nm"`. A `Quantity` keeps the text exactly
//! as written (so documents round-trip unchanged) and converts to SI on
//! demand.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::units::table::{Dimension, Unit};

/// Errors raised while parsing or converting a quantity.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid magnitude in '{0}'")]
    InvalidMagnitude(String),

    #[error("magnitude must be finite in '{0}'")]
    NonFinite(String),

    #[error("unknown unit '{unit}' in '{input}'")]
    UnknownUnit { unit: String, input: String },

    #[error("expected {expected}, got {found}")]
    DimensionMismatch { expected: Dimension, found: Dimension },
}

/// A magnitude with a unit.
///
/// Parsed quantities remember their source text and serialize it back
/// verbatim. Equality compares magnitude and unit only.
#[derive(Debug, Clone)]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
    literal: Option<String>,
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude == other.magnitude && self.unit == other.unit
    }
}

impl Quantity {
    /// Build a quantity from a magnitude and a unit symbol.
    pub fn new(magnitude: f64, symbol: &str) -> Result<Self, QuantityError> {
        if !magnitude.is_finite() {
            return Err(QuantityError::NonFinite(format!("{magnitude} {symbol}")));
        }
        let unit = Unit::lookup(symbol).ok_or_else(|| QuantityError::UnknownUnit {
            unit: symbol.to_string(),
            input: format!("{magnitude} {symbol}"),
        })?;
        Ok(Self {
            magnitude,
            unit,
            literal: None,
        })
    }

    /// A bare number.
    pub fn dimensionless(value: f64) -> Self {
        Self {
            magnitude: value,
            unit: Unit::si(Dimension::Dimensionless),
            literal: None,
        }
    }

    /// A value already expressed in the SI unit of `dimension`.
    pub fn from_si(value: f64, dimension: Dimension) -> Self {
        Self {
            magnitude: value,
            unit: Unit::si(dimension),
            literal: None,
        }
    }

    /// Parse `"<number> <unit>"`, `"<number><unit>"` or a bare number.
    pub fn parse(text: &str) -> Result<Self, QuantityError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (number, symbol) = split_magnitude(text);
        let magnitude: f64 = number
            .parse()
            .map_err(|_| QuantityError::InvalidMagnitude(text.to_string()))?;
        if !magnitude.is_finite() {
            return Err(QuantityError::NonFinite(text.to_string()));
        }

        let unit = Unit::lookup(symbol).ok_or_else(|| QuantityError::UnknownUnit {
            unit: symbol.to_string(),
            input: text.to_string(),
        })?;

        Ok(Self {
            magnitude,
            unit,
            literal: Some(text.to_string()),
        })
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Source text of a parsed quantity.
    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension
    }

    /// Value in the SI base unit of this quantity's dimension.
    pub fn to_si(&self) -> f64 {
        self.magnitude * self.unit.factor
    }

    /// SI value, provided the quantity has the expected dimension.
    pub fn si_as(&self, expected: Dimension) -> Result<f64, QuantityError> {
        if self.dimension() != expected {
            return Err(QuantityError::DimensionMismatch {
                expected,
                found: self.dimension(),
            });
        }
        Ok(self.to_si())
    }

    /// Value converted to another unit of the same dimension.
    pub fn to(&self, symbol: &str) -> Result<f64, QuantityError> {
        let target = Unit::lookup(symbol).ok_or_else(|| QuantityError::UnknownUnit {
            unit: symbol.to_string(),
            input: self.to_string(),
        })?;
        let si = self.si_as(target.dimension)?;
        Ok(si / target.factor)
    }
}

/// Split the leading float literal from the unit suffix.
fn split_magnitude(text: &str) -> (&str, &str) {
    if let Some((number, symbol)) = text.split_once(char::is_whitespace) {
        return (number, symbol.trim());
    }

    // No space: consume float syntax (digits, '.', signs, exponent) and
    // treat the rest as the unit. An 'e' only counts as an exponent marker
    // when a digit or sign follows it, so "4em" stays an unknown unit.
    let bytes = text.as_bytes();
    let mut end = 0;
    while end < bytes.len() {
        let b = bytes[end];
        let after_exponent = end > 0 && matches!(bytes[end - 1], b'e' | b'E');
        let is_exponent = matches!(b, b'e' | b'E')
            && end > 0
            && bytes
                .get(end + 1)
                .is_some_and(|n| n.is_ascii_digit() || *n == b'+' || *n == b'-');
        let is_sign = matches!(b, b'+' | b'-') && (end == 0 || after_exponent);
        if b.is_ascii_digit() || b == b'.' || is_sign || is_exponent {
            end += 1;
        } else {
            break;
        }
    }
    (&text[..end], &text[end..])
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol.is_empty() {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit.symbol)
        }
    }
}

impl std::str::FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::parse(s)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.literal {
            Some(text) => serializer.serialize_str(text),
            None if self.unit.symbol.is_empty() => serializer.serialize_f64(self.magnitude),
            None => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(Quantity::dimensionless(value)),
            Raw::Text(text) => Quantity::parse(&text).map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::table::{ASTRONOMICAL_UNIT, DAY, PARSEC};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn parses_magnitude_and_unit() {
        let q = Quantity::parse("100 d").unwrap();
        assert_eq!(q.magnitude(), 100.0);
        assert_eq!(q.unit().symbol, "d");
        assert_eq!(q.dimension(), Dimension::Time);
        assert!(close(q.to_si(), 100.0 * DAY));

        let q = Quantity::parse("0.1 nm").unwrap();
        assert!(close(q.to_si(), 1e-10));
    }

    #[test]
    fn parses_without_space_and_with_exponent() {
        let q = Quantity::parse("4m").unwrap();
        assert_eq!(q.to_si(), 4.0);

        let q = Quantity::parse("1.5e-3m").unwrap();
        assert!(close(q.to_si(), 1.5e-3));

        let q = Quantity::parse("  2E+2   um ").unwrap();
        assert!(close(q.to_si(), 200e-6));

        let q = Quantity::parse("10pc").unwrap();
        assert!(close(q.to_si(), 10.0 * PARSEC));
    }

    #[test]
    fn bare_number_is_dimensionless() {
        let q = Quantity::parse("0.05").unwrap();
        assert_eq!(q.dimension(), Dimension::Dimensionless);
        assert_eq!(q.to_si(), 0.05);
        assert_eq!(q.to_string(), "0.05");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Quantity::parse("   "), Err(QuantityError::Empty));
        assert!(matches!(
            Quantity::parse("abc m"),
            Err(QuantityError::InvalidMagnitude(_))
        ));
        assert!(matches!(
            Quantity::parse("4 furlong"),
            Err(QuantityError::UnknownUnit { .. })
        ));
        assert!(matches!(
            Quantity::parse("4em"),
            Err(QuantityError::UnknownUnit { .. })
        ));
        assert!(matches!(
            Quantity::parse("inf m"),
            Err(QuantityError::NonFinite(_))
        ));
    }

    #[test]
    fn converts_between_units_of_one_dimension() {
        let q = Quantity::parse("1 au").unwrap();
        assert!(close(q.to("km").unwrap(), ASTRONOMICAL_UNIT / 1e3));

        let err = q.to("s").unwrap_err();
        assert_eq!(
            err,
            QuantityError::DimensionMismatch {
                expected: Dimension::Time,
                found: Dimension::Length
            }
        );
        assert_eq!(err.to_string(), "expected time, got length");
    }

    #[test]
    fn display_keeps_the_literal_form() {
        assert_eq!(Quantity::parse("100 d").unwrap().to_string(), "100 d");
        assert_eq!(Quantity::parse("18.5um").unwrap().to_string(), "18.5 um");
    }

    #[test]
    fn serializes_the_source_text() {
        for text in ["1e-1 nm", "1d", "4.0 m"] {
            let q = Quantity::parse(text).unwrap();
            assert_eq!(q.literal(), Some(text));
            assert_eq!(serde_yaml::to_string(&q).unwrap().trim(), text);
        }
        assert_eq!(Quantity::parse("4.0 m").unwrap(), Quantity::parse("4m").unwrap());

        let q = Quantity::from_si(2.5, Dimension::Length);
        assert_eq!(q.literal(), None);
        assert_eq!(serde_yaml::to_string(&q).unwrap().trim(), "2.5 m");
    }

    #[test]
    fn deserializes_from_yaml_strings_and_numbers() {
        let q: Quantity = serde_yaml::from_str("\"4 m\"").unwrap();
        assert_eq!(q.to_si(), 4.0);

        let q: Quantity = serde_yaml::from_str("20").unwrap();
        assert_eq!(q.dimension(), Dimension::Dimensionless);
        assert_eq!(q.to_si(), 20.0);

        let err = serde_yaml::from_str::<Quantity>("\"4 parsnips\"").unwrap_err();
        assert!(err.to_string().contains("unknown unit 'parsnips'"));
    }
}
