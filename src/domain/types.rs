//! Shared domain types.
//!
//! These types sit between file I/O and extraction:
//!
//! - differential photon counts as a dense cube (`SignalCube`)
//! - where a template's point source sits on the sky (`SkyPosition`)
//! - templates and their grid cells (`Template`)

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which kind of signal a measurement file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeasurementKind {
    /// Differential photon counts of an observation.
    SyntheticMeasurement,
    /// Expected signal of a unit-flux point source at one sky position.
    Template,
}

impl MeasurementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementKind::SyntheticMeasurement => "synthetic-measurement",
            MeasurementKind::Template => "template",
        }
    }
}

/// Angular sky position relative to the star [rad].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    pub x: f64,
    pub y: f64,
}

/// Differential photon counts indexed as `[output][wavelength][time]`.
///
/// Each output is a `wavelengths × time_steps` matrix; all outputs share one
/// shape.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalCube {
    outputs: Vec<DMatrix<f64>>,
}

impl SignalCube {
    /// Build from per-output matrices, checking they share one non-empty shape.
    pub fn new(outputs: Vec<DMatrix<f64>>) -> Result<Self, AppError> {
        let Some(first) = outputs.first() else {
            return Err(AppError::new(3, "Signal has no differential outputs."));
        };
        let shape = first.shape();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(AppError::new(3, "Signal has no wavelengths or no time steps."));
        }
        if let Some((i, m)) = outputs.iter().enumerate().find(|(_, m)| m.shape() != shape) {
            return Err(AppError::new(
                3,
                format!(
                    "Output {i} has shape {:?}, expected {:?} (wavelengths × time steps).",
                    m.shape(),
                    shape
                ),
            ));
        }
        if outputs.iter().any(|m| m.iter().any(|v| !v.is_finite())) {
            return Err(AppError::new(3, "Signal contains non-finite values."));
        }
        Ok(Self { outputs })
    }

    /// Build from nested `[output][wavelength][time]` vectors.
    pub fn from_nested(data: Vec<Vec<Vec<f64>>>) -> Result<Self, AppError> {
        let mut outputs = Vec::with_capacity(data.len());
        for (o, rows) in data.into_iter().enumerate() {
            let n_wl = rows.len();
            let n_t = rows.first().map(|r| r.len()).unwrap_or(0);
            if let Some(l) = rows.iter().position(|r| r.len() != n_t) {
                return Err(AppError::new(
                    3,
                    format!("Ragged signal: output {o}, wavelength {l} has a different number of time steps."),
                ));
            }
            let flat: Vec<f64> = rows.into_iter().flatten().collect();
            outputs.push(DMatrix::from_row_slice(n_wl, n_t, &flat));
        }
        Self::new(outputs)
    }

    /// Nested `[output][wavelength][time]` vectors (for JSON files).
    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        self.outputs
            .iter()
            .map(|m| {
                m.row_iter()
                    .map(|row| row.iter().copied().collect())
                    .collect()
            })
            .collect()
    }

    /// `(outputs, wavelengths, time_steps)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let (wl, t) = self.outputs[0].shape();
        (self.outputs.len(), wl, t)
    }

    pub fn outputs(&self) -> &[DMatrix<f64>] {
        &self.outputs
    }

    pub fn output(&self, index: usize) -> &DMatrix<f64> {
        &self.outputs[index]
    }
}

/// A template signal and the sky position it was generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub signal: SignalCube,
    pub position: Option<SkyPosition>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_conversion_keeps_layout() {
        let nested = vec![
            vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
            vec![vec![7.0, 8.0, 9.0], vec![10.0, 11.0, 12.0]],
        ];
        let cube = SignalCube::from_nested(nested.clone()).unwrap();
        assert_eq!(cube.shape(), (2, 2, 3));
        assert_eq!(cube.output(0)[(1, 2)], 6.0);
        assert_eq!(cube.output(1)[(0, 1)], 8.0);
        assert_eq!(cube.to_nested(), nested);
    }

    #[test]
    fn rejects_ragged_and_empty_input() {
        let ragged = vec![vec![vec![1.0, 2.0], vec![3.0]]];
        let err = SignalCube::from_nested(ragged).unwrap_err();
        assert_eq!(err.exit_code(), 3);

        let mismatched = vec![vec![vec![1.0, 2.0]], vec![vec![1.0, 2.0], vec![3.0, 4.0]]];
        assert!(SignalCube::from_nested(mismatched).is_err());

        assert!(SignalCube::from_nested(Vec::new()).is_err());
        assert!(SignalCube::from_nested(vec![vec![]]).is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        let data = vec![vec![vec![1.0, f64::NAN]]];
        assert!(SignalCube::from_nested(data).is_err());
    }
}
