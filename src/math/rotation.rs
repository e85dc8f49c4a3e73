//! Planar rotation of the array frame.

use std::f64::consts::PI;

use nalgebra::Matrix2;

/// Rotation by `2π · time / rotation_period` (counter-clockwise).
///
/// Both arguments must be in the same time unit.
pub fn rotation_matrix_2d(time: f64, rotation_period: f64) -> Matrix2<f64> {
    let angle = 2.0 * PI * time / rotation_period;
    let (sin, cos) = angle.sin_cos();
    Matrix2::new(cos, -sin, sin, cos)
}
