//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (nearest-cell sampling onto a fixed-size
//! character grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Row 0 of a map is drawn at the top.

use nalgebra::DMatrix;

use crate::math::{index_of_closest, linspace};
use crate::target::Planet;
use crate::target::star::MAP_MARGIN;
use crate::units::MILLIARCSEC;

/// Character ramp from lowest to highest cost.
pub const RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Render a cost map as a framed heat map of `width × height` characters.
pub fn render_cost_map(map: &DMatrix<f64>, title: &str, width: usize, height: usize) -> String {
    let (rows, cols) = map.shape();
    let mut out = String::new();
    if rows == 0 || cols == 0 {
        out.push_str(&format!("Cost map: {title} | empty\n"));
        return out;
    }

    let width = width.max(1);
    let height = height.max(1);
    let (min, max) = finite_range(map).unwrap_or((0.0, 0.0));

    out.push_str(&format!(
        "Cost map: {title} | grid={rows}x{cols} | min={min:.3e} max={max:.3e}\n"
    ));
    out.push_str(&frame(width));

    for y in 0..height {
        let r = y * rows / height;
        out.push('|');
        for x in 0..width {
            let c = x * cols / width;
            out.push(shade(map[(r, c)], min, max));
        }
        out.push_str("|\n");
    }

    out.push_str(&frame(width));
    out
}

/// Render where a planet sits on its sky grid: `*` star, `P` planet, `.` empty.
pub fn render_planet_map(planet: &Planet, star_distance: f64, grid_size: usize) -> String {
    let mut out = String::new();
    let Some(cell) = planet.grid_cell(star_distance, grid_size) else {
        out.push_str(&format!("Planet {}: empty grid\n", planet.name));
        return out;
    };

    let extent = MAP_MARGIN
        * planet
            .angular_separation_x(star_distance)
            .abs()
            .max(planet.angular_separation_y(star_distance).abs());
    let axis = linspace(-extent, extent, grid_size);
    let centre = index_of_closest(&axis, 0.0).unwrap_or(0);

    out.push_str(&format!(
        "Planet {}: cell ({},{}) on a {grid_size}x{grid_size} grid spanning ±{:.3} mas\n",
        planet.name,
        cell.row,
        cell.col,
        extent / MILLIARCSEC
    ));

    let mut grid = vec![vec!['.'; grid_size]; grid_size];
    grid[centre][centre] = '*';
    grid[cell.row][cell.col] = 'P';
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn shade(v: f64, min: f64, max: f64) -> char {
    if !v.is_finite() {
        return '?';
    }
    let span = max - min;
    if span <= 0.0 {
        return RAMP[0];
    }
    let u = ((v - min) / span).clamp(0.0, 1.0);
    RAMP[(u * (RAMP.len() - 1) as f64).round() as usize]
}

fn finite_range(map: &DMatrix<f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in map.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    (min <= max).then_some((min, max))
}

fn frame(width: usize) -> String {
    format!("+{}+\n", "-".repeat(width))
}
