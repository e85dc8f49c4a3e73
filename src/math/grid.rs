//! Sky grids.
//!
//! Sky coordinate maps are square `grid_size × grid_size` matrices centred on
//! the star. Row index runs along `y`, column index along `x`.

use nalgebra::DMatrix;

/// `n` evenly spaced points from `start` to `stop`, both inclusive.
///
/// `n == 1` yields `[start]`; `n == 0` yields an empty vector.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Coordinate maps spanning `[-full_extent/2, full_extent/2]` on both axes.
///
/// Returns `(x, y)` with `x[(r, c)] = v[c]` and `y[(r, c)] = v[r]`.
pub fn meshgrid(full_extent: f64, grid_size: usize) -> (DMatrix<f64>, DMatrix<f64>) {
    let v = linspace(-full_extent / 2.0, full_extent / 2.0, grid_size);
    let x = DMatrix::from_fn(grid_size, grid_size, |_, c| v[c]);
    let y = DMatrix::from_fn(grid_size, grid_size, |r, _| v[r]);
    (x, y)
}

/// Index of the value closest to `target` (first one on ties).
pub fn index_of_closest(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let d = (v - target).abs();
        if !d.is_finite() {
            continue;
        }
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_endpoints() {
        let v = linspace(-1.0, 1.0, 5);
        assert_eq!(v, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(linspace(3.0, 7.0, 1), vec![3.0]);
        assert!(linspace(3.0, 7.0, 0).is_empty());
    }

    #[test]
    fn meshgrid_is_centred_and_oriented() {
        let (x, y) = meshgrid(2.0, 3);
        assert_eq!(x.shape(), (3, 3));
        assert_eq!(x[(0, 0)], -1.0);
        assert_eq!(x[(2, 2)], 1.0);
        assert_eq!(x[(1, 1)], 0.0);
        // x varies along columns, y along rows.
        assert_eq!(x[(0, 2)], 1.0);
        assert_eq!(y[(0, 2)], -1.0);
        assert_eq!(y[(2, 0)], 1.0);
    }

    #[test]
    fn closest_index_prefers_first_on_ties() {
        let v = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(index_of_closest(&v, 1.4), Some(1));
        assert_eq!(index_of_closest(&v, 1.5), Some(1));
        assert_eq!(index_of_closest(&v, 10.0), Some(3));
        assert_eq!(index_of_closest(&[], 1.0), None);
    }
}
