//! Maximum likelihood (ML) extraction of point sources.
//!
//! Given differential photon counts `D[o][l][t]` and, for every sky grid
//! cell `k`, the template `T_k[o][l][t]` of a unit-flux point source at that
//! cell, we solve per template, output `o` and wavelength `l`:
//!
//! ```text
//! σ²   = Var_t(D[o][l])                   (population variance over time)
//! c    = Σ_t D·T_k / σ²
//! b    = Σ_t T_k² / σ²
//! f    = max(c / b, 0)                    (positivity constraint)
//! J_k  = Σ_l f·c                          (cost, per output)
//! ```
//!
//! `f` is the flux that maximizes the likelihood of the data under a white
//! noise model; `J_k` is the detection statistic for cell `k`. The cell with
//! the largest `J_k` is the most likely planet position.

use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::{SignalCube, SkyPosition, Template};
use crate::error::AppError;

/// Extraction output for one data set.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub grid_size: usize,
    /// Cost map per differential output, `grid_size × grid_size`.
    pub cost_maps: Vec<DMatrix<f64>>,
    /// Optimized flux spectra as `[template][output][wavelength]`.
    pub flux: Vec<Vec<Vec<f64>>>,
    /// Sky position of each template, when its file carried one.
    pub positions: Vec<Option<SkyPosition>>,
    /// Most likely cell per output.
    pub best: Vec<Detection>,
    /// Wavelength channels skipped because the data had no variance.
    pub skipped_channels: Vec<(usize, usize)>,
}

/// Maximum of a cost map.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub output: usize,
    pub template: usize,
    pub row: usize,
    pub col: usize,
    pub cost: f64,
    pub flux: Vec<f64>,
    pub position: Option<SkyPosition>,
}

#[derive(Debug, Clone)]
struct TemplateFit {
    cost: Vec<f64>,
    flux: Vec<Vec<f64>>,
}

/// Run ML extraction of `data` against one template per grid cell.
///
/// Templates are in row-major grid order: template `k` belongs to cell
/// `(k / grid_size, k % grid_size)`.
pub fn ml_extract(data: &SignalCube, templates: &[Template], grid_size: usize) -> Result<ExtractionResult, AppError> {
    if templates.is_empty() {
        return Err(AppError::new(3, "No templates to extract against."));
    }
    let cells = grid_size
        .checked_mul(grid_size)
        .ok_or_else(|| AppError::new(3, format!("Grid size {grid_size} is too large.")))?;
    if templates.len() != cells {
        return Err(AppError::new(
            3,
            format!(
                "Expected {cells} templates for a {grid_size}×{grid_size} grid, got {}.",
                templates.len()
            ),
        ));
    }
    let shape = data.shape();
    if let Some(k) = templates.iter().position(|t| t.signal.shape() != shape) {
        return Err(AppError::new(
            3,
            format!(
                "Template {k} has shape {:?}, data has {:?}.",
                templates[k].signal.shape(),
                shape
            ),
        ));
    }

    let (n_out, n_wl, _) = shape;
    let variance = channel_variance(data);

    let mut skipped_channels = Vec::new();
    for (o, row) in variance.iter().enumerate() {
        for (l, &v) in row.iter().enumerate() {
            if !usable(v) {
                skipped_channels.push((o, l));
            }
        }
    }
    if !skipped_channels.is_empty() {
        warn!(
            count = skipped_channels.len(),
            "skipping wavelength channels without variance"
        );
    }

    // Templates are independent; `collect` keeps template order.
    let fits: Vec<TemplateFit> = templates
        .par_iter()
        .map(|t| fit_template(data, &t.signal, &variance))
        .collect();

    let mut cost_maps = vec![DMatrix::zeros(grid_size, grid_size); n_out];
    for (k, fit) in fits.iter().enumerate() {
        let (row, col) = (k / grid_size, k % grid_size);
        for (o, &cost) in fit.cost.iter().enumerate() {
            cost_maps[o][(row, col)] = cost;
        }
    }

    let positions: Vec<Option<SkyPosition>> = templates.iter().map(|t| t.position).collect();

    let mut best = Vec::with_capacity(n_out);
    for o in 0..n_out {
        // Deterministic: largest cost, ties broken by the lowest template index.
        let mut k_best = 0;
        for (k, fit) in fits.iter().enumerate().skip(1) {
            if fit.cost[o] > fits[k_best].cost[o] {
                k_best = k;
            }
        }
        best.push(Detection {
            output: o,
            template: k_best,
            row: k_best / grid_size,
            col: k_best % grid_size,
            cost: fits[k_best].cost[o],
            flux: fits[k_best].flux[o].clone(),
            position: positions[k_best],
        });
    }

    debug!(
        templates = templates.len(),
        outputs = n_out,
        wavelengths = n_wl,
        "ML extraction finished"
    );

    Ok(ExtractionResult {
        grid_size,
        cost_maps,
        flux: fits.into_iter().map(|f| f.flux).collect(),
        positions,
        best,
        skipped_channels,
    })
}

fn fit_template(data: &SignalCube, template: &SignalCube, variance: &[Vec<f64>]) -> TemplateFit {
    let n_out = data.outputs().len();
    let mut cost = Vec::with_capacity(n_out);
    let mut flux = Vec::with_capacity(n_out);

    for (o, (d, t)) in data.outputs().iter().zip(template.outputs()).enumerate() {
        let mut total = 0.0;
        let mut spectrum = Vec::with_capacity(d.nrows());

        for l in 0..d.nrows() {
            let var = variance[o][l];
            if !usable(var) {
                spectrum.push(0.0);
                continue;
            }
            let d_row = d.row(l);
            let t_row = t.row(l);
            let c = d_row.dot(&t_row) / var;
            let b = t_row.dot(&t_row) / var;

            let f = if b > 0.0 { (c / b).max(0.0) } else { 0.0 };
            total += f * c;
            spectrum.push(f);
        }

        cost.push(total);
        flux.push(spectrum);
    }

    TemplateFit { cost, flux }
}

/// Population variance over time for every `(output, wavelength)` channel.
fn channel_variance(data: &SignalCube) -> Vec<Vec<f64>> {
    data.outputs()
        .iter()
        .map(|m| {
            m.row_iter()
                .map(|row| {
                    let n = row.len() as f64;
                    let mean = row.sum() / n;
                    row.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
                })
                .collect()
        })
        .collect()
}

fn usable(variance: f64) -> bool {
    variance.is_finite() && variance > 0.0
}
