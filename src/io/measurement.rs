//! Read/write measurement and template files.
//!
//! A measurement file is the portable representation of differential photon
//! counts. Besides the data it carries, as a header, everything needed to
//! interpret it:
//! - the configuration document it was produced with
//! - optionally the target system
//! - for templates, the sky position of the point source
//!
//! ```json
//! {
//!   "kind": "template",
//!   "created": "2026-01-01T00:00:00Z",
//!   "config": { "settings": { ... }, "mission": { ... }, "observatory": { ... } },
//!   "target": null,
//!   "position": { "x": 4.8e-7, "y": 0.0 },
//!   "data": [[[0.0, 0.1, ...], ...], ...]
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Configuration;
use crate::domain::{MeasurementKind, SignalCube, SkyPosition, Template};
use crate::error::AppError;
use crate::target::TargetSystem;

/// On-disk layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MeasurementFile {
    kind: MeasurementKind,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
    config: Configuration,
    #[serde(default)]
    target: Option<TargetSystem>,
    #[serde(default)]
    position: Option<SkyPosition>,
    data: Vec<Vec<Vec<f64>>>,
}

/// A loaded, validated measurement or template.
#[derive(Debug, Clone)]
pub struct Measurement {
    pub kind: MeasurementKind,
    pub created: Option<DateTime<Utc>>,
    pub config: Configuration,
    pub target: Option<TargetSystem>,
    pub position: Option<SkyPosition>,
    pub data: SignalCube,
}

impl Measurement {
    pub fn into_template(self) -> Template {
        Template {
            signal: self.data,
            position: self.position,
        }
    }
}

/// Read a measurement file and validate its header and data.
pub fn read_measurement(path: &Path) -> Result<Measurement, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open measurement '{}': {e}", path.display())))?;
    let raw: MeasurementFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid measurement JSON '{}': {e}", path.display())))?;

    raw.config.validate()?;
    if let Some(target) = &raw.target {
        target.validate()?;
    }

    let data = SignalCube::from_nested(raw.data)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;

    debug!(
        path = %path.display(),
        kind = raw.kind.as_str(),
        shape = ?data.shape(),
        "read measurement"
    );

    Ok(Measurement {
        kind: raw.kind,
        created: raw.created,
        config: raw.config,
        target: raw.target,
        position: raw.position,
        data,
    })
}

/// Write a measurement file (pretty JSON).
pub fn write_measurement(path: &Path, measurement: &Measurement) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create measurement '{}': {e}", path.display())))?;

    let raw = MeasurementFile {
        kind: measurement.kind,
        created: measurement.created.or_else(|| Some(Utc::now())),
        config: measurement.config.clone(),
        target: measurement.target.clone(),
        position: measurement.position,
        data: measurement.data.to_nested(),
    };

    serde_json::to_writer_pretty(BufWriter::new(file), &raw)
        .map_err(|e| AppError::new(2, format!("Failed to write measurement JSON: {e}")))?;
    Ok(())
}

/// Read every `*.json` template in `dir` (sorted by file name) and check each
/// one against the measurement it will be compared with.
pub fn read_templates(dir: &Path, reference: &Measurement) -> Result<Vec<Template>, AppError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read template directory '{}': {e}", dir.display())))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        return Err(AppError::new(
            2,
            format!("No template files (*.json) found in '{}'.", dir.display()),
        ));
    }

    let mut templates = Vec::with_capacity(paths.len());
    for path in &paths {
        let template = read_measurement(path)?;
        if template.kind != MeasurementKind::Template {
            return Err(AppError::new(
                3,
                format!(
                    "'{}' is a {} file, expected a template.",
                    path.display(),
                    template.kind.as_str()
                ),
            ));
        }
        check_template_matches(reference, &template, path)?;
        templates.push(template.into_template());
    }

    info!(count = templates.len(), dir = %dir.display(), "loaded templates");
    Ok(templates)
}

/// A template is only comparable with data taken by the same instrument on
/// the same grid.
pub fn check_template_matches(data: &Measurement, template: &Measurement, path: &Path) -> Result<(), AppError> {
    let mismatch = |what: &str| {
        AppError::new(
            3,
            format!("Template '{}' does not match the measurement: {what} differs.", path.display()),
        )
    };

    if template.data.shape() != data.data.shape() {
        return Err(AppError::new(
            3,
            format!(
                "Template '{}' has shape {:?}, measurement has {:?} (outputs, wavelengths, time steps).",
                path.display(),
                template.data.shape(),
                data.data.shape()
            ),
        ));
    }

    let (d, t) = (&data.config, &template.config);
    if d.settings.grid_size != t.settings.grid_size {
        return Err(mismatch("settings.grid_size"));
    }
    if d.observatory.array_configuration != t.observatory.array_configuration {
        return Err(mismatch("observatory.array_configuration"));
    }
    if d.observatory.beam_combination_scheme != t.observatory.beam_combination_scheme {
        return Err(mismatch("observatory.beam_combination_scheme"));
    }
    if !same_instrument(d, t) {
        return Err(mismatch("observatory.instrument_parameters"));
    }
    Ok(())
}

/// Compare instruments by SI value so `4 um` and `4000 nm` are the same.
fn same_instrument(a: &Configuration, b: &Configuration) -> bool {
    let a = &a.observatory.instrument_parameters;
    let b = &b.observatory.instrument_parameters;
    let close = |x: f64, y: f64| (x - y).abs() <= 1e-9 * x.abs().max(y.abs());

    close(a.aperture_diameter.to_si(), b.aperture_diameter.to_si())
        && close(a.spectral_resolving_power, b.spectral_resolving_power)
        && close(
            a.wavelength_range_lower_limit.to_si(),
            b.wavelength_range_lower_limit.to_si(),
        )
        && close(
            a.wavelength_range_upper_limit.to_si(),
            b.wavelength_range_upper_limit.to_si(),
        )
        && close(
            a.unperturbed_instrument_throughput,
            b.unperturbed_instrument_throughput,
        )
}
