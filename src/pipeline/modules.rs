//! Pipeline modules.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Configuration;
use crate::domain::MeasurementKind;
use crate::error::AppError;
use crate::extract::ml_extract;
use crate::io::{read_measurement, read_templates};
use crate::pipeline::{Context, Module};
use crate::target::TargetSystem;

/// Load and validate a configuration document.
#[derive(Debug, Clone)]
pub struct ConfigLoaderModule {
    pub path: PathBuf,
}

impl ConfigLoaderModule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Module for ConfigLoaderModule {
    fn name(&self) -> &'static str {
        "config-loader"
    }

    fn apply(&self, ctx: &mut Context) -> Result<(), AppError> {
        let config = Configuration::load(&self.path)?;
        info!(path = %self.path.display(), "loaded configuration");
        ctx.config = Some(config);
        ctx.config_path = Some(self.path.clone());
        Ok(())
    }
}

/// Load and validate a target system document.
#[derive(Debug, Clone)]
pub struct TargetLoaderModule {
    pub path: PathBuf,
}

impl TargetLoaderModule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Module for TargetLoaderModule {
    fn name(&self) -> &'static str {
        "target-loader"
    }

    fn apply(&self, ctx: &mut Context) -> Result<(), AppError> {
        let target = TargetSystem::load(&self.path)
            .map_err(|e| AppError::new(2, format!("Invalid target system: {e}")))?;
        info!(
            path = %self.path.display(),
            star = %target.star.name,
            planets = target.planets.len(),
            "loaded target system"
        );
        ctx.target = Some(target);
        Ok(())
    }
}

/// Read a measurement file, or a directory of templates.
///
/// A measurement brings its own configuration and target system, which
/// replace whatever the context held. Templates are checked against the
/// measurement already in the context.
#[derive(Debug, Clone)]
pub struct MeasurementReaderModule {
    pub path: PathBuf,
    pub kind: MeasurementKind,
}

impl MeasurementReaderModule {
    pub fn measurement(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: MeasurementKind::SyntheticMeasurement,
        }
    }

    pub fn templates(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into(),
            kind: MeasurementKind::Template,
        }
    }
}

impl Module for MeasurementReaderModule {
    fn name(&self) -> &'static str {
        match self.kind {
            MeasurementKind::SyntheticMeasurement => "measurement-reader",
            MeasurementKind::Template => "template-reader",
        }
    }

    fn apply(&self, ctx: &mut Context) -> Result<(), AppError> {
        match self.kind {
            MeasurementKind::SyntheticMeasurement => {
                let measurement = read_measurement(&self.path)?;
                if measurement.kind != MeasurementKind::SyntheticMeasurement {
                    return Err(AppError::new(
                        3,
                        format!(
                            "'{}' is a {} file, expected a synthetic measurement.",
                            self.path.display(),
                            measurement.kind.as_str()
                        ),
                    ));
                }

                if ctx.config.as_ref().is_some_and(|c| *c != measurement.config) {
                    warn!("measurement header replaces the loaded configuration");
                }
                ctx.config = Some(measurement.config.clone());
                if measurement.target.is_some() {
                    ctx.target = measurement.target.clone();
                }
                ctx.data = Some(measurement);
            }
            MeasurementKind::Template => {
                let reference = ctx.data.as_ref().ok_or_else(|| {
                    AppError::new(2, "Templates can only be read after a measurement.")
                })?;
                ctx.templates = read_templates(&self.path, reference)?;
            }
        }
        Ok(())
    }
}

/// ML extraction of the measurement against the templates.
#[derive(Debug, Clone, Default)]
pub struct ExtractionModule;

impl Module for ExtractionModule {
    fn name(&self) -> &'static str {
        "ml-extraction"
    }

    fn apply(&self, ctx: &mut Context) -> Result<(), AppError> {
        let grid_size = ctx
            .config
            .as_ref()
            .ok_or_else(|| AppError::new(2, "ML extraction needs a configuration; none loaded."))?
            .settings
            .grid_size;
        let data = ctx
            .data
            .as_ref()
            .ok_or_else(|| AppError::new(2, "ML extraction needs a measurement; none loaded."))?;
        if ctx.templates.is_empty() {
            return Err(AppError::new(2, "ML extraction needs templates; none loaded."));
        }

        let result = ml_extract(&data.data, &ctx.templates, grid_size)?;
        for best in &result.best {
            info!(
                output = best.output,
                row = best.row,
                col = best.col,
                cost = best.cost,
                "most likely planet position"
            );
        }
        ctx.extraction = Some(result);
        Ok(())
    }
}
