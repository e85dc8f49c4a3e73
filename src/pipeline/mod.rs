//! Module pipeline shared by the CLI commands.
//!
//! A run is an ordered list of modules applied to one `Context`:
//! config -> target -> measurement -> templates -> extraction
//!
//! Each module reads what earlier modules left in the context and adds its own
//! output, so commands only differ in which modules they stack.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Configuration;
use crate::domain::Template;
use crate::error::AppError;
use crate::extract::ExtractionResult;
use crate::io::Measurement;
use crate::target::TargetSystem;

pub mod modules;

pub use modules::*;

/// Everything a pipeline run has loaded or computed so far.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub config: Option<Configuration>,
    pub config_path: Option<PathBuf>,
    pub target: Option<TargetSystem>,
    pub data: Option<Measurement>,
    pub templates: Vec<Template>,
    pub extraction: Option<ExtractionResult>,
}

impl Context {
    pub fn config(&self) -> Result<&Configuration, AppError> {
        self.config
            .as_ref()
            .ok_or_else(|| AppError::new(2, "No configuration loaded."))
    }

    pub fn target(&self) -> Result<&TargetSystem, AppError> {
        self.target
            .as_ref()
            .ok_or_else(|| AppError::new(2, "No target system loaded."))
    }

    pub fn data(&self) -> Result<&Measurement, AppError> {
        self.data
            .as_ref()
            .ok_or_else(|| AppError::new(2, "No measurement loaded."))
    }
}

/// One step of a pipeline.
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, ctx: &mut Context) -> Result<(), AppError>;
}

/// Ordered list of modules.
#[derive(Default)]
pub struct Pipeline {
    modules: Vec<Box<dyn Module>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Apply every module in order to a fresh context.
    pub fn run(&self) -> Result<Context, AppError> {
        let mut ctx = Context::default();
        self.run_with(&mut ctx)?;
        Ok(ctx)
    }

    /// Apply every module in order to `ctx`; stops at the first error.
    pub fn run_with(&self, ctx: &mut Context) -> Result<(), AppError> {
        for (i, module) in self.modules.iter().enumerate() {
            info!(step = i + 1, of = self.modules.len(), module = module.name(), "running module");
            module.apply(ctx)?;
            debug!(module = module.name(), "module done");
        }
        Ok(())
    }
}
