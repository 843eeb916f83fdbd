//! End-to-end runs: config → discover → plan → stage.
//!
//! Configuration and discovery errors are fatal and returned as
//! [`RunError`] before any output is written. Everything after that is
//! per-unit and ends up in the [`StageReport`].

use crate::compiler::builtin::is_emitted;
use crate::compiler::{BuiltinCompiler, CatalogCompiler, CompileError};
use crate::config::{BuildConfig, ConfigError};
use crate::discover::{self, DiscoverError, SourceCatalog};
use crate::layout::TargetLayout;
use crate::stage::{self, StageOptions, StageReport, StageUnit};
use polib::message::MessageView;
use rayon::prelude::*;
use thiserror::Error;

/// Every unit staged, or every catalog parsed.
pub const EXIT_SUCCESS: u8 = 0;
/// At least one unit failed or was skipped, or a catalog did not parse.
pub const EXIT_UNIT_FAILURE: u8 = 1;
/// Configuration or discovery error; nothing was attempted.
pub const EXIT_CONFIG: u8 = 2;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Discovery error: {0}")]
    Discover(#[from] DiscoverError),
}

/// Everything known before compiling: the work list of a run.
#[derive(Debug, Clone)]
pub struct Plan {
    pub app_id: String,
    pub catalogs: Vec<SourceCatalog>,
    pub layouts: Vec<TargetLayout>,
    pub units: Vec<StageUnit>,
}

/// Validate config, discover catalogs and expand them into units.
pub fn prepare(config: &BuildConfig) -> Result<Plan, RunError> {
    config.validate()?;
    let app_id = config.app_id()?.to_string();
    let catalogs = discover::discover(&config.source_dir)?;
    let layouts = TargetLayout::from_config(&config.layouts);
    let units = stage::plan(&catalogs, &layouts, &app_id);
    tracing::info!(
        app_id = %app_id,
        locales = catalogs.len(),
        units = units.len(),
        "planned staging run"
    );
    Ok(Plan {
        app_id,
        catalogs,
        layouts,
        units,
    })
}

/// Run the full pipeline with the given compiler.
///
/// Takes the options by value so the event sender is dropped on return.
pub fn run(
    config: &BuildConfig,
    compiler: &dyn CatalogCompiler,
    options: StageOptions,
) -> Result<StageReport, RunError> {
    let plan = prepare(config)?;
    Ok(stage::stage(plan.units, compiler, &options))
}

/// Entry counts of a parsed catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub translated: usize,
    pub fuzzy: usize,
    pub untranslated: usize,
}

/// Syntax check result for one catalog.
#[derive(Debug)]
pub struct CheckResult {
    pub catalog: SourceCatalog,
    pub result: Result<CatalogStats, CompileError>,
}

/// Parse every discovered catalog without writing any output.
///
/// Needs only `source_dir`; the application identity is not required.
pub fn check(config: &BuildConfig) -> Result<Vec<CheckResult>, RunError> {
    let catalogs = discover::discover(&config.source_dir)?;
    let parser = BuiltinCompiler::new(config.compiler.use_fuzzy);

    let results = catalogs
        .into_par_iter()
        .map(|catalog| {
            let result = parser.parse_file(&catalog.path).map(|parsed| {
                let mut stats = CatalogStats::default();
                for message in parsed.messages() {
                    if is_emitted(message, false) {
                        stats.translated += 1;
                    } else if is_emitted(message, true) {
                        stats.fuzzy += 1;
                    } else if !message.msgid().is_empty() {
                        stats.untranslated += 1;
                    }
                }
                stats
            });
            CheckResult { catalog, result }
        })
        .collect();
    Ok(results)
}

/// Process exit status for a staging run.
pub fn exit_status(result: &Result<StageReport, RunError>) -> u8 {
    match result {
        Ok(report) if report.is_success() => EXIT_SUCCESS,
        Ok(_) => EXIT_UNIT_FAILURE,
        Err(_) => EXIT_CONFIG,
    }
}

/// Process exit status for a `check` run.
pub fn check_exit_status(result: &Result<Vec<CheckResult>, RunError>) -> u8 {
    match result {
        Ok(results) if results.iter().all(|r| r.result.is_ok()) => EXIT_SUCCESS,
        Ok(_) => EXIT_UNIT_FAILURE,
        Err(_) => EXIT_CONFIG,
    }
}
