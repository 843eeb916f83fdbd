//! Catalog staging.
//!
//! Stage 2 of the pipeline. Expands discovered catalogs into units, one per
//! (locale, layout, variant), and compiles each unit into place.
//!
//! ## Output Structure
//!
//! ```text
//! data/locale/nl/LC_MESSAGES/
//! ├── dev.example.app.mo            # local / release
//! └── dev.example.app.develop.mo    # local / develop
//! AppDir/share/locale/nl/LC_MESSAGES/
//! └── dev.example.app.mo            # bundle / release
//! ```
//!
//! ## Unit Isolation
//!
//! Units share nothing but the compiler, so they run in parallel using
//! [rayon](https://docs.rs/rayon). Each unit:
//!
//! 1. creates its `LC_MESSAGES` directory (idempotent, safe to race),
//! 2. compiles into a hidden temp file in that directory,
//! 3. renames the temp file over the final path.
//!
//! A failing unit is recorded in the [`StageReport`] and never stops the
//! others. Because of the rename, a failed compile never leaves a partial
//! file at the output path; whatever was there before stays untouched.
//!
//! The release and develop variants of a locale are two separate compiler
//! invocations on the same source. Nothing is shared between them.

use crate::compiler::{CatalogCompiler, CompileError};
use crate::discover::SourceCatalog;
use crate::layout::{TargetLayout, Variant};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create temporary file in {path}: {source}")]
    TempFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("compile failed: {0}")]
    Compile(#[from] CompileError),
    #[error("compiler produced an empty catalog for {0}")]
    EmptyOutput(PathBuf),
    #[error("cannot write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One compiled catalog to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageUnit {
    pub locale: String,
    pub source: PathBuf,
    /// Layout name (`local`, `bundle`).
    pub layout: String,
    pub variant: Variant,
    pub output: PathBuf,
}

impl StageUnit {
    /// `nl local/develop`: enough to identify and retry the unit.
    pub fn label(&self) -> String {
        format!("{} {}/{}", self.locale, self.layout, self.variant)
    }
}

/// Result of a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UnitOutcome {
    Staged { bytes: u64 },
    Failed { error: String },
    /// The run was cancelled before this unit started.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    #[serde(flatten)]
    pub unit: StageUnit,
    pub outcome: UnitOutcome,
}

/// Progress events emitted while staging.
#[derive(Debug, Clone)]
pub enum StageEvent {
    /// A unit completed, failed, or was skipped.
    UnitFinished(UnitReport),
}

/// Options for a staging run.
#[derive(Debug, Default)]
pub struct StageOptions {
    /// Receives one event per unit, in completion order.
    pub events: Option<Sender<StageEvent>>,
    /// When set, units that have not started yet are skipped.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl StageOptions {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn emit(&self, report: &UnitReport) {
        if let Some(tx) = &self.events {
            // A dropped receiver only means nobody is listening.
            let _ = tx.send(StageEvent::UnitFinished(report.clone()));
        }
    }
}

/// Aggregated outcome of a staging run, in plan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub units: Vec<UnitReport>,
}

impl StageReport {
    pub fn staged(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|r| matches!(r.outcome, UnitOutcome::Staged { .. }))
    }

    pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|r| matches!(r.outcome, UnitOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &UnitReport> {
        self.units
            .iter()
            .filter(|r| r.outcome == UnitOutcome::Skipped)
    }

    /// Number of distinct locales with at least one unit.
    pub fn locale_count(&self) -> usize {
        let mut locales: Vec<&str> = self.units.iter().map(|r| r.unit.locale.as_str()).collect();
        locales.dedup();
        locales.len()
    }

    /// True only when every unit was staged.
    pub fn is_success(&self) -> bool {
        self.units
            .iter()
            .all(|r| matches!(r.outcome, UnitOutcome::Staged { .. }))
    }
}

/// Expand catalogs × layouts × variants into units.
///
/// Order: locale, then layout order, then the layout's variant order.
pub fn plan(catalogs: &[SourceCatalog], layouts: &[TargetLayout], app_id: &str) -> Vec<StageUnit> {
    catalogs
        .iter()
        .flat_map(|catalog| {
            layouts.iter().flat_map(move |layout| {
                layout.variants.iter().map(move |&variant| StageUnit {
                    locale: catalog.locale.clone(),
                    source: catalog.path.clone(),
                    layout: layout.name.clone(),
                    variant,
                    output: layout.output_path(&catalog.locale, app_id, variant),
                })
            })
        })
        .collect()
}

/// Stage every unit, continuing past failures.
pub fn stage(
    units: Vec<StageUnit>,
    compiler: &dyn CatalogCompiler,
    options: &StageOptions,
) -> StageReport {
    tracing::info!(units = units.len(), compiler = compiler.name(), "staging catalogs");

    let units = units
        .into_par_iter()
        .map(|unit| {
            let outcome = if options.is_cancelled() {
                UnitOutcome::Skipped
            } else {
                match stage_unit(&unit, compiler) {
                    Ok(bytes) => {
                        tracing::debug!(unit = %unit.label(), output = %unit.output.display(), bytes, "staged");
                        UnitOutcome::Staged { bytes }
                    }
                    Err(e) => {
                        tracing::warn!(unit = %unit.label(), error = %e, "unit failed");
                        UnitOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };
            let report = UnitReport { unit, outcome };
            options.emit(&report);
            report
        })
        .collect();

    StageReport { units }
}

/// Compile one unit into place. Returns the size of the written catalog.
fn stage_unit(unit: &StageUnit, compiler: &dyn CatalogCompiler) -> Result<u64, StageError> {
    let dir = unit.output.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(|source| StageError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    // Dropping the temp path on any error removes the partial file.
    let temp = tempfile::Builder::new()
        .prefix(".catalog-stage-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|source| StageError::TempFile {
            path: dir.to_path_buf(),
            source,
        })?
        .into_temp_path();

    compiler.compile(&unit.source, &temp)?;

    let bytes = fs::metadata(&temp)
        .map_err(|source| StageError::Persist {
            path: unit.output.clone(),
            source,
        })?
        .len();
    if bytes == 0 {
        return Err(StageError::EmptyOutput(unit.output.clone()));
    }

    temp.persist(&unit.output)
        .map_err(|e| StageError::Persist {
            path: unit.output.clone(),
            source: e.error,
        })?;
    Ok(bytes)
}
