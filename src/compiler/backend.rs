//! Catalog compiler trait and shared error type.
//!
//! The [`CatalogCompiler`] trait is the single seam between staging and the
//! actual `.po` → `.mo` transformation. Staging decides *where* catalogs go;
//! a backend only turns one source file into one binary file.
//!
//! The default implementation is
//! [`BuiltinCompiler`](super::builtin::BuiltinCompiler), a pure-Rust parser
//! and MO writer. [`MsgfmtCompiler`](super::msgfmt::MsgfmtCompiler) runs GNU
//! `msgfmt` instead, for projects that rely on its format checks.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("Compiler not found: {0} (is gettext installed?)")]
    ToolMissing(PathBuf),
    #[error("{} exited with {status}: {stderr}", .program.display())]
    ToolFailed {
        program: PathBuf,
        status: String,
        stderr: String,
    },
}

/// Trait for catalog compilers.
///
/// Implementations must be deterministic: compiling the same source twice
/// produces byte-identical output. Staging calls `compile` from several
/// threads at once, each with its own output path.
pub trait CatalogCompiler: Send + Sync {
    /// Short backend name for logs and reports.
    fn name(&self) -> &str;

    /// Compile `source` into a binary catalog written at `output`.
    ///
    /// `output`'s parent directory exists. Any existing file at `output` is
    /// overwritten.
    fn compile(&self, source: &Path, output: &Path) -> Result<(), CompileError>;
}
