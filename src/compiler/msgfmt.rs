//! GNU `msgfmt` backend.
//!
//! Runs one `msgfmt` process per compiled catalog:
//!
//! ```text
//! msgfmt [--use-fuzzy] [--check] --output-file=<output> <source>
//! ```
//!
//! Standard error is captured and attached to the failure, so the report
//! shows msgfmt's own diagnostics (file, line, message).

use super::backend::{CatalogCompiler, CompileError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Compiler that shells out to `msgfmt`.
#[derive(Debug, Clone)]
pub struct MsgfmtCompiler {
    pub program: PathBuf,
    pub use_fuzzy: bool,
    pub check: bool,
}

impl MsgfmtCompiler {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            use_fuzzy: false,
            check: false,
        }
    }

    /// Command-line arguments for one invocation.
    pub fn args(&self, source: &Path, output: &Path) -> Vec<OsString> {
        let mut args = Vec::new();
        if self.use_fuzzy {
            args.push(OsString::from("--use-fuzzy"));
        }
        if self.check {
            args.push(OsString::from("--check"));
        }
        let mut out_arg = OsString::from("--output-file=");
        out_arg.push(output.as_os_str());
        args.push(out_arg);
        args.push(source.as_os_str().to_os_string());
        args
    }
}

impl Default for MsgfmtCompiler {
    fn default() -> Self {
        Self::new("msgfmt")
    }
}

impl CatalogCompiler for MsgfmtCompiler {
    fn name(&self) -> &str {
        "msgfmt"
    }

    fn compile(&self, source: &Path, output: &Path) -> Result<(), CompileError> {
        let result = Command::new(&self.program)
            .args(self.args(source, output))
            .output();

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CompileError::ToolMissing(self.program.clone()));
            }
            Err(e) => {
                return Err(CompileError::Io {
                    path: self.program.clone(),
                    source: e,
                });
            }
        };

        if !out.status.success() {
            return Err(CompileError::ToolFailed {
                program: self.program.clone(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
