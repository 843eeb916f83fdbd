//! Catalog compilation: `.po` source text → `.mo` binary.
//!
//! | Backend | How |
//! |---|---|
//! | **builtin** (default) | `polib` PO parser + MO writer, no system dependency |
//! | **msgfmt** | GNU gettext `msgfmt` child process |
//!
//! The module is split into:
//! - **Backend**: [`CatalogCompiler`] trait + [`CompileError`]
//! - **builtin** / **msgfmt**: the two backends

pub mod backend;
pub mod builtin;
pub mod msgfmt;

pub use backend::{CatalogCompiler, CompileError};
pub use builtin::BuiltinCompiler;
pub use msgfmt::MsgfmtCompiler;

use crate::config::{CompilerBackend, CompilerConfig};

/// Build the backend selected in config.
pub fn from_config(config: &CompilerConfig) -> Box<dyn CatalogCompiler> {
    match config.backend {
        CompilerBackend::Builtin => Box::new(BuiltinCompiler::new(config.use_fuzzy)),
        CompilerBackend::Msgfmt => Box::new(MsgfmtCompiler {
            program: config.msgfmt.clone(),
            use_fuzzy: config.use_fuzzy,
            check: config.check,
        }),
    }
}
