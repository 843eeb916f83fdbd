//! # catalog-stage
//!
//! Compiles translated gettext catalogs (`po/{locale}.po`) into binary `.mo`
//! catalogs and stages them where a runtime locale loader looks for them.
//! The loader finds catalogs by locale code and domain name; the domain is
//! the application identity, with `.develop` appended for development builds.
//!
//! # Architecture: Discover, Plan, Stage
//!
//! ```text
//! 1. Discover  po/        →  [SourceCatalog]   (sorted by locale)
//! 2. Plan      catalogs   →  [StageUnit]       (locale × layout × variant)
//! 3. Stage     units      →  StageReport       (compile + atomic rename, per unit)
//! ```
//!
//! Configuration and discovery problems abort before any output is written.
//! From the plan onwards every unit stands alone: a broken catalog fails its
//! own units and nothing else.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `catalog-stage.toml` loading, merging over stock defaults, validation |
//! | [`discover`] | Lists `{locale}.po` files of the source directory |
//! | [`layout`] | Layout descriptors (root + variants) and the output path convention |
//! | [`compiler`] | `.po` → `.mo` compilation: built-in compiler and `msgfmt` backend |
//! | [`stage`] | Expands catalogs into units and stages them in parallel |
//! | [`pipeline`] | Entry points tying config, discovery and staging together |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identity Is Configuration
//!
//! The application identity names every compiled catalog, so it is a
//! required config field passed down into planning. There is no built-in
//! default; a tool that silently writes catalogs under the wrong domain is
//! worse than one that refuses to start.
//!
//! ## One Routine, Many Layouts
//!
//! The local-data layout (`data/`, release + develop) and the bundle layout
//! (`AppDir/share/`, release only) differ only in root and variant set.
//! Both are [`layout::TargetLayout`] values fed to the same staging code, so
//! adding a layout is a config change.
//!
//! ## Built-In Compiler
//!
//! The default backend parses PO and writes MO in-process with `polib`, so
//! staging works on machines without GNU gettext. The output follows `msgfmt`'s rules for
//! which entries are kept. The `msgfmt` backend remains available for
//! projects that want gettext's own checks.
//!
//! ## Atomic Writes
//!
//! Each catalog is compiled into a temp file next to its destination and
//! renamed into place. A failed or interrupted compile leaves either the
//! previous catalog or nothing, never a truncated file the loader would
//! reject at runtime.

pub mod compiler;
pub mod config;
pub mod discover;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod stage;

#[cfg(test)]
pub(crate) mod test_helpers;
