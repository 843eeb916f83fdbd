//! Target layouts and the compiled catalog path convention.
//!
//! Every layout places catalogs at
//!
//! ```text
//! {root}/locale/{locale}/LC_MESSAGES/{app_id}.mo
//! {root}/locale/{locale}/LC_MESSAGES/{app_id}.develop.mo   (develop variant)
//! ```
//!
//! which is the directory structure gettext's `bindtextdomain` expects. The
//! two layouts differ only in their root and in which build variants they
//! receive, so both are described by one [`TargetLayout`] value and staged by
//! the same routine.

use crate::config::LayoutsConfig;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// File extension of compiled catalogs.
pub const COMPILED_EXTENSION: &str = "mo";

/// Build variant of a compiled catalog.
///
/// A develop build of the application binds the `{app_id}.develop` domain,
/// so its catalog can sit next to an installed release catalog without
/// colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Release,
    Develop,
}

impl Variant {
    /// Human-readable label, used in CLI output and reports.
    pub fn label(self) -> &'static str {
        match self {
            Variant::Release => "release",
            Variant::Develop => "develop",
        }
    }

    /// Text domain for this variant (the file stem of the compiled catalog).
    pub fn domain(self, app_id: &str) -> String {
        match self {
            Variant::Release => app_id.to_string(),
            Variant::Develop => format!("{app_id}.develop"),
        }
    }

    /// Compiled catalog file name for this variant.
    pub fn file_name(self, app_id: &str) -> String {
        format!("{}.{COMPILED_EXTENSION}", self.domain(app_id))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A deployment layout: a root directory plus the variants it receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetLayout {
    /// Short name used in output (`local`, `bundle`).
    pub name: String,
    pub root: PathBuf,
    pub variants: Vec<Variant>,
}

impl TargetLayout {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, variants: Vec<Variant>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            variants,
        }
    }

    /// The in-tree data layout: release and develop variants.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self::new("local", root, vec![Variant::Release, Variant::Develop])
    }

    /// The application bundle layout: release variant only.
    pub fn bundle(root: impl Into<PathBuf>) -> Self {
        Self::new("bundle", root, vec![Variant::Release])
    }

    /// Enabled layouts from config, local first.
    pub fn from_config(config: &LayoutsConfig) -> Vec<Self> {
        let mut layouts = Vec::new();
        if config.local.enabled {
            layouts.push(Self::local(&config.local.root));
        }
        if config.bundle.enabled {
            layouts.push(Self::bundle(&config.bundle.root));
        }
        layouts
    }

    /// `{root}/locale/{locale}/LC_MESSAGES`
    pub fn output_dir(&self, locale: &str) -> PathBuf {
        message_dir(&self.root, locale)
    }

    pub fn output_path(&self, locale: &str, app_id: &str, variant: Variant) -> PathBuf {
        self.output_dir(locale).join(variant.file_name(app_id))
    }
}

fn message_dir(root: &Path, locale: &str) -> PathBuf {
    root.join("locale").join(locale).join("LC_MESSAGES")
}
