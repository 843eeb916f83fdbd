//! Build configuration module.
//!
//! Handles loading, validating, and merging the `catalog-stage.toml` file.
//! Configuration is layered: stock defaults are overridden by the user's
//! config file, which is in turn overridden by command-line flags.
//!
//! ## Config File Location
//!
//! The file is looked up in the working directory by default (the project
//! root, next to `po/` and `data/`). Pass `--config` to read another path.
//! A missing file is not an error; stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options except app_id are optional - defaults shown below
//!
//! source_dir = "po"                 # Directory holding {locale}.po files
//! app_id = "dev.example.app"        # Application identity (required)
//!
//! [layouts.local]
//! root = "data"                     # -> data/locale/{locale}/LC_MESSAGES/
//! enabled = true
//!
//! [layouts.bundle]
//! root = "AppDir/share"             # -> AppDir/share/locale/{locale}/LC_MESSAGES/
//! enabled = true
//!
//! [compiler]
//! backend = "builtin"               # "builtin" or "msgfmt"
//! msgfmt = "msgfmt"                 # Program used by the msgfmt backend
//! use_fuzzy = false                 # Include entries flagged fuzzy
//! check = false                     # Pass --check to msgfmt
//!
//! [processing]
//! max_processes = 4                 # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, resolved against the working directory.
pub const CONFIG_FILENAME: &str = "catalog-stage.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `catalog-stage.toml`.
///
/// Every field except `app_id` has a default matching the conventional
/// project layout (`po/`, `data/`, `AppDir/share/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Directory containing the `{locale}.po` source catalogs.
    pub source_dir: PathBuf,
    /// Application identity, used as the file stem of every compiled catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    /// Output layouts (local data directory and distributable bundle).
    pub layouts: LayoutsConfig,
    /// Catalog compiler selection and flags.
    pub compiler: CompilerConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("po"),
            app_id: None,
            layouts: LayoutsConfig::default(),
            compiler: CompilerConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Validate config values before any work begins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_app_id(self.app_id.as_deref())?;
        if self.source_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "source_dir must not be empty".into(),
            ));
        }
        for (name, layout) in [("local", &self.layouts.local), ("bundle", &self.layouts.bundle)] {
            if layout.enabled && layout.root.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "layouts.{name}.root must not be empty"
                )));
            }
        }
        if !self.layouts.local.enabled && !self.layouts.bundle.enabled {
            return Err(ConfigError::Validation(
                "at least one of layouts.local and layouts.bundle must be enabled".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The validated application identity.
    ///
    /// Only meaningful after [`validate`](Self::validate) has passed.
    pub fn app_id(&self) -> Result<&str, ConfigError> {
        validate_app_id(self.app_id.as_deref())
    }
}

/// The identity becomes a file name, so it must be a single path segment.
fn validate_app_id(app_id: Option<&str>) -> Result<&str, ConfigError> {
    let id = match app_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(ConfigError::Validation(
                "app_id must be set (in the config file or with --app-id)".into(),
            ));
        }
    };
    if id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
        return Err(ConfigError::Validation(format!(
            "app_id {id:?} must be a plain file name (no path separators)"
        )));
    }
    Ok(id)
}

/// The two deployment layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutsConfig {
    /// In-tree data directory used during development and local installs.
    /// Receives both the release and the develop variant.
    pub local: LayoutConfig,
    /// Portable application bundle. Receives the release variant only.
    pub bundle: LayoutConfig,
}

impl Default for LayoutsConfig {
    fn default() -> Self {
        Self {
            local: LayoutConfig::new("data"),
            bundle: LayoutConfig::new("AppDir/share"),
        }
    }
}

/// A single layout root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    /// Directory under which `locale/{locale}/LC_MESSAGES/` is created.
    pub root: PathBuf,
    /// Disabled layouts are skipped entirely.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl LayoutConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Which compiler turns `.po` into `.mo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilerBackend {
    /// Pure-Rust compiler, no external tools required.
    #[default]
    Builtin,
    /// GNU gettext `msgfmt`, run as a child process.
    Msgfmt,
}

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub backend: CompilerBackend,
    /// Program name or path used by the msgfmt backend.
    pub msgfmt: PathBuf,
    /// Include entries flagged `#, fuzzy` (msgfmt `--use-fuzzy`).
    pub use_fuzzy: bool,
    /// Run msgfmt's format-string checks (`--check`). Ignored by the builtin backend.
    pub check: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            backend: CompilerBackend::Builtin,
            msgfmt: PathBuf::from("msgfmt"),
            use_fuzzy: false,
            check: false,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel compile workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(BuildConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge overlays onto a base value in order, then deserialize.
///
/// Validation is left to the caller: `check` must work
/// without an application identity.
pub fn resolve_config(
    base: toml::Value,
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let merged = overlays.into_iter().fold(base, merge_toml);
    let config: BuildConfig = merged.try_into()?;
    Ok(config)
}

/// Load config from a file path, merging user values on top of stock
/// defaults and then applying `overrides` (typically built from CLI flags).
///
/// Unknown keys are rejected. Values are not validated here; call
/// [`BuildConfig::validate`] before staging.
pub fn load_config(
    path: &Path,
    overrides: Option<toml::Value>,
) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value();
    let file = load_raw_config(path)?;
    resolve_config(base, file.into_iter().chain(overrides))
}

/// Returns a fully-commented stock config file with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# catalog-stage configuration
# ===========================
# All settings except app_id are optional. Values shown below are the defaults.
# Command-line flags (--source, --app-id, --local-root, --bundle-root,
# --compiler, --jobs) override the values in this file.
# Unknown keys will cause an error.

# Directory containing one {locale}.po file per language.
source_dir = "po"

# Application identity (reverse-domain). Every compiled catalog is named
# after it: {app_id}.mo, and {app_id}.develop.mo for the develop variant.
# app_id = "dev.example.app"

# ---------------------------------------------------------------------------
# Layouts
# ---------------------------------------------------------------------------
# In-tree data directory: receives {app_id}.mo and {app_id}.develop.mo under
# {root}/locale/{locale}/LC_MESSAGES/.
[layouts.local]
root = "data"
enabled = true

# Application bundle: receives {app_id}.mo only.
[layouts.bundle]
root = "AppDir/share"
enabled = true

# ---------------------------------------------------------------------------
# Compiler
# ---------------------------------------------------------------------------
[compiler]
# "builtin" compiles in-process; "msgfmt" runs GNU gettext's msgfmt.
backend = "builtin"

# Program used when backend = "msgfmt".
msgfmt = "msgfmt"

# Include entries marked "#, fuzzy".
use_fuzzy = false

# Pass --check to msgfmt (format string and header checks).
check = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel compile workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
