//! Source catalog discovery.
//!
//! Stage 1 of the pipeline. Lists the source directory and returns one
//! [`SourceCatalog`] per `{locale}.po` file, so later stages know which
//! locales to build.
//!
//! ## Directory Structure
//!
//! ```text
//! po/
//! ├── LINGUAS          # ignored
//! ├── messages.pot     # template, ignored
//! ├── de.po            # locale "de"
//! ├── nl.po            # locale "nl"
//! └── pt_BR.po         # locale "pt_BR"
//! ```
//!
//! Only regular files directly inside the directory are considered. The
//! locale code is the file name without its extension. Hidden files and
//! subdirectories are skipped.
//!
//! ## Ordering
//!
//! Results are sorted by locale code, independent of the order the
//! filesystem returns entries in, so plans, output and failure reports are
//! reproducible.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of source catalogs.
pub const SOURCE_EXTENSION: &str = "po";

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Source directory not found: {0}")]
    MissingSourceDir(PathBuf),
    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot read source directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A translated catalog for exactly one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCatalog {
    /// Locale code derived from the file name (`nl.po` → `nl`).
    pub locale: String,
    /// Path to the `.po` file.
    pub path: PathBuf,
}

/// Discover all source catalogs in `source_dir`.
///
/// An empty directory yields an empty list. A missing or unreadable
/// directory is an error: nothing can be staged without it.
pub fn discover(source_dir: &Path) -> Result<Vec<SourceCatalog>, DiscoverError> {
    let metadata = match fs::metadata(source_dir) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DiscoverError::MissingSourceDir(source_dir.to_path_buf()));
        }
        Err(source) => {
            return Err(DiscoverError::Io {
                path: source_dir.to_path_buf(),
                source,
            });
        }
    };
    if !metadata.is_dir() {
        return Err(DiscoverError::NotADirectory(source_dir.to_path_buf()));
    }

    let read_err = |source| DiscoverError::Io {
        path: source_dir.to_path_buf(),
        source,
    };

    let mut catalogs = Vec::new();
    for entry in fs::read_dir(source_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(locale) = locale_code(&path) {
            catalogs.push(SourceCatalog { locale, path });
        }
    }

    catalogs.sort_by(|a, b| a.locale.cmp(&b.locale));
    tracing::debug!(
        dir = %source_dir.display(),
        count = catalogs.len(),
        "discovered source catalogs"
    );
    Ok(catalogs)
}

/// Derive the locale code from a catalog file name.
///
/// Returns `None` for anything that is not a visible `*.po` file with a
/// non-empty, valid UTF-8 stem.
fn locale_code(path: &Path) -> Option<String> {
    // Exact match: `nl.po` and `nl.PO` must not both become locale `nl`.
    let is_po = path.extension().is_some_and(|e| e == SOURCE_EXTENSION);
    if !is_po {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() || stem.starts_with('.') {
        return None;
    }
    Some(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{setup_fixtures, write_po};
    use tempfile::TempDir;

    fn locales(catalogs: &[SourceCatalog]) -> Vec<&str> {
        catalogs.iter().map(|c| c.locale.as_str()).collect()
    }

    #[test]
    fn discover_fixture_catalogs() {
        let tmp = setup_fixtures();
        let catalogs = discover(&tmp.path().join("po")).unwrap();
        assert_eq!(locales(&catalogs), vec!["de", "nl"]);
        assert!(catalogs[0].path.ends_with("de.po"));
    }

    #[test]
    fn locales_sorted_lexicographically() {
        let tmp = TempDir::new().unwrap();
        for locale in ["zh_CN", "de", "pt_BR", "nl", "fr"] {
            write_po(tmp.path(), locale, &[("Hello", "x")]);
        }
        let catalogs = discover(tmp.path()).unwrap();
        assert_eq!(locales(&catalogs), vec!["de", "fr", "nl", "pt_BR", "zh_CN"]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let catalogs = discover(tmp.path()).unwrap();
        assert!(catalogs.is_empty());
    }

    #[test]
    fn non_catalog_files_ignored() {
        let tmp = TempDir::new().unwrap();
        write_po(tmp.path(), "nl", &[("Hello", "Hallo")]);
        fs::write(tmp.path().join("LINGUAS"), "nl\n").unwrap();
        fs::write(tmp.path().join("messages.pot"), "msgid \"\"\nmsgstr \"\"\n").unwrap();
        fs::write(tmp.path().join("README.md"), "# translations").unwrap();
        fs::write(tmp.path().join(".hidden.po"), "").unwrap();
        fs::create_dir(tmp.path().join("old.po")).unwrap();

        let catalogs = discover(tmp.path()).unwrap();
        assert_eq!(locales(&catalogs), vec!["nl"]);
    }

    #[test]
    fn extension_match_is_exact() {
        let tmp = TempDir::new().unwrap();
        write_po(tmp.path(), "nl", &[("Hello", "Hallo")]);
        fs::write(tmp.path().join("nl.PO"), "").unwrap();
        fs::write(tmp.path().join("sv.Po"), "").unwrap();

        let catalogs = discover(tmp.path()).unwrap();
        assert_eq!(locales(&catalogs), vec!["nl"]);
        assert!(catalogs[0].path.ends_with("nl.po"));
    }

    #[test]
    fn locale_with_modifier_kept_verbatim() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("sr@latin.po"), "").unwrap();
        let catalogs = discover(tmp.path()).unwrap();
        assert_eq!(locales(&catalogs), vec!["sr@latin"]);
    }

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = discover(&tmp.path().join("po"));
        assert!(matches!(result, Err(DiscoverError::MissingSourceDir(_))));
    }

    #[test]
    fn file_instead_of_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("po");
        fs::write(&path, "not a dir").unwrap();
        let result = discover(&path);
        assert!(matches!(result, Err(DiscoverError::NotADirectory(_))));
    }
}
