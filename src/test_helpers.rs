//! Shared test utilities for the catalog-stage test suite.
//!
//! Provides fixture setup, small PO file builders, and an output tree lister
//! so staging tests can assert on exactly which files exist.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let catalogs = discover(&tmp.path().join("po")).unwrap();
//!
//! assert_eq!(output_files(tmp.path()), Vec::<String>::new());
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::discover::SourceCatalog;

/// The Dutch fixture catalog: header, context, plural, fuzzy, untranslated
/// and obsolete entries.
pub const NL_PO: &str = include_str!("../fixtures/po/nl.po");

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
///
/// The copy contains `po/` with `de.po`, `nl.po`, `LINGUAS` and a template.
/// Tests get an isolated copy they can mutate without affecting other tests.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// PO builders
// =========================================================================

/// Write `{dir}/{locale}.po` with a UTF-8 header and the given pairs.
pub fn write_po(dir: &Path, locale: &str, pairs: &[(&str, &str)]) -> PathBuf {
    let mut text = String::from(
        "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
    );
    for (msgid, msgstr) in pairs {
        text.push_str(&format!("\nmsgid \"{msgid}\"\nmsgstr \"{msgstr}\"\n"));
    }
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{locale}.po"));
    std::fs::write(&path, text).unwrap();
    path
}

/// Write one small catalog per locale under `{root}/po` and return them
/// as discovery would.
pub fn source_catalogs(root: &Path, locales: &[&str]) -> Vec<SourceCatalog> {
    let po_dir = root.join("po");
    locales
        .iter()
        .map(|locale| SourceCatalog {
            locale: locale.to_string(),
            path: write_po(&po_dir, locale, &[("Hello", "Hallo")]),
        })
        .collect()
}

// =========================================================================
// Output inspection
// =========================================================================

/// All `.mo` files under `root`, as sorted `/`-separated relative paths.
pub fn output_files(root: &Path) -> Vec<String> {
    let mut files = Vec::new();
    collect_mo_files(root, root, &mut files);
    files.sort();
    files
}

fn collect_mo_files(root: &Path, dir: &Path, files: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_mo_files(root, &path, files);
        } else if path.extension().is_some_and(|e| e == "mo") {
            let rel = path.strip_prefix(root).unwrap();
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect();
            files.push(parts.join("/"));
        }
    }
}
