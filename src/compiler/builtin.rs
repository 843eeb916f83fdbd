//! Pure Rust catalog compiler: no gettext installation required.
//!
//! | Step | How |
//! |---|---|
//! | Read + decode | `std::fs::read`, UTF-8 with optional BOM |
//! | Normalize | drop obsolete `#~` entries, split `msgid"..."` into keyword and string |
//! | Parse | [`polib::po_file::parse_from_reader`] |
//! | Select | [`select`]: msgfmt's rules for which entries are emitted |
//! | Encode | [`polib::mo_file::write`] |
//!
//! Obsolete entries are removed together with the comments and flags that
//! precede them, so a `#, fuzzy` written above an obsolete entry never
//! attaches to the next live one.

use super::backend::{CatalogCompiler, CompileError};
use polib::catalog::Catalog;
use polib::message::{Message, MessageView};
use polib::{mo_file, po_file};
use std::borrow::Cow;
use std::path::Path;

/// Compiler backed by `polib`'s PO parser and MO writer.
#[derive(Debug, Clone, Default)]
pub struct BuiltinCompiler {
    /// Include entries flagged `fuzzy`.
    pub use_fuzzy: bool,
}

impl BuiltinCompiler {
    pub fn new(use_fuzzy: bool) -> Self {
        Self { use_fuzzy }
    }

    /// Parse a source catalog without writing anything.
    pub fn parse_file(&self, source: &Path) -> Result<Catalog, CompileError> {
        let bytes = std::fs::read(source).map_err(|e| CompileError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        let text = decode(&bytes).map_err(|line| CompileError::Parse {
            path: source.to_path_buf(),
            message: format!("line {line}: not valid UTF-8"),
        })?;
        let normalized = normalize(text);
        po_file::parse_from_reader(normalized.as_bytes()).map_err(|e| CompileError::Parse {
            path: source.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Strip a UTF-8 BOM and validate the encoding.
///
/// On failure returns the 1-based line of the first invalid byte.
fn decode(bytes: &[u8]) -> Result<&str, usize> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    std::str::from_utf8(bytes).map_err(|e| {
        let valid = &bytes[..e.valid_up_to()];
        valid.iter().filter(|&&b| b == b'\n').count() + 1
    })
}

/// Rewrite the source so the parser sees only live entries in canonical form.
///
/// Line count is preserved: dropped lines become empty lines.
fn normalize(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<Cow<'_, str>> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        if !is_comment(lines[i]) {
            out.push(split_keyword(lines[i]));
            i += 1;
            continue;
        }
        // A run of comment lines. Everything up to its last `#~` line
        // belongs to obsolete entries.
        let start = i;
        while i < lines.len() && is_comment(lines[i]) {
            i += 1;
        }
        let run = &lines[start..i];
        let obsolete_end = run
            .iter()
            .rposition(|l| l.trim_start().starts_with("#~"))
            .map_or(0, |last| last + 1);
        for (n, line) in run.iter().enumerate() {
            if n < obsolete_end {
                out.push(Cow::Borrowed(""));
            } else {
                out.push(Cow::Borrowed(line));
            }
        }
    }

    let mut normalized = out.join("\n");
    normalized.push('\n');
    normalized
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// `msgid"Play"` → `msgid "Play"`; any other line is returned unchanged.
fn split_keyword(line: &str) -> Cow<'_, str> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with("msg") {
        return Cow::Borrowed(line);
    }
    match trimmed.find('"') {
        Some(quote)
            if trimmed[..quote]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '[' | ']')) =>
        {
            Cow::Owned(format!("{} {}", &trimmed[..quote], &trimmed[quote..]))
        }
        _ => Cow::Borrowed(line),
    }
}

/// The header lives in the catalog metadata, not among the messages.
fn is_header(message: &dyn MessageView) -> bool {
    message.msgid().is_empty() && message.msgctxt().unwrap_or_default().is_empty()
}

/// Whether msgfmt would emit `message`.
///
/// Untranslated entries are dropped. Fuzzy entries are dropped unless
/// `use_fuzzy` is set. The header is carried by the metadata and always kept.
pub fn is_emitted(message: &dyn MessageView, use_fuzzy: bool) -> bool {
    !is_header(message)
        && message.is_translated()
        && (use_fuzzy || !message.flags().is_fuzzy())
}

/// Copy the emitted messages of `catalog` into a new catalog.
///
/// Copies carry no flags, so the writer cannot filter fuzzy entries a
/// second time.
pub fn select(catalog: &Catalog, use_fuzzy: bool) -> Catalog {
    let mut selected = Catalog::new(catalog.metadata.clone());
    for message in catalog.messages().filter(|m| is_emitted(*m, use_fuzzy)) {
        let copy = if message.is_plural() {
            Message::build_plural()
                .with_msgctxt(message.msgctxt().unwrap_or_default().to_string())
                .with_msgid(message.msgid().to_string())
                .with_msgid_plural(message.msgid_plural().unwrap_or_default().to_string())
                .with_msgstr_plural(message.msgstr_plural().cloned().unwrap_or_default())
                .done()
        } else {
            Message::build_singular()
                .with_msgctxt(message.msgctxt().unwrap_or_default().to_string())
                .with_msgid(message.msgid().to_string())
                .with_msgstr(message.msgstr().unwrap_or_default().to_string())
                .done()
        };
        selected.append_or_update(copy);
    }
    selected
}

impl CatalogCompiler for BuiltinCompiler {
    fn name(&self) -> &str {
        "builtin"
    }

    fn compile(&self, source: &Path, output: &Path) -> Result<(), CompileError> {
        let catalog = self.parse_file(source)?;
        let selected = select(&catalog, self.use_fuzzy);
        tracing::trace!(
            source = %source.display(),
            parsed = catalog.count(),
            emitted = selected.count(),
            "compiled catalog"
        );
        mo_file::write(&selected, output).map_err(|e| CompileError::Io {
            path: output.to_path_buf(),
            source: e,
        })
    }
}
