//! Debug-info directives and the source-file table.
//!
//! `.file`/`.cv_file` directives register numbered source files; the
//! referenced file contents are pulled in through an external
//! [`SourceLineReader`] so the library itself never touches the file
//! system. `.loc`/`.cv_loc` directives are decoded into the numeric triple
//! the renderer substitutes for them.

use std::collections::BTreeMap;

use crate::lex::token::{AsmToken, AsmTokenKind};

/// External dependency used to load the files `.file` directives name.
///
/// Implementations must not fail into the analyzer: any error reading or
/// decoding a file is reported as `None`, and rendering degrades to
/// header-only source locations.
pub trait SourceLineReader {
    fn read_all_lines(&self, path: &str) -> Option<Vec<String>>;
}

/// Reader that resolves nothing. The right choice when rendering listings
/// whose debug paths are not reachable from this machine.
pub struct NullSourceReader;

impl SourceLineReader for NullSourceReader {
    fn read_all_lines(&self, _path: &str) -> Option<Vec<String>> {
        None
    }
}

/// A registered `.file` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Normalized path, backslashes folded to `/`.
    pub path: String,
    /// File contents by line, or `None` when the reader could not load it.
    pub lines: Option<Vec<String>>,
}

impl SourceFile {
    /// Final path component, used in rendered location headers.
    pub fn basename(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// File-number to source-file mapping for one listing.
#[derive(Debug, Clone, Default)]
pub struct SourceFileTable {
    files: BTreeMap<u32, SourceFile>,
}

impl SourceFileTable {
    pub fn get(&self, fileno: u32) -> Option<&SourceFile> {
        self.files.get(&fileno)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &SourceFile)> {
        self.files.iter().map(|(n, f)| (*n, f))
    }

    /// Register a file number, reading its contents eagerly. Read failures
    /// are recorded, not propagated.
    pub(crate) fn register(&mut self, fileno: u32, path: String, reader: &dyn SourceLineReader) {
        let lines = reader.read_all_lines(&path);
        if lines.is_none() {
            log::debug!("source file {fileno} ({path}) could not be read");
        }
        self.files.insert(fileno, SourceFile { path, lines });
    }

    pub(crate) fn clear(&mut self) {
        self.files.clear();
    }
}

/// Decode a `.file N "path"` / `.cv_file funcid N "path"` line into its
/// file number and normalized path. `None` when the line carries no path.
pub(crate) fn parse_file_directive(tokens: &[AsmToken], input: &str) -> Option<(u32, String)> {
    let mut meaningful = tokens.iter().filter(|t| t.kind.is_meaningful());
    let directive = meaningful.next()?;
    let skip_funcid = directive.text(input) == ".cv_file";

    let mut numbers = Vec::new();
    let mut path = None;
    for token in meaningful {
        match token.kind {
            AsmTokenKind::Number => numbers.push(parse_number(token.text(input))),
            AsmTokenKind::String if path.is_none() => {
                path = Some(normalize_path(token.text(input)));
            }
            _ => {}
        }
    }

    let fileno = if skip_funcid {
        numbers.get(1).copied()
    } else {
        numbers.first().copied()
    };
    Some((fileno.unwrap_or(0), path?))
}

/// Decode a `.loc fileno lineno [colno]` / `.cv_loc funcid fileno lineno
/// [colno]` line. Missing numbers default to 0.
pub(crate) fn parse_loc_directive(tokens: &[AsmToken], input: &str) -> (u32, u32, u32) {
    let mut meaningful = tokens.iter().filter(|t| t.kind.is_meaningful());
    let skip_funcid = meaningful
        .next()
        .is_some_and(|t| t.text(input) == ".cv_loc");

    // Only the leading run of numbers counts; flag operands such as
    // `is_stmt 0` carry numbers of their own.
    let mut numbers = meaningful
        .take_while(|t| t.kind == AsmTokenKind::Number)
        .map(|t| parse_number(t.text(input)));
    if skip_funcid {
        numbers.next();
    }

    let fileno = numbers.next().unwrap_or(0);
    let lineno = numbers.next().unwrap_or(0);
    let colno = numbers.next().unwrap_or(0);
    (fileno, lineno, colno)
}

fn parse_number(text: &str) -> u32 {
    text.parse().unwrap_or(0)
}

/// Strip the surrounding quotes and fold backslash escapes to `/`.
fn normalize_path(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);
    inner.replace('\\', "/").replace("//", "/")
}
