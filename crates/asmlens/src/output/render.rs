//! Per-block text rendering.
//!
//! Rendering a block walks its lines and appends each token's underlying
//! text, optionally wrapped in color tags. Source-location lines render as
//! `===` headers quoting the referenced source line instead of their
//! original directive text. While rendering, the 0-based visible column of
//! every token after a line's first is appended to the shared column array,
//! which is what makes text positions mappable back to tokens.

use std::fmt::Write as _;

use crate::lex::classifier::Dialect;
use crate::lex::token::{AsmToken, AsmTokenKind};
use crate::parse::source::SourceFileTable;
use crate::parse::types::{AsmBlock, AsmLine, COLUMN_INDEX_UNSET};

use super::palette::Palette;

/// Column instruction mnemonics are padded to on Intel, where operands are
/// conventionally aligned. Other dialects render verbatim.
pub(crate) const INSTRUCTION_COLUMN: usize = 10;

/// Borrowed view of everything one block render needs.
pub(crate) struct BlockRenderer<'a> {
    pub input: &'a str,
    pub dialect: Dialect,
    pub tokens: &'a [AsmToken],
    pub files: &'a SourceFileTable,
    /// `None` renders plain text without color tags.
    pub palette: Option<&'static Palette>,
}

impl BlockRenderer<'_> {
    /// Render one block. On the block's first render the column entries of
    /// its lines are produced as a side effect and each line's
    /// `column_index` is fixed; later renders leave the column array
    /// untouched.
    pub fn render(
        &self,
        block: &AsmBlock,
        lines: &mut [AsmLine],
        columns: &mut Vec<u32>,
    ) -> String {
        let mut out = String::new();
        for index in block.line_range() {
            match &mut lines[index] {
                AsmLine::SourceLoc { file, line, column } => {
                    self.render_location(*file, *line, *column, &mut out);
                }
                AsmLine::Tokens {
                    token_index,
                    token_count,
                    column_index,
                    ..
                } => {
                    let record = *column_index == COLUMN_INDEX_UNSET;
                    if record {
                        *column_index = columns.len() as u32;
                    }
                    self.render_tokens(
                        *token_index as usize,
                        *token_count as usize,
                        record,
                        columns,
                        &mut out,
                    );
                }
            }
        }
        out
    }

    fn render_tokens(
        &self,
        start: usize,
        count: usize,
        record: bool,
        columns: &mut Vec<u32>,
        out: &mut String,
    ) {
        let mut column = 0usize;
        for (i, token) in self.tokens[start..start + count].iter().enumerate() {
            if i > 0 && record {
                columns.push(column as u32);
            }
            if token.kind == AsmTokenKind::NewLine {
                out.push('\n');
                continue;
            }
            let text = token.text(self.input);
            match self.palette.and_then(|p| p.color_for(token.kind)) {
                Some(color) => {
                    out.push_str("<color=");
                    out.push_str(color);
                    out.push('>');
                    out.push_str(text);
                    out.push_str("</color>");
                }
                None => out.push_str(text),
            }
            column += text.chars().count();

            // Pad the mnemonic out to the operand column, unless the
            // mnemonic is the line's last token before the newline.
            if self.dialect == Dialect::Intel && token.kind.is_instruction() && i + 2 < count {
                while column < INSTRUCTION_COLUMN {
                    out.push(' ');
                    column += 1;
                }
            }
        }
    }

    /// `fileno == 0` suppresses the line; `lineno == 0` renders a bare
    /// file header; otherwise the header quotes the referenced source line
    /// when its text is available.
    fn render_location(&self, file: u32, line: u32, column: u32, out: &mut String) {
        if file == 0 {
            out.push('\n');
            return;
        }
        let Some(source) = self.files.get(file) else {
            // No `.file` entry to take a path from; nothing to show.
            out.push('\n');
            return;
        };

        let mut header = String::from("=== ");
        header.push_str(source.basename());
        if line > 0 {
            let _ = write!(header, "({line}, {})", column + 1);
            if let Some(text) = source
                .lines
                .as_ref()
                .and_then(|lines| lines.get(line as usize - 1))
            {
                header.push_str(text);
            }
        }

        match self.palette {
            Some(palette) => {
                let _ = write!(out, "<color={}>{header}</color>", palette.line_header);
            }
            None => out.push_str(&header),
        }
        out.push('\n');
    }
}
