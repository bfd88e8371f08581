//! The top-level analyzer facade.
//!
//! A [`Disassembler`] owns the input buffer and the flat token/line/block
//! arrays built from it, plus the lazily filled render caches. It is a
//! single-threaded, non-suspending analyzer: `initialize` runs to
//! completion, after which the parsed arrays never change and only the
//! memoized render strings and column entries are added on demand.

use crate::error::Error;
use crate::lex::classifier::Dialect;
use crate::lex::token::AsmToken;
use crate::output::palette::Palette;
use crate::output::render::BlockRenderer;
use crate::parse::builder::{parse_listing, ParsedListing};
use crate::parse::source::{SourceFileTable, SourceLineReader};
use crate::parse::types::{AsmBlock, AsmLine, COLUMN_INDEX_UNSET};

/// Presentation options for [`Disassembler::initialize`].
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Pick the dark palette (the default) or the light one.
    pub dark_theme: bool,
    /// Emit `<color=...>` tags around tokens.
    pub colored: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            dark_theme: true,
            colored: true,
        }
    }
}

/// Multi-dialect assembly listing analyzer and renderer.
///
/// ```
/// use asmlens::{Disassembler, Dialect, NullSourceReader, RenderOptions};
///
/// let listing = "While compiling job: example\nmain:\n  ret\n";
/// let mut disasm = Disassembler::new();
/// assert!(disasm.initialize(listing, Dialect::Intel, &NullSourceReader, RenderOptions::default()));
/// assert_eq!(disasm.blocks().len(), 1);
/// ```
pub struct Disassembler {
    input: String,
    dialect: Dialect,
    colored: bool,
    palette: &'static Palette,
    tokens: Vec<AsmToken>,
    lines: Vec<AsmLine>,
    blocks: Vec<AsmBlock>,
    files: SourceFileTable,
    /// Start columns of every token after its line's first, grouped by
    /// line; populated when the owning block first renders.
    column_indices: Vec<u32>,
    /// Memoized per-block renderings.
    rendered: Vec<Option<String>>,
    initialized: bool,
}

impl Default for Disassembler {
    fn default() -> Self {
        Disassembler::new()
    }
}

impl Disassembler {
    pub fn new() -> Self {
        Disassembler {
            input: String::new(),
            dialect: Dialect::Intel,
            colored: true,
            palette: Palette::select(true),
            tokens: Vec::new(),
            lines: Vec::new(),
            blocks: Vec::new(),
            files: SourceFileTable::default(),
            column_indices: Vec::new(),
            rendered: Vec::new(),
            initialized: false,
        }
    }

    /// Analyze a listing, replacing any previous state.
    ///
    /// Returns `false` on a parse error, in which case the instance is
    /// fully reset and no partial state is observable. The `reader` is only
    /// consulted during this call, once per `.file` directive.
    pub fn initialize(
        &mut self,
        input: &str,
        dialect: Dialect,
        reader: &dyn SourceLineReader,
        options: RenderOptions,
    ) -> bool {
        self.reset();
        match parse_listing(input, dialect, reader) {
            Ok(parsed) => {
                self.install(input, dialect, options, parsed);
                true
            }
            Err(error) => {
                log::error!("failed to analyze {dialect} listing: {error}");
                self.reset();
                false
            }
        }
    }

    /// Like [`initialize`](Self::initialize), but surfacing the parse
    /// error.
    pub fn try_initialize(
        &mut self,
        input: &str,
        dialect: Dialect,
        reader: &dyn SourceLineReader,
        options: RenderOptions,
    ) -> Result<(), Error> {
        self.reset();
        match parse_listing(input, dialect, reader) {
            Ok(parsed) => {
                self.install(input, dialect, options, parsed);
                Ok(())
            }
            Err(error) => {
                self.reset();
                Err(error)
            }
        }
    }

    fn install(
        &mut self,
        input: &str,
        dialect: Dialect,
        options: RenderOptions,
        parsed: ParsedListing,
    ) {
        self.input = input.to_owned();
        self.dialect = dialect;
        self.colored = options.colored;
        self.palette = Palette::select(options.dark_theme);
        self.tokens = parsed.tokens;
        self.lines = parsed.lines;
        self.blocks = parsed.blocks;
        self.files = parsed.files;
        self.rendered = vec![None; self.blocks.len()];
        self.initialized = true;
        log::debug!(
            "analyzed {dialect} listing: {} tokens, {} lines, {} blocks, {} source files",
            self.tokens.len(),
            self.lines.len(),
            self.blocks.len(),
            self.files.len()
        );
    }

    /// Drop all state. A reset instance behaves like a fresh one and can be
    /// re-initialized.
    pub fn reset(&mut self) {
        self.input.clear();
        self.tokens.clear();
        self.lines.clear();
        self.blocks.clear();
        self.files.clear();
        self.column_indices.clear();
        self.rendered.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_colored(&self) -> bool {
        self.colored
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn tokens(&self) -> &[AsmToken] {
        &self.tokens
    }

    pub fn lines(&self) -> &[AsmLine] {
        &self.lines
    }

    pub fn blocks(&self) -> &[AsmBlock] {
        &self.blocks
    }

    pub fn files(&self) -> &SourceFileTable {
        &self.files
    }

    pub fn token(&self, index: usize) -> Option<AsmToken> {
        self.tokens.get(index).copied()
    }

    /// The token's text, a slice of the input buffer.
    pub fn token_text(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.text(&self.input))
    }

    /// Render one block, or return the memoized rendering. Repeated calls
    /// are byte-identical. `None` for an out-of-range index.
    pub fn get_or_render_block(&mut self, index: usize) -> Option<&str> {
        if index >= self.blocks.len() {
            return None;
        }
        if self.rendered[index].is_none() {
            let renderer = BlockRenderer {
                input: &self.input,
                dialect: self.dialect,
                tokens: &self.tokens,
                files: &self.files,
                palette: self.colored.then_some(self.palette),
            };
            let text = renderer.render(
                &self.blocks[index],
                &mut self.lines,
                &mut self.column_indices,
            );
            self.rendered[index] = Some(text);
        }
        self.rendered[index].as_deref()
    }

    /// Render every block and concatenate the results.
    pub fn render_full_text(&mut self) -> String {
        let mut out = String::new();
        for index in 0..self.blocks.len() {
            if let Some(text) = self.get_or_render_block(index) {
                out.push_str(text);
            }
        }
        out
    }

    /// Map a rendered text position back to a token.
    ///
    /// `column` is the 0-based visible column within the rendered line
    /// (color tags contribute nothing). Returns the token's index in the
    /// token array plus the line's absolute index, or `None` when no token
    /// covers that column — the newline and anything past it included.
    pub fn token_index_from_column(
        &mut self,
        block: usize,
        line_in_block: usize,
        column: usize,
    ) -> Option<(usize, usize)> {
        // Column entries exist only once the block has rendered.
        self.get_or_render_block(block)?;

        let info = self.blocks.get(block)?;
        if line_in_block >= info.line_count as usize {
            return None;
        }
        let line_index = info.line_index as usize + line_in_block;
        let AsmLine::Tokens {
            token_index,
            token_count,
            column_index,
            ..
        } = self.lines[line_index]
        else {
            return None;
        };
        if column_index == COLUMN_INDEX_UNSET {
            return None;
        }

        let count = token_count as usize;
        let entries = &self.column_indices
            [column_index as usize..column_index as usize + count.saturating_sub(1)];
        let start_of = |i: usize| {
            if i == 0 {
                0
            } else {
                entries[i - 1] as usize
            }
        };

        for i in 0..count {
            let start = start_of(i);
            let end = if i + 1 < count {
                start_of(i + 1)
            } else {
                usize::MAX
            };
            if column >= start && column < end {
                let token = self.tokens[token_index as usize + i];
                if token.kind == crate::lex::token::AsmTokenKind::NewLine {
                    return None;
                }
                return Some((token_index as usize + i, line_index));
            }
        }
        None
    }
}
