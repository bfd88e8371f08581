//! Single-pass construction of the line array and block graph.
//!
//! The builder consumes the token stream once, committing a line at every
//! `NewLine` and closing the current block after a committed conditional
//! branch or just before a line that opens with a label declaration.
//! Label declarations and branch targets are routed to the label table for
//! post-parse edge resolution; `.file`/`.loc` directives are routed to the
//! source-file table.

use crate::error::Error;
use crate::lex::token::{AsmToken, AsmTokenKind};
use crate::lex::tokenizer::Tokenizer;
use crate::lex::Dialect;

use super::labels::LabelTable;
use super::source::{parse_file_directive, parse_loc_directive, SourceFileTable, SourceLineReader};
use super::types::{
    AsmBlock, AsmBlockKind, AsmLine, AsmLineKind, AsmLineRef, COLUMN_INDEX_UNSET,
};

/// Token-array pre-sizing heuristic: listings average north of seven bytes
/// per token, so this keeps the array from reallocating during the parse.
const BYTES_PER_TOKEN: usize = 7;
const MIN_TOKEN_CAPACITY: usize = 256;

/// Everything one parse produces. The arrays are immutable afterwards; only
/// edges were installed after the pass and only render caches grow later.
pub(crate) struct ParsedListing {
    pub tokens: Vec<AsmToken>,
    pub lines: Vec<AsmLine>,
    pub blocks: Vec<AsmBlock>,
    pub files: SourceFileTable,
}

/// Parse a full listing. The first physical line is a compiler banner and
/// is consumed without being stored.
pub(crate) fn parse_listing(
    input: &str,
    dialect: Dialect,
    reader: &dyn SourceLineReader,
) -> Result<ParsedListing, Error> {
    let mut lexer = Tokenizer::new(input, dialect);

    // Banner line: lex and drop, the trailing newline included.
    while let Some(token) = lexer.try_next()? {
        if token.kind == AsmTokenKind::NewLine {
            break;
        }
    }

    let mut builder = Builder::new(input, reader);
    while let Some(token) = lexer.try_next()? {
        builder.push_token(token)?;
    }
    builder.finish()
}

#[derive(Debug, Clone, Copy, Default)]
struct BlockFlags {
    code: bool,
    data: bool,
    directive: bool,
}

impl BlockFlags {
    fn kind(self) -> AsmBlockKind {
        if self.code {
            AsmBlockKind::Code
        } else if self.data {
            AsmBlockKind::Data
        } else if self.directive {
            AsmBlockKind::Directive
        } else {
            AsmBlockKind::None
        }
    }
}

struct Builder<'a> {
    input: &'a str,
    reader: &'a dyn SourceLineReader,
    tokens: Vec<AsmToken>,
    lines: Vec<AsmLine>,
    blocks: Vec<AsmBlock>,
    files: SourceFileTable,
    labels: LabelTable<'a>,
    /// Token index where the line being accumulated starts.
    line_start: u32,
    /// Kind decided by the line's first meaningful token.
    line_kind: AsmLineKind,
    /// Token index of that first meaningful token, if seen.
    first_meaningful: Option<u32>,
    /// Line index where the open block starts.
    block_start: u32,
    flags: BlockFlags,
}

impl<'a> Builder<'a> {
    fn new(input: &'a str, reader: &'a dyn SourceLineReader) -> Self {
        let capacity = (input.len() / BYTES_PER_TOKEN).max(MIN_TOKEN_CAPACITY);
        Builder {
            input,
            reader,
            tokens: Vec::with_capacity(capacity),
            lines: Vec::new(),
            blocks: Vec::new(),
            files: SourceFileTable::default(),
            labels: LabelTable::new(),
            line_start: 0,
            line_kind: AsmLineKind::None,
            first_meaningful: None,
            block_start: 0,
            flags: BlockFlags::default(),
        }
    }

    fn push_token(&mut self, token: AsmToken) -> Result<(), Error> {
        if self.tokens.len() >= u32::MAX as usize {
            return Err(Error::TokenIndexOverflow { max: u32::MAX });
        }
        if token.kind.is_meaningful() && self.first_meaningful.is_none() {
            self.first_meaningful = Some(self.tokens.len() as u32);
            self.line_kind = line_kind_for(token.kind);
            // A label declaration opens a new block.
            if token.kind == AsmTokenKind::Label && self.lines.len() as u32 > self.block_start {
                self.close_block();
            }
        }
        let ends_line = token.kind == AsmTokenKind::NewLine;
        self.tokens.push(token);
        if ends_line {
            self.commit_line();
        }
        Ok(())
    }

    fn finish(mut self) -> Result<ParsedListing, Error> {
        if self.tokens.len() as u32 > self.line_start {
            self.commit_line();
        }
        self.close_block();

        let Builder {
            tokens,
            lines,
            mut blocks,
            files,
            labels,
            ..
        } = self;
        labels.resolve_edges(&mut blocks);

        Ok(ParsedListing {
            tokens,
            lines,
            blocks,
            files,
        })
    }

    fn commit_line(&mut self) {
        let token_index = self.line_start;
        let token_count = self.tokens.len() as u32 - token_index;
        let kind = self.line_kind;
        let line_tokens = token_index as usize..self.tokens.len();

        match kind {
            AsmLineKind::SourceFile => {
                // Registered and dropped; the tokens stay in the array but
                // no line refers to them.
                if let Some((fileno, path)) =
                    parse_file_directive(&self.tokens[line_tokens], self.input)
                {
                    self.files.register(fileno, path, self.reader);
                }
            }
            AsmLineKind::SourceLocation => {
                let (file, line, column) =
                    parse_loc_directive(&self.tokens[line_tokens], self.input);
                self.lines.push(AsmLine::SourceLoc { file, line, column });
                self.flags.code = true;
            }
            _ => {
                self.lines.push(AsmLine::Tokens {
                    kind,
                    token_index,
                    token_count,
                    column_index: COLUMN_INDEX_UNSET,
                });
                match kind {
                    AsmLineKind::LabelDeclaration => self.register_label(),
                    AsmLineKind::CodeBranch | AsmLineKind::CodeJump | AsmLineKind::CodeCall => {
                        self.record_target(kind)
                    }
                    _ => {}
                }
                match kind {
                    AsmLineKind::Directive => self.flags.directive = true,
                    AsmLineKind::Data => self.flags.data = true,
                    AsmLineKind::Code
                    | AsmLineKind::CodeBranch
                    | AsmLineKind::CodeJump
                    | AsmLineKind::CodeCall
                    | AsmLineKind::CodeReturn => self.flags.code = true,
                    _ => {}
                }
            }
        }

        // A conditional branch terminates its block.
        if kind == AsmLineKind::CodeBranch {
            self.close_block();
        }

        self.line_start = self.tokens.len() as u32;
        self.line_kind = AsmLineKind::None;
        self.first_meaningful = None;
    }

    fn close_block(&mut self) {
        let line_count = self.lines.len() as u32 - self.block_start;
        if line_count > 0 {
            self.blocks.push(AsmBlock {
                kind: self.flags.kind(),
                line_index: self.block_start,
                line_count,
                edges: Vec::new(),
            });
            self.block_start = self.lines.len() as u32;
        }
        self.flags = BlockFlags::default();
    }

    /// Reference to the line just committed, relative to the open block.
    fn committed_line_ref(&self) -> AsmLineRef {
        AsmLineRef::new(
            self.blocks.len() as u32,
            self.lines.len() as u32 - 1 - self.block_start,
        )
    }

    fn register_label(&mut self) {
        let Some(index) = self.first_meaningful else {
            return;
        };
        let text = self.tokens[index as usize].text(self.input);
        let name = text.strip_suffix(':').unwrap_or(text);
        let at = self.committed_line_ref();
        self.labels.declare(name, at);
    }

    /// Upgrade the first operand after the mnemonic to a label and, for
    /// branches and jumps, defer it for edge resolution. Calls get the
    /// upgrade (the operand names a routine) but never produce edges; a
    /// conditional branch is deferred even without a label-shaped operand,
    /// because its fall-through edge does not depend on one.
    fn record_target(&mut self, kind: AsmLineKind) {
        let name = self.upgrade_operand();
        let origin = self.committed_line_ref();
        match kind {
            AsmLineKind::CodeBranch => self.labels.defer(name, origin, true),
            AsmLineKind::CodeJump if name.is_some() => self.labels.defer(name, origin, false),
            _ => {}
        }
    }

    /// Find the first meaningful token after the mnemonic; if it can name a
    /// label, flip its kind to `Label` and return the normalized name.
    fn upgrade_operand(&mut self) -> Option<&'a str> {
        let mnemonic = self.first_meaningful?;
        let operand = (mnemonic as usize + 1..self.tokens.len())
            .find(|&i| self.tokens[i].kind.is_meaningful())?;
        if !matches!(
            self.tokens[operand].kind,
            AsmTokenKind::String | AsmTokenKind::Identifier | AsmTokenKind::Label
        ) {
            return None;
        }
        let name = target_name(self.tokens[operand].text(self.input));
        self.tokens[operand].kind = AsmTokenKind::Label;
        Some(name)
    }
}

/// Normalize a target operand lexeme: quoted strings lose their quotes,
/// declaration-form labels their colon.
fn target_name(text: &str) -> &str {
    let text = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    text.strip_suffix(':').unwrap_or(text)
}

fn line_kind_for(first: AsmTokenKind) -> AsmLineKind {
    match first {
        AsmTokenKind::Directive => AsmLineKind::Directive,
        AsmTokenKind::SourceFile => AsmLineKind::SourceFile,
        AsmTokenKind::SourceLocation => AsmLineKind::SourceLocation,
        AsmTokenKind::DataDirective => AsmLineKind::Data,
        AsmTokenKind::Instruction | AsmTokenKind::InstructionSimd => AsmLineKind::Code,
        AsmTokenKind::BranchInstruction => AsmLineKind::CodeBranch,
        AsmTokenKind::JumpInstruction => AsmLineKind::CodeJump,
        AsmTokenKind::CallInstruction => AsmLineKind::CodeCall,
        AsmTokenKind::ReturnInstruction => AsmLineKind::CodeReturn,
        AsmTokenKind::Label => AsmLineKind::LabelDeclaration,
        AsmTokenKind::Comment => AsmLineKind::Comment,
        AsmTokenKind::FunctionBegin => AsmLineKind::FunctionBegin,
        AsmTokenKind::FunctionEnd => AsmLineKind::FunctionEnd,
        _ => AsmLineKind::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::source::NullSourceReader;

    fn parse(input: &str, dialect: Dialect) -> ParsedListing {
        parse_listing(input, dialect, &NullSourceReader).unwrap()
    }

    fn line_kinds(parsed: &ParsedListing) -> Vec<AsmLineKind> {
        parsed.lines.iter().map(|l| l.kind()).collect()
    }

    #[test]
    fn banner_line_is_dropped() {
        let parsed = parse("While compiling job: whatever\nret\n", Dialect::Intel);
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.lines[0].kind(), AsmLineKind::CodeReturn);
        // The banner's tokens are not stored either.
        assert_eq!(
            parsed.tokens[0].text("While compiling job: whatever\nret\n"),
            "ret"
        );
    }

    #[test]
    fn line_kinds_follow_the_first_meaningful_token() {
        let input = "banner\n\
            .globl main\n\
            main:\n\
            \tmov eax, 1\n\
            \tmulps xmm0, xmm1\n\
            \tje target\n\
            \tjmp main\n\
            \tcall helper\n\
            \tret\n\
            # done\n";
        let parsed = parse(input, Dialect::Intel);
        use AsmLineKind::*;
        assert_eq!(
            line_kinds(&parsed),
            vec![
                Directive,
                LabelDeclaration,
                Code,
                Code,
                CodeBranch,
                CodeJump,
                CodeCall,
                CodeReturn,
                Comment
            ]
        );
    }

    #[test]
    fn blocks_partition_the_lines() {
        let input = "banner\n.text\nf:\n  mov eax, 1\n  je f\n  ret\ng:\n  ret\n";
        let parsed = parse(input, Dialect::Intel);

        let mut next = 0u32;
        for block in &parsed.blocks {
            assert_eq!(block.line_index, next, "blocks must be contiguous");
            assert!(block.line_count > 0);
            next += block.line_count;
        }
        assert_eq!(next as usize, parsed.lines.len());
    }

    #[test]
    fn branch_closes_a_block_and_labels_open_one() {
        let input = "banner\nL1:\n  je L3\n  nop\nL3:\n  ret\n";
        let parsed = parse(input, Dialect::Intel);
        assert_eq!(parsed.blocks.len(), 3);
        assert_eq!(parsed.blocks[0].line_count, 2); // L1: + je
        assert_eq!(parsed.blocks[1].line_count, 1); // nop
        assert_eq!(parsed.blocks[2].line_count, 2); // L3: + ret
    }

    #[test]
    fn block_kind_precedence() {
        // Code beats data beats directive.
        let parsed = parse("banner\n.p2align 4\n.byte 1\n  ret\n", Dialect::Intel);
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.blocks[0].kind, AsmBlockKind::Code);

        let parsed = parse("banner\n.p2align 4\n.byte 1\n", Dialect::Intel);
        assert_eq!(parsed.blocks[0].kind, AsmBlockKind::Data);

        let parsed = parse("banner\n.p2align 4\n", Dialect::Intel);
        assert_eq!(parsed.blocks[0].kind, AsmBlockKind::Directive);
    }

    #[test]
    fn label_only_block_stays_kind_none() {
        let parsed = parse("banner\nmain:\n# nothing here\n", Dialect::Intel);
        assert_eq!(parsed.blocks.len(), 1);
        assert_eq!(parsed.blocks[0].kind, AsmBlockKind::None);
    }

    #[test]
    fn file_directive_lines_are_dropped() {
        let input = "banner\n.file 1 \"/tmp/x.c\"\n  ret\n";
        let parsed = parse(input, Dialect::Intel);
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.lines[0].kind(), AsmLineKind::CodeReturn);
        assert_eq!(parsed.files.get(1).unwrap().path, "/tmp/x.c");
    }

    #[test]
    fn loc_directive_lines_become_source_locations() {
        let input = "banner\n.loc 1 42 7\n  ret\n";
        let parsed = parse(input, Dialect::Intel);
        assert_eq!(
            parsed.lines[0],
            AsmLine::SourceLoc {
                file: 1,
                line: 42,
                column: 7
            }
        );
        // Source locations mark their block as code.
        assert_eq!(parsed.blocks[0].kind, AsmBlockKind::Code);
    }

    #[test]
    fn branch_operand_is_upgraded_to_a_label() {
        let input = "banner\n  bl __divsi3\n";
        let parsed = parse(input, Dialect::Arm);
        assert_eq!(parsed.lines[0].kind(), AsmLineKind::CodeCall);
        let operand = parsed
            .tokens
            .iter()
            .find(|t| t.text(input) == "__divsi3")
            .unwrap();
        assert_eq!(operand.kind, AsmTokenKind::Label);
        // Calls never produce edges, resolvable or not.
        assert!(parsed.blocks.iter().all(|b| b.edges.is_empty()));
    }

    #[test]
    fn trailing_line_without_a_newline_is_committed() {
        let parsed = parse("banner\n  ret", Dialect::Intel);
        assert_eq!(parsed.lines.len(), 1);
        assert_eq!(parsed.lines[0].kind(), AsmLineKind::CodeReturn);
        assert_eq!(parsed.blocks.len(), 1);
    }

    #[test]
    fn empty_input_after_banner() {
        let parsed = parse("banner only, no newline", Dialect::Intel);
        assert!(parsed.tokens.is_empty());
        assert!(parsed.lines.is_empty());
        assert!(parsed.blocks.is_empty());
    }

    #[test]
    fn function_markers_do_not_open_blocks() {
        let input = "banner\nmain:\n.Lfunc_begin0:\n  ret\n.Lfunc_end0:\n";
        let parsed = parse(input, Dialect::Intel);
        use AsmLineKind::*;
        assert_eq!(
            line_kinds(&parsed),
            vec![LabelDeclaration, FunctionBegin, CodeReturn, FunctionEnd]
        );
        assert_eq!(parsed.blocks.len(), 1);
    }
}
