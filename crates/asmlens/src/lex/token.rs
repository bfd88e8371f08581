use crate::slice::StringSlice;

/// Semantic classification of a lexed token.
///
/// The tokenizer produces the structural kinds (`NewLine`, `Misc`,
/// `Comment`, `Number`, `String`, `Label`, directives) on its own and asks
/// the dialect classifier to refine identifier-shaped lexemes into the
/// instruction/register/qualifier kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsmTokenKind {
    /// Line terminator. Ends the current [`AsmLine`](crate::AsmLine).
    NewLine,
    /// Whitespace runs and operand punctuation. Skipped when scanning a
    /// line for its first meaningful token.
    Misc,
    /// Dialect comment (`#`, `;`, `//`, `;;`) to end of line.
    Comment,
    /// Decimal, hex, or float literal.
    Number,
    /// Double-quoted string literal, quotes included.
    String,
    /// Identifier the classifier did not recognize.
    Identifier,
    /// A label declaration (`name:`, colon included) or a branch/jump/call
    /// operand upgraded after the fact by the parser.
    Label,
    /// Assembler directive (leading `.`) with no more specific kind.
    Directive,
    /// Directive that introduces data (`.byte`, `.quad`, `.asciz`, ...).
    DataDirective,
    /// Plain instruction mnemonic.
    Instruction,
    /// SIMD/vector instruction mnemonic.
    InstructionSimd,
    /// Machine register name.
    Register,
    /// Conditional branch mnemonic; ends a block and falls through.
    BranchInstruction,
    /// Unconditional jump mnemonic.
    JumpInstruction,
    /// Subroutine call mnemonic.
    CallInstruction,
    /// Return mnemonic.
    ReturnInstruction,
    /// Operand qualifier (`qword ptr`, `nsw`, `align`, ...).
    Qualifier,
    /// `.file` / `.cv_file` directive.
    SourceFile,
    /// `.loc` / `.cv_loc` directive.
    SourceLocation,
    /// `.Lfunc_begin*` marker.
    FunctionBegin,
    /// `.Lfunc_end*` marker.
    FunctionEnd,
}

impl AsmTokenKind {
    /// Kinds that open an instruction statement.
    pub fn is_instruction(self) -> bool {
        matches!(
            self,
            AsmTokenKind::Instruction
                | AsmTokenKind::InstructionSimd
                | AsmTokenKind::BranchInstruction
                | AsmTokenKind::JumpInstruction
                | AsmTokenKind::CallInstruction
                | AsmTokenKind::ReturnInstruction
        )
    }

    /// Kinds the parser skips when looking for the first meaningful token
    /// of a line or the first operand after a mnemonic.
    pub fn is_meaningful(self) -> bool {
        !matches!(self, AsmTokenKind::Misc | AsmTokenKind::NewLine)
    }
}

/// A single lexed token: a classification plus its view into the input.
///
/// Adjacent tokens' byte ranges concatenate back to the input, so the token
/// array alone can reproduce the listing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsmToken {
    pub kind: AsmTokenKind,
    pub slice: StringSlice,
}

impl AsmToken {
    pub fn new(kind: AsmTokenKind, offset: usize, len: usize) -> Self {
        AsmToken {
            kind,
            slice: StringSlice::new(offset, len),
        }
    }

    /// The token's text in the buffer it was lexed from.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        self.slice.resolve(input)
    }
}
