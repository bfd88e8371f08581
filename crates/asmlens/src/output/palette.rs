//! The two syntax-color palettes.
//!
//! Rendered tokens are wrapped in `<color=#RRGGBB>...</color>` pairs; the
//! palette picks the color per token kind. Both palettes are process-wide
//! constants selected once at initialization.

use crate::lex::token::AsmTokenKind;

/// Colors for one theme. Values are the literal `#RRGGBB` text placed in
/// the color tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Source-location header lines (`=== file.c(42, 8)...`).
    pub line_header: &'static str,
    pub directive: &'static str,
    pub identifier: &'static str,
    pub qualifier: &'static str,
    pub instruction: &'static str,
    pub instruction_simd: &'static str,
    pub register: &'static str,
    pub number: &'static str,
    pub string: &'static str,
    pub comment: &'static str,
}

pub static DARK: Palette = Palette {
    line_header: "#FFFF00",
    directive: "#CCCCCC",
    identifier: "#d4d4d4",
    qualifier: "#DCDCAA",
    instruction: "#4EC9B0",
    instruction_simd: "#C586C0",
    register: "#d7ba7d",
    number: "#9cdcfe",
    string: "#ce9178",
    comment: "#6A9955",
};

pub static LIGHT: Palette = Palette {
    line_header: "#888800",
    directive: "#444444",
    identifier: "#1c1c1c",
    qualifier: "#267f99",
    instruction: "#0451a5",
    instruction_simd: "#0000ff",
    register: "#811f3f",
    number: "#007ACC",
    string: "#a31515",
    comment: "#008000",
};

impl Palette {
    pub fn select(dark_theme: bool) -> &'static Palette {
        if dark_theme {
            &DARK
        } else {
            &LIGHT
        }
    }

    /// Color for a token kind; `None` renders the token unwrapped.
    pub fn color_for(&self, kind: AsmTokenKind) -> Option<&'static str> {
        match kind {
            AsmTokenKind::Directive
            | AsmTokenKind::DataDirective
            | AsmTokenKind::FunctionBegin
            | AsmTokenKind::FunctionEnd => Some(self.directive),
            AsmTokenKind::Identifier | AsmTokenKind::Label => Some(self.identifier),
            AsmTokenKind::Qualifier => Some(self.qualifier),
            AsmTokenKind::Instruction
            | AsmTokenKind::BranchInstruction
            | AsmTokenKind::JumpInstruction
            | AsmTokenKind::CallInstruction
            | AsmTokenKind::ReturnInstruction => Some(self.instruction),
            AsmTokenKind::InstructionSimd => Some(self.instruction_simd),
            AsmTokenKind::Register => Some(self.register),
            AsmTokenKind::Number => Some(self.number),
            AsmTokenKind::String => Some(self.string),
            AsmTokenKind::Comment => Some(self.comment),
            AsmTokenKind::NewLine
            | AsmTokenKind::Misc
            | AsmTokenKind::SourceFile
            | AsmTokenKind::SourceLocation => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_selection() {
        assert_eq!(Palette::select(true), &DARK);
        assert_eq!(Palette::select(false), &LIGHT);
    }

    #[test]
    fn kind_colors() {
        assert_eq!(
            DARK.color_for(AsmTokenKind::Instruction),
            Some("#4EC9B0")
        );
        assert_eq!(
            DARK.color_for(AsmTokenKind::BranchInstruction),
            Some("#4EC9B0")
        );
        assert_eq!(
            LIGHT.color_for(AsmTokenKind::InstructionSimd),
            Some("#0000ff")
        );
        assert_eq!(DARK.color_for(AsmTokenKind::NewLine), None);
        assert_eq!(DARK.color_for(AsmTokenKind::Misc), None);
    }
}
