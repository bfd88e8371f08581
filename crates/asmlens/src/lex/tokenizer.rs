//! Streaming lexer for assembly listings.
//!
//! The tokenizer walks the input bytes exactly once and yields tokens whose
//! byte ranges concatenate back to the input. Whitespace runs and stray
//! punctuation come out as [`AsmTokenKind::Misc`]; everything the dialect
//! gives meaning to is refined through the classifier.

use memchr::memchr;

use super::classifier::{classify_directive, Dialect, TokenClassifier};
use super::token::{AsmToken, AsmTokenKind};
use crate::error::Error;

pub struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    dialect: Dialect,
    classifier: &'static TokenClassifier,
    /// Whether the current line already produced a non-`Misc` token.
    /// Directives only exist in statement position; a `.LBB0_2` in operand
    /// position is a label reference, not a directive.
    line_has_content: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str, dialect: Dialect) -> Self {
        Tokenizer {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            dialect,
            classifier: dialect.classifier(),
            line_has_content: false,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Lex the next token. `Ok(None)` at end of input.
    pub fn try_next(&mut self) -> Result<Option<AsmToken>, Error> {
        let start = self.pos;
        let Some(&b) = self.bytes.get(self.pos) else {
            return Ok(None);
        };

        let kind = if b == b'\n' {
            self.pos += 1;
            AsmTokenKind::NewLine
        } else if matches!(b, b' ' | b'\t' | b'\r') {
            self.eat_while(|b| matches!(b, b' ' | b'\t' | b'\r'));
            AsmTokenKind::Misc
        } else if b == b'"' {
            self.lex_string()?
        } else if b.is_ascii_digit() {
            self.eat_while(|b| b.is_ascii_alphanumeric() || b == b'.');
            AsmTokenKind::Number
        } else if let Some(len) = self.comment_len_at() {
            // Comment runs to the line break, which stays outside the token.
            let line_end = memchr(b'\n', &self.bytes[self.pos + len..])
                .map(|i| self.pos + len + i)
                .unwrap_or(self.bytes.len());
            self.pos = line_end;
            AsmTokenKind::Comment
        } else if is_word_start(b) {
            self.lex_word()
        } else {
            self.pos += 1;
            AsmTokenKind::Misc
        };

        match kind {
            AsmTokenKind::NewLine => self.line_has_content = false,
            AsmTokenKind::Misc => {}
            _ => self.line_has_content = true,
        }

        Ok(Some(AsmToken::new(kind, start, self.pos - start)))
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.bytes.get(self.pos).is_some_and(|&b| pred(b)) {
            self.pos += 1;
        }
    }

    fn comment_len_at(&self) -> Option<usize> {
        let rest = &self.bytes[self.pos..];
        self.dialect
            .comment_starts()
            .iter()
            .find(|intro| rest.starts_with(intro.as_bytes()))
            .map(|intro| intro.len())
    }

    /// Double-quoted string with backslash escapes. The quotes are part of
    /// the token; a line break before the closing quote is an error.
    fn lex_string(&mut self) -> Result<AsmTokenKind, Error> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None | Some(b'\n') => {
                    return Err(Error::UnterminatedString { offset: start });
                }
                Some(b'\\') => {
                    // Skip the escaped byte, if any; EOF is caught above.
                    self.pos += usize::min(2, self.bytes.len() - self.pos);
                }
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(AsmTokenKind::String);
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn lex_word(&mut self) -> AsmTokenKind {
        let start = self.pos;
        self.pos += 1;
        self.eat_while(is_word_continue);
        let text = &self.input[start..self.pos];

        // Function markers take precedence over the label form: clang emits
        // them as `.Lfunc_begin0:` and they classify by prefix either way.
        if text.starts_with(".Lfunc_begin") || text.starts_with(".Lfunc_end") {
            if self.bytes.get(self.pos) == Some(&b':') {
                self.pos += 1;
            }
            return if text.starts_with(".Lfunc_begin") {
                AsmTokenKind::FunctionBegin
            } else {
                AsmTokenKind::FunctionEnd
            };
        }
        if self.bytes.get(self.pos) == Some(&b':') {
            self.pos += 1;
            return AsmTokenKind::Label;
        }
        if text.starts_with('.') {
            return if self.line_has_content {
                AsmTokenKind::Identifier
            } else {
                classify_directive(text)
            };
        }
        self.classifier.classify(text)
    }
}

fn is_word_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'.' | b'$' | b'@' | b'%') || b >= 0x80
}

fn is_word_continue(b: u8) -> bool {
    is_word_start(b) || b.is_ascii_digit()
}
