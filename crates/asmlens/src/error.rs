use thiserror::Error;

/// Errors that can occur while analyzing an assembly listing.
///
/// All variants are self-contained (no `std::io` references) so the library
/// stays free of file-system concerns; source-file loading failures are not
/// errors at all, they degrade to header-only rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A double-quoted string literal ran to a line break or the end of the
    /// input without a closing quote.
    #[error("unterminated string literal at byte offset 0x{offset:X}")]
    UnterminatedString { offset: usize },

    /// The listing produced more tokens than the flat arrays can index.
    /// Cross-references are 32-bit, which bounds a listing at `u32::MAX`
    /// tokens.
    #[error("listing exceeds the {max} token index space")]
    TokenIndexOverflow { max: u32 },
}
