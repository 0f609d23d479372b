use thiserror::Error;

/// Upper bound on a rendered error message. Only the word-too-long
/// excerpt can approach it; the excerpt is truncated so the whole
/// message fits on one terminal line.
pub const ERRMSG_BYTES: usize = 163;

/// Everything that can go wrong between argument parsing and the last
/// output line. A failing paragraph terminates the run; output produced
/// for earlier paragraphs is kept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParError {
    /// Unrecognized option letter, out-of-range number, or malformed chain.
    #[error("bad option: {0}")]
    BadArgument(String),

    /// Malformed charset literal in a B/P/Q option or environment variable.
    #[error("bad character set: {0}")]
    BadCharset(String),

    /// A paragraph line is shorter than the resolved prefix plus suffix.
    #[error("line {line} of paragraph is too short: {len} bytes for prefix {prefix} plus suffix {suffix}")]
    LineTooShort {
        line: usize,
        len: usize,
        prefix: usize,
        suffix: usize,
    },

    /// The affixes leave no room for any body text.
    #[error("prefix ({prefix}) plus suffix ({suffix}) must total less than width ({width})")]
    WidthTooSmall {
        prefix: usize,
        suffix: usize,
        width: usize,
    },

    /// A word exceeds the body width and splitting was not requested.
    #[error("Word too long: {0}...")]
    WordTooLong(String),

    /// No arrangement of line breaks can fill every line exactly.
    #[error("Cannot justify.")]
    CannotJustify,

    /// The break optimizer reached a state its invariants forbid.
    #[error("impossible line-break state")]
    Impossibility,
}

impl ParError {
    /// Build a word-too-long error whose excerpt keeps the full message
    /// within [`ERRMSG_BYTES`].
    pub fn word_too_long(word: &[u8]) -> Self {
        const FRAME: usize = "Word too long: ...".len();
        let max = ERRMSG_BYTES - FRAME - 1;
        let cut = word.len().min(max);
        ParError::WordTooLong(String::from_utf8_lossy(&word[..cut]).into_owned())
    }
}
