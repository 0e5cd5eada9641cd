use crate::{MidiError, VstError, param::Delimiter};
use thiserror::Error;

#[doc = r#"
A set of errors that can occur while reading text into a [`Node`](crate::Node) tree
"#]
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Reading at line {line}, column {column}: {kind}")]
pub struct ReaderError {
    line: usize,
    column: usize,
    pub(crate) kind: ReaderErrorKind,
}

/// A kind of error that a reader can produce
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReaderErrorKind {
    /// The input holds nothing but whitespace
    #[error("No node found")]
    Empty,
    /// The input ended while a block was open. Reported at its opening line.
    #[error("Block <{0} is never closed")]
    UnterminatedBlock(String),
    /// A `>` with no open block
    #[error("Unexpected '>' without an open block")]
    UnexpectedClose,
    /// Something other than whitespace follows a `>`
    #[error("Unexpected content after '>'")]
    TrailingGarbage,
    /// A `<` not followed by a token
    #[error("Expected a token after '<'")]
    MissingToken,
    /// A quoted parameter without its closing delimiter
    #[error("Missing closing {} for quoted string", .0.as_char())]
    UnterminatedString(Delimiter),
    /// Two parameters not separated by whitespace
    #[error("Expected whitespace between parameters")]
    MissingSeparator,
    /// A numeric start rule was given something else
    #[error("Invalid number {0:?}")]
    InvalidNumber(String),
    /// Content after the root node, or after a single value
    #[error("Unexpected content after the end of the input")]
    TrailingContent,
    /// A `|` line outside any block
    #[error("'|' line outside a block")]
    StrayPipe,
    /// A `VST` body that does not decode
    #[error("Plugin: {0}")]
    Vst(#[from] VstError),
    /// A `SOURCE MIDI` block with malformed events
    #[error("MIDI source: {0}")]
    Midi(#[from] MidiError),
}

impl ReaderError {
    /// Create a reader error from a 1-based line and column and a kind
    pub const fn new(line: usize, column: usize, kind: ReaderErrorKind) -> Self {
        Self { line, column, kind }
    }
    /// True if the input ended too early
    pub const fn is_unterminated(&self) -> bool {
        matches!(
            self.kind,
            ReaderErrorKind::UnterminatedBlock(_) | ReaderErrorKind::UnterminatedString(_)
        )
    }
    /// Returns the error kind of the reader.
    pub fn error_kind(&self) -> &ReaderErrorKind {
        &self.kind
    }
    /// Returns the 1-based line where the error occurred.
    pub fn line(&self) -> usize {
        self.line
    }
    /// Returns the 1-based column where the error occurred.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// The Read Result type (see [`ReaderError`])
pub type ReadResult<T> = Result<T, ReaderError>;
