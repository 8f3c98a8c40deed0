//! Errors for translation.

use query_engine_sql::sql::Kind;

/// A parameter could not be turned into wire text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("parameter ${position} has kind '{kind}', which cannot be sent to the database")]
    UnsupportedParameter { position: usize, kind: Kind },
    #[error("parameter ${position} is invalid and cannot be sent as a value or as null")]
    InvalidParameter { position: usize },
}

/// A server array literal could not be split into elements.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayLiteralError {
    #[error("array literal must start with '{{'")]
    MissingOpeningBrace,
    #[error("malformed dimension decoration")]
    MalformedDimensions,
    #[error("array literal ended unexpectedly")]
    UnexpectedEnd,
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("unterminated quoted element starting at offset {offset}")]
    UnterminatedQuote { offset: usize },
    #[error("trailing characters after the closing brace")]
    TrailingCharacters,
}
