//! The error recovering recursive descent parser that builds the syntax tree

use std::fmt::{Display, Formatter};

mod error;
mod syntactic_parser;
mod traits;

pub use error::{ErrorKind, SyntaxError, SyntaxResult};
pub use syntactic_parser::{Boundary, SyntacticParser};
pub use traits::{CouldParse, Parsable, Parser};

/// Parser error, distinguishing errors that allow an alternative to be tried from errors that
/// do not.
#[derive(Debug)]
pub enum Err<E> {
    /// A recoverable error. Backtracking parsers treat this as "did not match".
    Error(E),
    /// An unrecoverable error. Backtracking stops and the error is propagated.
    Failure(E),
}

impl<E> Err<E> {
    /// Converts the contained error
    pub fn convert<E2>(self) -> Err<E2>
    where
        E: Into<E2>,
    {
        match self {
            Err::Error(e) => Err::Error(e.into()),
            Err::Failure(e) => Err::Failure(e.into()),
        }
    }

    /// Gets the contained error, regardless of whether it was recoverable
    pub fn into_inner(self) -> E {
        match self {
            Err::Error(e) | Err::Failure(e) => e,
        }
    }
}

impl<E: Display> Display for Err<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Err::Error(e) => write!(f, "recoverable error: {e}"),
            Err::Failure(e) => write!(f, "unrecoverable error: {e}"),
        }
    }
}

impl<E: std::error::Error> std::error::Error for Err<E> {}

impl From<SyntaxError> for Err<SyntaxError> {
    fn from(value: SyntaxError) -> Self {
        Self::Error(value)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::ParseOptions;
    use test_log::test;

    /// Runs `callback` against a fresh parser over `src`
    pub fn test_parser<F>(src: &str, callback: F)
    where
        F: FnOnce(&mut SyntacticParser<'_>),
    {
        let mut parser = SyntacticParser::new(Lexer::new(src), ParseOptions::default());
        callback(&mut parser);
    }

    #[test]
    fn test_err_display() {
        let error = Err::Error(SyntaxError::from(ErrorKind::UnexpectedEof));
        assert!(error.to_string().starts_with("recoverable error: syntax error: unexpected end of input"));
        let error = Err::Failure(SyntaxError::from(ErrorKind::UnexpectedEof));
        assert!(error.to_string().starts_with("unrecoverable error"));
    }

    #[test]
    fn test_convert_keeps_recoverability() {
        let error: Err<SyntaxError> = Err::Failure(ErrorKind::ParserPoisoned.into());
        let converted: Err<SyntaxError> = error.convert();
        assert!(matches!(converted, Err::Failure(_)));
    }
}
