use hare_tokens::spanned::Span;
use hare_tokens::token::Token;
use hare_tokens::SpannedError;
use std::fmt::{Display, Formatter};

/// Represents an error occurring during parsing
#[derive(Debug, thiserror::Error)]
pub struct SyntaxError {
    pub kind: SpannedError<ErrorKind, SyntaxError>,
    pub non_terminal_stack: Option<Vec<&'static str>>,
}

impl SyntaxError {
    /// Creates a new error
    pub fn new(
        kind: ErrorKind,
        location: impl Into<Option<Span>>,
        cause: impl Into<Option<Self>>,
        non_terminals: impl Into<Option<Vec<&'static str>>>,
    ) -> Self {
        Self {
            kind: SpannedError::new(kind, location, cause),
            non_terminal_stack: non_terminals.into(),
        }
    }

    /// What went wrong
    pub fn kind(&self) -> &ErrorKind {
        self.kind.error()
    }

    pub fn span(&self) -> Option<Span> {
        self.kind.location()
    }

    /// The byte offset this error was reported at
    pub fn offset(&self) -> usize {
        self.span().map(|span| span.offset()).unwrap_or_default()
    }

    /// The descriptions of what would have been accepted here, if this error is about an
    /// unexpected token
    pub fn expected(&self) -> &[String] {
        match self.kind() {
            ErrorKind::ExpectedToken(expected, _) => expected,
            _ => &[],
        }
    }

    /// The token found instead of what was expected
    pub fn found(&self) -> Option<&Token> {
        match self.kind() {
            ErrorKind::ExpectedToken(_, found) => found.as_ref(),
            _ => None,
        }
    }

    /// The non terminals being parsed when the error occurred, outermost first
    pub fn non_terminals(&self) -> &[&'static str] {
        self.non_terminal_stack.as_deref().unwrap_or_default()
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "syntax error: {}", self.kind)?;
        if let Some(non_terminals) = &self.non_terminal_stack {
            writeln!(f, "non terminal stack:")?;
            for (idx, non_terminal) in non_terminals.iter().enumerate() {
                writeln!(f, "  {}: {}", idx, non_terminal)?;
            }
        }

        Ok(())
    }
}

impl From<ErrorKind> for SyntaxError {
    fn from(value: ErrorKind) -> Self {
        Self::new(value, None, None, None)
    }
}

/// [SyntaxError] kind
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("expected {}, found {}", .0.join(" or "), found_description(.1))]
    ExpectedToken(Vec<String>, Option<Token>),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("attempting to continue parsing but parser was poisoned")]
    ParserPoisoned,
    #[error("a variadic parameter must be the last parameter")]
    MisplacedVariadic,
    #[error("{0}")]
    Custom(&'static str),
}

fn found_description(found: &Option<Token>) -> String {
    match found {
        None => "end of input".to_string(),
        Some(token) if token.text().is_empty() => token.kind().to_string(),
        Some(token) => format!("{:?}", token.text()),
    }
}

impl ErrorKind {
    pub fn expected_token(
        token_kinds: impl IntoIterator<Item = impl AsRef<str>>,
        found: impl Into<Option<Token>>,
    ) -> Self {
        Self::ExpectedToken(
            token_kinds
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
            found.into(),
        )
    }
}

pub type SyntaxResult<T = ()> = std::result::Result<T, super::Err<SyntaxError>>;

#[cfg(test)]
mod tests {
    use super::*;
    use hare_tokens::token::TokenKind;
    use test_log::test;

    #[test]
    fn test_expected_token_message() {
        let found = Token::new(Span::new(5, 1), TokenKind::Colon, ":");
        let error = SyntaxError::new(
            ErrorKind::expected_token(["identifier", "_"], found),
            Span::new(5, 1),
            None,
            vec!["parameter"],
        );
        assert_eq!(error.offset(), 5);
        assert_eq!(error.expected(), ["identifier", "_"]);
        assert_eq!(error.found().map(|t| t.text()), Some(":"));
        let message = error.to_string();
        assert!(message.starts_with("syntax error: expected identifier or _, found \":\" (at byte 5)"));
        assert!(message.contains("  0: parameter"));
    }

    #[test]
    fn test_found_eof() {
        let eof = Token::new(Span::new(3, 0), TokenKind::Eof, "");
        let kind = ErrorKind::expected_token([";"], eof);
        assert_eq!(kind.to_string(), "expected ;, found end of input");
    }
}
