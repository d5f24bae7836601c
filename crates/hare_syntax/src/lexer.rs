//! Responsible with converting source text into a token stream

use crate::lexer::token_parsing::{
    is_whitespace, parse_token, parse_token_after_dot, Reason, TokenError,
};
use hare_tokens::spanned::Span;
use hare_tokens::token::{Token, TokenKind};
use nom::Offset;
use thiserror::Error;
use tracing::trace;

mod token_parsing;

/// Responsible with converting source text into a token stream.
///
/// The stream always ends with exactly one [`TokenKind::Eof`] token. Errors do not end the
/// stream: an invalid character is skipped and lexing resumes after it.
#[derive(Debug, Clone)]
pub struct Lexer<'s> {
    src: &'s str,
    offset: usize,
    finished: bool,
    after_dot: bool,
}

impl<'s> Lexer<'s> {
    /// Creates a new lexer over the whole of `src`
    pub fn new(src: &'s str) -> Self {
        Self::starting_at(src, 0)
    }

    /// Creates a lexer that starts at the given byte offset of `src`. The offset is moved forward
    /// to the next character boundary if needed.
    pub fn starting_at(src: &'s str, offset: usize) -> Self {
        let mut offset = offset.min(src.len());
        while !src.is_char_boundary(offset) {
            offset += 1;
        }
        Self {
            src,
            offset,
            finished: false,
            after_dot: false,
        }
    }

    /// The byte offset the next token will be searched for from
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn next_token(&mut self) -> LexResult<Token> {
        let rest = &self.src[self.offset..];
        let parsed = if self.after_dot {
            parse_token_after_dot(rest)
        } else {
            parse_token(rest)
        };
        match parsed {
            Ok((_, (l, len, kind))) => {
                let offset = self.offset + l;
                self.offset = offset + len;
                if kind == TokenKind::Eof {
                    self.finished = true;
                }
                if !kind.is_trivia() {
                    self.after_dot = kind == TokenKind::Dot;
                }
                let token = Token::new(
                    Span::new(offset, len),
                    kind,
                    &self.src[offset..self.offset],
                );
                trace!("lexed {token:?}");
                Ok(token)
            }
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(self.skip_error(rest, e)),
            Err(nom::Err::Incomplete(_)) => {
                let offset = self.offset;
                self.offset = self.src.len();
                Err(LexingError::Unterminated {
                    what: "token",
                    offset,
                })
            }
        }
    }

    /// Moves past whatever caused `error`, returning the error to report
    fn skip_error(&mut self, rest: &'s str, error: TokenError<'s>) -> LexingError {
        match error.reason {
            Reason::Unmatched => {
                let trimmed = rest.trim_start_matches(is_whitespace);
                let offset = self.src.offset(trimmed);
                let char = trimmed.chars().next().unwrap_or_default();
                self.offset = (offset + char.len_utf8()).min(self.src.len());
                LexingError::InvalidChar { char, offset }
            }
            Reason::Unterminated(what) => {
                self.offset = self.src.len();
                LexingError::Unterminated {
                    what,
                    offset: self.src.offset(error.input),
                }
            }
            Reason::InvalidEscape { literal } => {
                self.offset = self.src.offset(literal) + literal.len();
                LexingError::InvalidEscape {
                    offset: self.src.offset(error.input),
                }
            }
            Reason::MalformedRune { literal } => {
                let offset = self.src.offset(literal);
                self.offset = offset + literal.len();
                LexingError::MalformedRune { offset }
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        Some(self.next_token())
    }
}

/// Lexes all of `src`, separating tokens from errors. The last token is always
/// [`TokenKind::Eof`].
pub fn tokenize(src: &str) -> (Vec<Token>, Vec<LexingError>) {
    let mut tokens = vec![];
    let mut errors = vec![];
    for result in Lexer::new(src) {
        match result {
            Ok(token) => tokens.push(token),
            Err(error) => errors.push(error),
        }
    }
    (tokens, errors)
}

pub type LexResult<T> = Result<T, LexingError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexingError {
    #[error("invalid character {char:?}")]
    InvalidChar { char: char, offset: usize },
    #[error("unterminated {what}")]
    Unterminated { what: &'static str, offset: usize },
    #[error("invalid escape sequence")]
    InvalidEscape { offset: usize },
    #[error("rune literal must hold exactly one character")]
    MalformedRune { offset: usize },
}

impl LexingError {
    /// The byte offset this error was found at
    pub fn offset(&self) -> usize {
        match self {
            LexingError::InvalidChar { offset, .. }
            | LexingError::Unterminated { offset, .. }
            | LexingError::InvalidEscape { offset }
            | LexingError::MalformedRune { offset } => *offset,
        }
    }

    /// Unterminated literals swallow the rest of the input, so nothing after them can be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, LexingError::Unterminated { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hare_tokens::spanned::Spanned;
    use test_log::test;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .map(|token| token.map(|t| t.kind().clone()))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| panic!("{e}"))
    }

    #[test]
    fn test_lexer() {
        let test = "def x: int = 1; // done";
        let tokens = match Lexer::new(test).try_fold(
            vec![],
            |mut accum, next| -> Result<Vec<Token>, LexingError> {
                accum.push(next?);
                Ok(accum)
            },
        ) {
            Ok(tokens) => tokens,
            Err(e) => panic!("{} -> {e:#?}", e),
        };
        let texts = tokens.iter().map(|t| t.text()).collect::<Vec<_>>();
        assert_eq!(
            texts,
            ["def", "x", ":", "int", "=", "1", ";", "// done", ""]
        );
        assert_eq!(tokens[1].span(), Span::new(4, 1));
        assert_eq!(tokens.last().map(|t| t.kind()), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_empty_input_has_only_eof() {
        assert_eq!(kinds(""), [TokenKind::Eof]);
        assert_eq!(kinds("  \n\t"), [TokenKind::Eof]);
    }

    #[test]
    fn test_eof_is_last() {
        let mut lexer = Lexer::new("a");
        assert!(matches!(lexer.next(), Some(Ok(_))));
        assert!(matches!(lexer.next(), Some(Ok(ref t)) if t.kind() == &TokenKind::Eof));
        assert!(lexer.next().is_none());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_invalid_char_is_skipped() {
        let (tokens, errors) = tokenize("a $ b");
        assert_eq!(
            errors,
            [LexingError::InvalidChar {
                char: '$',
                offset: 2
            }]
        );
        let kinds = tokens.iter().map(|t| t.kind().clone()).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                TokenKind::Identifier("a".to_string()),
                TokenKind::Identifier("b".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unterminated_consumes_rest() {
        let (tokens, errors) = tokenize("let s = \"abc;\nlet t = 1;");
        assert_eq!(
            errors,
            [LexingError::Unterminated {
                what: "string",
                offset: 8
            }]
        );
        assert!(errors[0].is_fatal());
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3].kind(), &TokenKind::Eof);
    }

    #[test]
    fn test_invalid_escape_skips_literal() {
        let (tokens, errors) = tokenize(r#"x "a\x4" y"#);
        assert_eq!(errors, [LexingError::InvalidEscape { offset: 4 }]);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[1].text(), "y");
    }

    #[test]
    fn test_adjacent_strings_are_separate_tokens() {
        assert_eq!(
            kinds(r#""a" "b""#),
            [
                TokenKind::String("a".to_string()),
                TokenKind::String("b".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_float_vs_integer() {
        let kinds = kinds("10f32 10");
        assert!(matches!(kinds[0], TokenKind::Float(_)));
        assert!(matches!(kinds[1], TokenKind::Integer(_)));
    }

    #[test]
    fn test_tuple_indices_after_dot() {
        let kinds = kinds("t.0.1 1.5");
        assert!(matches!(
            kinds.as_slice(),
            [
                TokenKind::Identifier(_),
                TokenKind::Dot,
                TokenKind::Integer(_),
                TokenKind::Dot,
                TokenKind::Integer(_),
                TokenKind::Float(_),
                TokenKind::Eof
            ]
        ));
    }

    #[test]
    fn test_starting_at() {
        let src = "fn main() void";
        let mut lexer = Lexer::starting_at(src, 3);
        let token = lexer.next().unwrap().unwrap();
        assert_eq!(token.text(), "main");
        assert_eq!(token.span(), Span::new(3, 4));
    }

    #[test]
    fn test_relex_token_text() {
        let src = "export fn f(x: u8...) []*const str = 0x1fu8 + 'a' + `raw` + \"s\\n\";";
        let (tokens, errors) = tokenize(src);
        assert!(errors.is_empty());
        for token in &tokens {
            let (relexed, errors) = tokenize(token.text());
            assert!(errors.is_empty());
            assert_eq!(relexed[0].text(), token.text());
            assert_eq!(relexed[0].kind(), token.kind());
        }
    }
}
