//! The backtracking parser that drives every [Parser]

use crate::lexer::Lexer;
use crate::parser;
use crate::parser::{CouldParse, ErrorKind, Parsable, Parser, SyntaxError, SyntaxResult};
use crate::{Error, ParseOptions};
use hare_tokens::spanned::{Span, Spanned};
use hare_tokens::token::{Token, TokenKind};
use std::collections::VecDeque;
use std::result;
use tracing::{debug, trace};

#[derive(Debug, Default)]
enum State {
    #[default]
    Uninit,
    Lookahead(Token),
    Buffered(VecDeque<Token>),
    Eof,
    Poisoned,
}

#[derive(Debug, Default)]
struct StateFrame {
    used: VecDeque<Token>,
    pending: Vec<SyntaxError>,
    non_terminals_prev: Vec<&'static str>,
    last_span_prev: Option<Span>,
}

/// Where [SyntacticParser::recover] stops skipping tokens after an error
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Boundary {
    /// Inside a block. An unmatched `}` closes the block, so skipping stops before it.
    Block,
    /// At the top level of a module, where an unmatched `}` is skipped like any other token.
    Module,
}

/// Creates the syntax tree from a token stream.
///
/// Comments never reach the grammar: they are collected on the side, as are lexing errors. A
/// parser that fails is backtracked with [try_parse](Self::try_parse), or resynchronized with
/// [recover](Self::recover) so that parsing can continue past the error.
///
/// # Examples
/// ```
/// # use hare_syntax::lexer::Lexer;
/// # use hare_syntax::parser::SyntacticParser;
/// let lexer = Lexer::new("use fmt;");
/// let parser = SyntacticParser::from(lexer);
/// ```
#[derive(Debug)]
pub struct SyntacticParser<'s> {
    lexer: Lexer<'s>,
    state: State,
    last_span: Option<Span>,
    frames: Vec<StateFrame>,
    non_terminals: Vec<&'static str>,
    options: ParseOptions,
    comments: Vec<Token>,
    errors: Vec<Error>,
    aborted: bool,
}

impl<'s> SyntacticParser<'s> {
    /// Creates a new parser with a given lexer
    pub fn new(lexer: Lexer<'s>, options: ParseOptions) -> Self {
        Self {
            lexer,
            state: Default::default(),
            last_span: None,
            frames: vec![],
            non_terminals: vec![],
            options,
            comments: vec![],
            errors: vec![],
            aborted: false,
        }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Pulls the next significant token from the lexer
    fn lex_next(&mut self) -> Option<Token> {
        loop {
            match self.lexer.next()? {
                Ok(token) if token.kind().is_trivia() => self.comments.push(token),
                Ok(token) => return Some(token),
                Err(error) => {
                    debug!(offset = error.offset(), "lexing error: {error}");
                    if error.is_fatal() {
                        self.aborted = true;
                    }
                    if !self.limit_reached() {
                        self.errors.push(error.into());
                    }
                }
            }
        }
    }

    fn next_token(&mut self) {
        self.state = match self.lex_next() {
            None => State::Eof,
            Some(token) => State::Lookahead(token),
        };
    }

    /// peek the current lookahead
    pub fn peek(&mut self) -> SyntaxResult<Option<&Token>> {
        if matches!(self.state, State::Uninit) {
            self.next_token();
        }
        match &self.state {
            State::Lookahead(tok) => Ok(Some(tok)),
            State::Uninit => {
                unreachable!("next_token() should init parser")
            }
            State::Eof => Ok(None),
            State::Poisoned => Err(self.error(ErrorKind::ParserPoisoned, None)),
            State::Buffered(buf) => Ok(buf.front()),
        }
    }

    /// peek `n` tokens past the current lookahead
    pub fn peek_nth(&mut self, n: usize) -> SyntaxResult<Option<&Token>> {
        if n == 0 {
            return self.peek();
        }
        if matches!(self.state, State::Uninit) {
            self.next_token();
        }
        let mut buffer = match std::mem::replace(&mut self.state, State::Poisoned) {
            State::Lookahead(tok) => VecDeque::from([tok]),
            State::Buffered(buffer) => buffer,
            State::Uninit => {
                unreachable!("next_token() should init parser")
            }
            State::Eof => {
                self.state = State::Eof;
                return Ok(None);
            }
            State::Poisoned => return Err(self.error(ErrorKind::ParserPoisoned, None)),
        };
        while buffer.len() <= n {
            match self.lex_next() {
                Some(token) => buffer.push_back(token),
                None => break,
            }
        }
        self.state = State::Buffered(buffer);
        match &self.state {
            State::Buffered(buf) => Ok(buf.get(n)),
            _ => Ok(None),
        }
    }

    /// Checks the kind of the token `n` tokens past the current lookahead
    pub fn nth_matches<F>(&mut self, n: usize, predicate: F) -> SyntaxResult<bool>
    where
        F: FnOnce(&TokenKind) -> bool,
    {
        Ok(self.peek_nth(n)?.is_some_and(|token| predicate(token.kind())))
    }

    pub fn nth_is(&mut self, n: usize, kind: &TokenKind) -> SyntaxResult<bool> {
        self.nth_matches(n, |found| found == kind)
    }

    /// Checks if the lookahead is of the given kind
    pub fn next_is(&mut self, kind: &TokenKind) -> SyntaxResult<bool> {
        self.nth_is(0, kind)
    }

    /// Gets if the only thing left is the end of input
    pub fn at_eof(&mut self) -> SyntaxResult<bool> {
        Ok(self
            .peek()?
            .map_or(true, |token| token.kind() == &TokenKind::Eof))
    }

    pub fn consume(&mut self) -> SyntaxResult<Option<Token>> {
        if matches!(self.state, State::Uninit) {
            self.next_token();
        }
        trace!("starting consume, state={:?}", self.state);
        let swapped = std::mem::replace(&mut self.state, State::Poisoned);
        let token = match swapped {
            State::Uninit => {
                unreachable!("next_token() should init parser")
            }
            State::Buffered(mut buffer) => {
                let token = buffer.pop_front();
                if buffer.is_empty() {
                    self.next_token();
                } else {
                    self.state = State::Buffered(buffer);
                }
                token
            }
            State::Lookahead(token) => {
                self.next_token();
                Some(token)
            }
            State::Eof => {
                self.state = State::Eof;
                None
            }
            State::Poisoned => return Err(self.error(ErrorKind::ParserPoisoned, None)),
        };
        if let Some(token) = &token {
            trace!("consumed {token:?}, state ={:?}", self.state);
            if let Some(state_frame) = self.state_frame_mut() {
                state_frame.used.push_back(token.clone());
            }
            self.last_span = Some(token.span());
        }
        Ok(token)
    }

    /// consumes if predicate matches
    pub fn consume_if<F>(&mut self, predicate: F) -> SyntaxResult<Option<Token>>
    where
        F: FnOnce(&Token) -> bool,
    {
        let should_consume = {
            let peek = self.peek()?;
            if let Some(peek) = peek {
                predicate(peek)
            } else {
                false
            }
        };
        if should_consume {
            self.consume()
        } else {
            Ok(None)
        }
    }

    fn state_frame_mut(&mut self) -> Option<&mut StateFrame> {
        self.frames.last_mut()
    }

    fn push_backtrack_frame(&mut self) {
        self.frames.push(StateFrame {
            non_terminals_prev: self.non_terminals.clone(),
            last_span_prev: self.last_span,
            ..Default::default()
        })
    }

    fn pop_backtrack_frame(&mut self) -> Option<StateFrame> {
        self.frames.pop()
    }

    /// Wrapper function for parsing an item
    #[inline]
    pub fn parse<O, E, P: Parser<O, E>>(&mut self, mut parser: P) -> Result<O, parser::Err<E>>
    where
        E: std::error::Error,
    {
        trace!(
            "starting parsing {} state={:?}",
            parser.non_terminal(),
            self.state
        );
        self.non_terminals.push(parser.non_terminal());
        let r = parser.parse(self);
        trace!(
            "after parsing {} state={:?}",
            parser.non_terminal(),
            self.state
        );
        if r.is_ok() {
            self.non_terminals.pop();
        }
        r
    }

    /// Wrapper function for parsing an optional item
    pub fn parse_opt<P: Parsable<Err: std::error::Error> + CouldParse>(
        &mut self,
    ) -> Result<Option<P>, parser::Err<P::Err>> {
        if P::could_parse(self)? {
            Ok(Some(self.parse(P::parse)?))
        } else {
            Ok(None)
        }
    }

    /// Tries to run a parser, backtracking if an errors occurs within the parser.
    ///
    /// returns `Ok(Some(parsed))` on success, `Ok(None)` on `Err::Error(_)` and `Err(e)` on `Err::Failure(e)`.
    pub fn try_parse<O, E: std::error::Error, P: Parser<O, E>>(
        &mut self,
        mut parser: P,
    ) -> result::Result<Option<O>, E> {
        trace!(
            "({}) starting backtracking parse with state at {:?}",
            self.frames.len(),
            self.state
        );
        self.push_backtrack_frame();
        let result = parser.parse(self);
        let pop = self.pop_backtrack_frame().unwrap_or_default();
        match result {
            Ok(ok) => {
                self.commit_frame(pop);
                Ok(Some(ok))
            }
            Err(parser::Err::Error(e)) => {
                self.apply_frame(pop, e);
                Ok(None)
            }
            Err(parser::Err::Failure(e)) => Err(e),
        }
    }

    /// Hands what a successful backtracking frame used to the frame around it
    fn commit_frame(&mut self, frame: StateFrame) {
        match self.state_frame_mut() {
            Some(outer) => {
                outer.used.extend(frame.used);
                outer.pending.extend(frame.pending);
            }
            None => {
                for error in frame.pending {
                    self.report(error);
                }
            }
        }
    }

    fn apply_frame<E: std::error::Error>(&mut self, pop: StateFrame, e: E) {
        let state = std::mem::replace(&mut self.state, State::Poisoned);
        trace!(
            "({}) error occurred while state={state:?} -> {e:?}",
            self.frames.len()
        );
        let mut v = pop.used;
        let next_state = match state {
            State::Buffered(buffered) => {
                v.extend(buffered);
                State::Buffered(v)
            }
            State::Lookahead(tok) if v.is_empty() => State::Lookahead(tok),
            State::Lookahead(tok) => {
                v.push_back(tok);
                State::Buffered(v)
            }
            State::Eof if v.is_empty() => State::Eof,
            State::Eof => State::Buffered(v),
            State::Uninit if v.is_empty() => State::Uninit,
            _ => State::Poisoned,
        };
        self.state = next_state;
        trace!(
            "({}) after backtrack state={:?}",
            self.frames.len(),
            self.state
        );
        self.non_terminals = pop.non_terminals_prev;
        self.last_span = pop.last_span_prev;
    }

    /// Runs `parser`, and if it fails records the error and skips ahead to a point where parsing
    /// can resume.
    ///
    /// Skipping stops after the next `;` outside any braces, or at the end of input. At a
    /// [Boundary::Block] it also stops before a `}` that closes the enclosing block. Within a
    /// [try_parse](Self::try_parse) nothing is recorded and the error is propagated instead.
    pub fn recover<O, P: Parser<O>>(
        &mut self,
        parser: P,
        boundary: Boundary,
    ) -> SyntaxResult<Option<O>> {
        let non_terminals = self.non_terminals.len();
        let start = self.position()?;
        match self.parse(parser) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) if !self.frames.is_empty() => Err(e),
            Err(e) => {
                let error = e.into_inner();
                self.non_terminals.truncate(non_terminals);
                self.report(error);
                if self.should_stop() {
                    return Ok(None);
                }
                self.synchronize(boundary)?;
                let stuck = self.position()? == start
                    && !self.at_eof()?
                    && !(boundary == Boundary::Block && self.next_is(&TokenKind::RCurly)?);
                if stuck {
                    self.consume()?;
                }
                Ok(None)
            }
        }
    }

    fn position(&mut self) -> SyntaxResult<Option<usize>> {
        Ok(self.peek()?.map(|token| token.span().offset()))
    }

    fn synchronize(&mut self, boundary: Boundary) -> SyntaxResult<()> {
        let mut depth = 0_usize;
        while let Some(kind) = self.peek()?.map(|token| token.kind().clone()) {
            match kind {
                TokenKind::Eof => break,
                TokenKind::SemiColon if depth == 0 => {
                    self.consume()?;
                    break;
                }
                TokenKind::LCurly => depth += 1,
                TokenKind::RCurly if depth > 0 => depth -= 1,
                TokenKind::RCurly if boundary == Boundary::Block => break,
                _ => {}
            }
            self.consume()?;
        }
        debug!("resynchronized at {:?}", self.position()?);
        Ok(())
    }

    /// Records an error that does not stop the current parser
    pub fn report(&mut self, error: SyntaxError) {
        if let Some(frame) = self.state_frame_mut() {
            frame.pending.push(error);
            return;
        }
        if self.should_stop() {
            trace!("dropping error {error}");
            return;
        }
        debug!(offset = error.offset(), "syntax error: {}", error.kind());
        self.errors.push(error.into());
    }

    fn limit_reached(&self) -> bool {
        self.options
            .max_errors()
            .is_some_and(|max| self.errors.len() >= max)
    }

    /// Whether no more errors will be recorded, in which case parsing should wind down
    pub fn should_stop(&self) -> bool {
        self.aborted || self.limit_reached() || (!self.options.recover() && !self.errors.is_empty())
    }

    /// Consumes everything up to, but not including, the end of input token
    pub fn skip_to_eof(&mut self) -> SyntaxResult<()> {
        while !self.at_eof()? {
            self.consume()?;
        }
        Ok(())
    }

    /// Creates an error located at the lookahead, or right after the last consumed token
    pub fn error<E1, E2>(&self, error: E1, cause: E2) -> parser::Err<SyntaxError>
    where
        E1: Into<ErrorKind>,
        E2: Into<Option<SyntaxError>>,
    {
        let span = match &self.state {
            State::Lookahead(t) => Some(t.span()),
            State::Buffered(vec) => vec.front().map(|t| t.span()),
            _ => None,
        }
        .or(self.last_span.map(|s| s.end()));
        parser::Err::Error(SyntaxError::new(
            error.into(),
            span,
            cause,
            self.non_terminals.clone(),
        ))
    }

    pub fn error_with_span<E1, E2>(
        &self,
        error: E1,
        cause: E2,
        span: Span,
    ) -> parser::Err<SyntaxError>
    where
        E1: Into<ErrorKind>,
        E2: Into<Option<SyntaxError>>,
    {
        parser::Err::Error(SyntaxError::new(
            error.into(),
            span,
            cause,
            self.non_terminals.clone(),
        ))
    }

    /// Creates an error saying one of `expected` should have been found instead of the lookahead
    pub fn expected<I>(&mut self, expected: I) -> parser::Err<SyntaxError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let found = match self.peek() {
            Ok(found) => found.cloned(),
            Err(e) => return e,
        };
        self.error(ErrorKind::expected_token(expected, found), None)
    }

    /// The comments skipped so far
    pub fn comments(&self) -> &[Token] {
        &self.comments
    }

    /// Finishes parsing, returning the comments and errors collected along the way
    pub fn finish(self) -> (Vec<Token>, Vec<Error>) {
        (self.comments, self.errors)
    }
}

impl<'s> From<Lexer<'s>> for SyntacticParser<'s> {
    fn from(value: Lexer<'s>) -> Self {
        Self::new(value, ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use crate::syntax_tree::singletons::{Comma, SemiC};
    use test_log::test;

    fn texts(parser: &mut SyntacticParser<'_>) -> Vec<String> {
        let mut texts = vec![];
        while let Some(token) = parser.consume().unwrap() {
            texts.push(token.text().to_string());
        }
        texts
    }

    #[test]
    fn test_comments_are_set_aside() {
        test_parser("a // one\nb // two\n", |parser| {
            assert_eq!(texts(parser), ["a", "b", ""]);
            let comments = parser.comments().iter().map(|c| c.text()).collect::<Vec<_>>();
            assert_eq!(comments, ["// one", "// two"]);
        });
    }

    #[test]
    fn test_peek_nth() {
        test_parser("a b c", |parser| {
            assert_eq!(parser.peek_nth(2).unwrap().map(|t| t.text()), Some("c"));
            assert_eq!(parser.peek().unwrap().map(|t| t.text()), Some("a"));
            assert!(parser.nth_is(3, &TokenKind::Eof).unwrap());
            assert!(parser.peek_nth(4).unwrap().is_none());
            assert_eq!(texts(parser), ["a", "b", "c", ""]);
        });
    }

    #[test]
    fn test_try_parse_backtracks() {
        test_parser("a , ;", |parser| {
            let parsed = parser
                .try_parse(|parser: &mut SyntacticParser<'_>| {
                    parser.consume()?;
                    parser.parse(Comma::parse)?;
                    parser.parse(Comma::parse)
                })
                .unwrap();
            assert!(parsed.is_none());
            assert_eq!(parser.peek().unwrap().map(|t| t.text()), Some("a"));
            assert_eq!(texts(parser), ["a", ",", ";", ""]);
        });
    }

    #[test]
    fn test_nested_try_parse_backtracks_fully() {
        test_parser("a , ;", |parser| {
            let parsed = parser
                .try_parse(|parser: &mut SyntacticParser<'_>| {
                    parser.consume()?;
                    let comma = parser.try_parse(Comma::parse).map_err(parser::Err::Failure)?;
                    assert!(comma.is_some());
                    parser.parse(Comma::parse)
                })
                .unwrap();
            assert!(parsed.is_none());
            assert_eq!(texts(parser), ["a", ",", ";", ""]);
        });
    }

    #[test]
    fn test_failure_is_not_backtracked() {
        test_parser("a", |parser| {
            let result = parser.try_parse(|parser: &mut SyntacticParser<'_>| -> SyntaxResult<()> {
                Err(parser::Err::Failure(ErrorKind::Custom("stop").into()))
            });
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_recover_skips_to_semicolon() {
        let mut parser = SyntacticParser::from(Lexer::new("x y z; w"));
        let parsed = parser.recover(Comma::parse, Boundary::Module).unwrap();
        assert!(parsed.is_none());
        assert_eq!(parser.peek().unwrap().map(|t| t.text()), Some("w"));
        let (_, errors) = parser.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].offset(), 0);
    }

    #[test]
    fn test_recover_in_block_stops_at_closing_brace() {
        test_parser("x { ; } y } z", |parser| {
            assert!(parser.recover(SemiC::parse, Boundary::Block).unwrap().is_none());
            assert_eq!(parser.peek().unwrap().map(|t| t.text()), Some("}"));
            assert_eq!(parser.peek().unwrap().map(|t| t.span().offset()), Some(10));
        });
    }

    #[test]
    fn test_recover_always_makes_progress() {
        test_parser("} ;", |parser| {
            assert!(parser.recover(Comma::parse, Boundary::Module).unwrap().is_none());
            assert!(parser.at_eof().unwrap());
        });
    }

    #[test]
    fn test_no_recover_stops_after_first_error() {
        let mut parser =
            SyntacticParser::new(Lexer::new(", x; y; z"), ParseOptions::default().with_recover(false));
        assert!(parser.recover(SemiC::parse, Boundary::Module).unwrap().is_none());
        assert!(parser.should_stop());
        parser.report(ErrorKind::Custom("ignored").into());
        let (_, errors) = parser.finish();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_max_errors() {
        let mut parser = SyntacticParser::new(
            Lexer::new("$ $ $ x"),
            ParseOptions::default().with_max_errors(2),
        );
        assert_eq!(parser.peek().unwrap().map(|t| t.text()), Some("x"));
        assert!(parser.should_stop());
        let (_, errors) = parser.finish();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_error_after_last_token() {
        test_parser("x", |parser| {
            parser.consume().unwrap();
            parser.consume().unwrap();
            let error = parser.error(ErrorKind::UnexpectedEof, None).into_inner();
            assert_eq!(error.offset(), 1);
        });
    }
}
