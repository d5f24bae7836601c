#![doc = include_str!("../README.md")]

use crate::lexer::{Lexer, LexingError};
use crate::parser::{Parsable, SyntacticParser, SyntaxError};
use crate::syntax_tree::Module;
use hare_tokens::spanned::Span;
use hare_tokens::token::Token;
use hare_tokens::SpannedError;
use std::convert::Infallible;
use tracing::{debug, instrument};

pub mod lexer;
pub mod parser;
pub mod syntax_tree;
pub mod tree;

/// Options controlling how a parse behaves once it encounters errors
#[derive(Debug, Clone)]
pub struct ParseOptions {
    recover: bool,
    max_errors: Option<usize>,
    validate_variadics: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recover: true,
            max_errors: None,
            validate_variadics: false,
        }
    }
}

impl ParseOptions {
    /// When disabled, parsing stops at the first error
    pub fn with_recover(mut self, recover: bool) -> Self {
        self.recover = recover;
        self
    }

    /// Stops collecting errors, and parsing, once this many have been found
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Reports a variadic parameter that is not the last parameter as an error
    pub fn with_validate_variadics(mut self, validate: bool) -> Self {
        self.validate_variadics = validate;
        self
    }

    pub fn recover(&self) -> bool {
        self.recover
    }

    pub fn max_errors(&self) -> Option<usize> {
        self.max_errors
    }

    pub fn validate_variadics(&self) -> bool {
        self.validate_variadics
    }
}

/// Any error found while parsing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexingError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl Error {
    /// The byte offset the error was found at
    pub fn offset(&self) -> usize {
        match self {
            Error::Lex(e) => e.offset(),
            Error::Syntax(e) => e.offset(),
        }
    }

    /// Renders this error with the lines of `src` around it, labeled with `name`
    pub fn render(&self, name: &str, src: &str) -> String {
        match self {
            Error::Lex(e) => {
                let spanned =
                    SpannedError::<_, Infallible>::new(e, Span::new(e.offset(), 1), None);
                spanned.with_source(name, src).to_string()
            }
            Error::Syntax(e) => e.kind.with_source(name, src).to_string(),
        }
    }
}

/// The result of parsing a module. There is always a tree, even when there are errors.
#[derive(Debug)]
pub struct ParseOutput {
    pub module: Module,
    /// Every comment in the source, in order
    pub comments: Vec<Token>,
    /// Every error in the source, ordered by offset
    pub errors: Vec<Error>,
}

impl ParseOutput {
    /// Whether the source parsed without any errors
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses a complete source file with the default options
pub fn parse(src: &str) -> ParseOutput {
    parse_with(src, ParseOptions::default())
}

/// Parses a complete source file
#[instrument(skip(src), fields(len = src.len()))]
pub fn parse_with(src: &str, options: ParseOptions) -> ParseOutput {
    let mut parser = SyntacticParser::new(Lexer::new(src), options);
    let module = match parser.parse(Module::parse) {
        Ok(module) => module,
        Err(e) => {
            parser.report(e.into_inner());
            Module::empty(src.len())
        }
    };
    let (comments, mut errors) = parser.finish();
    errors.sort_by_key(Error::offset);
    debug!(
        "parsed {} declarations with {} errors",
        module.declarations.len(),
        errors.len()
    );
    ParseOutput {
        module,
        comments,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_parse_empty() {
        let output = parse("");
        assert!(output.is_ok());
        assert!(output.module.imports.is_empty());
        assert!(output.module.declarations.is_empty());
    }

    #[test]
    fn test_errors_are_ordered() {
        let output = parse("def x: int = $;\nfn f( : int) void;\n");
        let offsets = output.errors.iter().map(Error::offset).collect::<Vec<_>>();
        let mut sorted = offsets.clone();
        sorted.sort();
        assert_eq!(offsets, sorted);
        assert!(matches!(output.errors[0], Error::Lex(_)));
    }

    #[test]
    fn test_render_error() {
        let src = "use fmt;\nfn f( : int) void;\n";
        let output = parse(src);
        let rendered = output.errors[0].render("main.ha", src);
        assert!(rendered.contains("main.ha:2:7"), "{rendered}");
        assert!(rendered.contains("2 | fn f( : int) void;"), "{rendered}");
    }

    #[test]
    fn test_options() {
        let options = ParseOptions::default()
            .with_recover(false)
            .with_max_errors(3)
            .with_validate_variadics(true);
        assert!(!options.recover());
        assert_eq!(options.max_errors(), Some(3));
        assert!(options.validate_variadics());
    }
}
