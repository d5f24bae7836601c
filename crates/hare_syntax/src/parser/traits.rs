use crate::parser;
use crate::parser::{SyntacticParser, SyntaxError};
use hare_tokens::token::ToTokens;
use std::any::type_name;
use std::error::Error;

/// Parser for syntax tree items
pub trait Parser<O, E = SyntaxError>: Clone
where
    E: Error,
{
    fn non_terminal(&self) -> &'static str;
    fn parse(&mut self, parser: &mut SyntacticParser<'_>) -> Result<O, parser::Err<E>>;
}

impl<O, E, F> Parser<O, E> for F
where
    F: FnMut(&mut SyntacticParser<'_>) -> Result<O, parser::Err<E>>,
    F: Clone,
    E: Error,
{
    fn non_terminal(&self) -> &'static str {
        type_name::<O>()
    }

    fn parse(&mut self, parser: &mut SyntacticParser<'_>) -> Result<O, parser::Err<E>> {
        (self)(parser)
    }
}

/// Parse a syntax tree part
pub trait Parsable: ToTokens + Sized {
    type Err;

    /// Attempt to parse some syntax tree part
    fn parse(parser: &mut SyntacticParser<'_>) -> Result<Self, parser::Err<Self::Err>>;
}

/// A sub trait that determines if this type could be parsed without doing the parsing
pub trait CouldParse: Parsable {
    /// Checks the lookahead without consuming anything
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, parser::Err<Self::Err>>;
}

impl<P: Parsable + CouldParse> Parsable for Vec<P>
where
    P::Err: Error,
{
    type Err = P::Err;

    fn parse(parser: &mut SyntacticParser<'_>) -> Result<Self, parser::Err<Self::Err>> {
        let mut result = Vec::new();
        while let Some(item) = parser.parse_opt::<P>()? {
            result.push(item);
        }

        Ok(result)
    }
}

impl<P: Parsable + CouldParse> Parsable for Option<P>
where
    P::Err: Error,
{
    type Err = P::Err;

    fn parse(parser: &mut SyntacticParser<'_>) -> Result<Self, parser::Err<Self::Err>> {
        parser.parse_opt::<P>()
    }
}
