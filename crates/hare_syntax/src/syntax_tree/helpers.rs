use crate::parser::{CouldParse, Err, Parsable, Parser, SyntacticParser, SyntaxError, SyntaxResult};
use hare_tokens::token::{ToTokens, TokenKind, TokenStream};
use std::error::Error;

pub trait Punctuated<T> {
    /// Gets the items in this
    fn items(&self) -> Vec<&T>;

    /// Converts this into just its items, losing all punctuation
    fn into_items(self) -> Vec<T>
    where
        Self: Sized;
}

/// One or more items separated by punctuation, without a trailing separator
#[derive(Debug, Clone)]
pub struct Punctuated1<T, P> {
    pub punctuated: Vec<(T, Option<P>)>,
}

impl<T, P> Punctuated<T> for Punctuated1<T, P> {
    fn items(&self) -> Vec<&T> {
        self.punctuated.iter().map(|i| &i.0).collect()
    }

    fn into_items(self) -> Vec<T>
    where
        Self: Sized,
    {
        self.punctuated.into_iter().map(|i| i.0).collect()
    }
}

impl<T, P> ToTokens for Punctuated1<T, P>
where
    T: ToTokens,
    P: ToTokens,
{
    fn to_tokens(&self) -> TokenStream {
        self.punctuated
            .iter()
            .flat_map(|(item, punc)| item.to_tokens().chain(punc.iter().flat_map(|i| i.to_tokens())))
            .collect()
    }
}

impl<T, P> TryFrom<Vec<(T, Option<P>)>> for Punctuated1<T, P> {
    type Error = &'static str;

    fn try_from(value: Vec<(T, Option<P>)>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err("can not be empty")
        } else {
            Ok(Punctuated1 { punctuated: value })
        }
    }
}

impl<T, P> Punctuated1<T, P>
where
    P: Parsable + CouldParse,
    P::Err: Error,
{
    /// Parses items with `item` for as long as each is followed by a separator
    pub fn parse_with<I>(parser: &mut SyntacticParser<'_>, item: I) -> Result<Self, Err<P::Err>>
    where
        I: Parser<T, P::Err>,
    {
        let mut vec = vec![];
        loop {
            let v = parser.parse(item.clone())?;
            if P::could_parse(parser)? {
                let punc = parser.parse(P::parse)?;
                vec.push((v, Some(punc)));
            } else {
                vec.push((v, None));
                break;
            }
        }
        Ok(Punctuated1 { punctuated: vec })
    }
}

impl<T, P> Parsable for Punctuated1<T, P>
where
    T: Parsable<Err = P::Err>,
    P: Parsable + CouldParse,
    P::Err: Error,
{
    type Err = T::Err;

    fn parse(parser: &mut SyntacticParser<'_>) -> Result<Self, Err<T::Err>> {
        Self::parse_with(parser, T::parse)
    }
}

/// Zero or more items separated by punctuation, possibly with a trailing separator
#[derive(Debug, Clone)]
pub struct Punctuated0<T, P> {
    pub punctuated: Vec<(T, Option<P>)>,
}

impl<T, P> Punctuated0<T, P> {
    pub fn is_empty(&self) -> bool {
        self.punctuated.is_empty()
    }

    pub fn len(&self) -> usize {
        self.punctuated.len()
    }
}

impl<T, P> Punctuated<T> for Punctuated0<T, P> {
    fn items(&self) -> Vec<&T> {
        self.punctuated.iter().map(|i| &i.0).collect()
    }

    fn into_items(self) -> Vec<T>
    where
        Self: Sized,
    {
        self.punctuated.into_iter().map(|i| i.0).collect()
    }
}

impl<T, P> From<Punctuated1<T, P>> for Punctuated0<T, P> {
    fn from(value: Punctuated1<T, P>) -> Self {
        Self {
            punctuated: value.punctuated,
        }
    }
}

impl<T, P> Default for Punctuated0<T, P> {
    fn default() -> Self {
        Self { punctuated: vec![] }
    }
}

impl<T, P> From<Vec<(T, Option<P>)>> for Punctuated0<T, P> {
    fn from(value: Vec<(T, Option<P>)>) -> Self {
        Self { punctuated: value }
    }
}

impl<T, P> ToTokens for Punctuated0<T, P>
where
    T: ToTokens,
    P: ToTokens,
{
    fn to_tokens(&self) -> TokenStream {
        self.punctuated
            .iter()
            .flat_map(|(item, punc)| item.to_tokens().chain(punc.iter().flat_map(|i| i.to_tokens())))
            .collect()
    }
}

impl<T, P> Punctuated0<T, P>
where
    T: Parsable<Err = SyntaxError>,
    P: Parsable<Err = SyntaxError> + CouldParse,
{
    /// Parses items up to, but not including, the `end` token. The last item may be followed by
    /// a separator.
    pub fn parse_until(parser: &mut SyntacticParser<'_>, end: &TokenKind) -> SyntaxResult<Self> {
        let mut vec = vec![];
        while !parser.next_is(end)? && !parser.at_eof()? {
            let v = parser.parse(T::parse)?;
            if P::could_parse(parser)? {
                let punc = parser.parse(P::parse)?;
                vec.push((v, Some(punc)));
            } else {
                vec.push((v, None));
                break;
            }
        }
        Ok(Punctuated0 { punctuated: vec })
    }
}

impl<T, P> Parsable for Punctuated0<T, P>
where
    T: Parsable + CouldParse,
    P: Parsable<Err = T::Err> + CouldParse,
    T::Err: Error,
{
    type Err = T::Err;

    fn parse(parser: &mut SyntacticParser<'_>) -> Result<Self, Err<T::Err>> {
        let mut vec = vec![];
        if T::could_parse(parser)? {
            loop {
                let v = T::parse(parser)?;
                if P::could_parse(parser)? {
                    let punc = P::parse(parser)?;
                    vec.push((v, Some(punc)));
                } else {
                    vec.push((v, None));
                    break;
                }
            }
        }
        Ok(Punctuated0 { punctuated: vec })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use crate::syntax_tree::identifiers::Ident;
    use crate::syntax_tree::singletons::Comma;
    use test_log::test;

    #[test]
    fn test_punctuated1() {
        test_parser("a, b, c)", |parser| {
            let list = parser.parse(Punctuated1::<Ident, Comma>::parse).unwrap();
            let names = list.items().iter().map(|i| i.name()).collect::<Vec<_>>();
            assert_eq!(names, ["a", "b", "c"]);
            assert!(list.punctuated.last().is_some_and(|(_, comma)| comma.is_none()));
        });
    }

    #[test]
    fn test_punctuated0_trailing_separator() {
        test_parser("a, b, }", |parser| {
            let list = Punctuated0::<Ident, Comma>::parse_until(parser, &TokenKind::RCurly).unwrap();
            assert_eq!(list.len(), 2);
            assert!(parser.next_is(&TokenKind::RCurly).unwrap());
        });
    }

    #[test]
    fn test_punctuated0_empty() {
        test_parser(")", |parser| {
            let list = Punctuated0::<Ident, Comma>::parse_until(parser, &TokenKind::RParen).unwrap();
            assert!(list.is_empty());
            let list = parser.parse(Punctuated0::<Ident, Comma>::parse).unwrap();
            assert!(list.is_empty());
        });
    }

    #[test]
    fn test_punctuated_span() {
        use hare_tokens::spanned::Spanned;
        test_parser("  a,b", |parser| {
            let list = parser.parse(Punctuated1::<Ident, Comma>::parse).unwrap();
            assert_eq!(list.span().range(), 2..5);
        });
    }
}
