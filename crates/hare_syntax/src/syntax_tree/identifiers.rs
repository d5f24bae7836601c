//! Names, and names qualified by the modules that declare them

use crate::parser::{CouldParse, Err, Parsable, SyntacticParser, SyntaxError, SyntaxResult};
use crate::syntax_tree::singletons::DoubleColon;
use crate::tree::SyntaxNode;
use hare_tokens::token::{ToTokens, Token, TokenKind, TokenStream};
use std::fmt::{Display, Formatter};

/// A single name
#[derive(Debug, Clone, SyntaxNode)]
#[syntax(kind = "identifier")]
pub struct Ident {
    token: Token,
}

impl ToTokens for Ident {
    fn to_tokens(&self) -> TokenStream {
        TokenStream::from_iter([self.token.clone()])
    }
}

impl Ident {
    pub fn name(&self) -> &str {
        self.token.text()
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Parsable for Ident {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        if let Some(token) =
            parser.consume_if(|token| matches!(token.kind(), TokenKind::Identifier(_)))?
        {
            Ok(Ident { token })
        } else {
            Err(parser.expected(["identifier"]))
        }
    }
}

impl CouldParse for Ident {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        parser.nth_matches(0, |kind| matches!(kind, TokenKind::Identifier(_)))
    }
}

/// A name qualified by one or more module names, like `io::file::open`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ScopedIdentifier {
    pub path: Box<Path>,
    pub double_colon: DoubleColon,
    pub name: Ident,
}

/// Either a plain or a qualified name
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub enum Path {
    Ident(Ident),
    Scoped(ScopedIdentifier),
}

impl Path {
    /// The last name of the path
    pub fn name(&self) -> &Ident {
        match self {
            Path::Ident(ident) => ident,
            Path::Scoped(scoped) => &scoped.name,
        }
    }

    /// Every name in the path, outermost module first
    pub fn segments(&self) -> Vec<&Ident> {
        match self {
            Path::Ident(ident) => vec![ident],
            Path::Scoped(scoped) => {
                let mut segments = scoped.path.segments();
                segments.push(&scoped.name);
                segments
            }
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let segments = self.segments();
        write!(f, "{}", itertools::join(segments, "::"))
    }
}

impl Parsable for Path {
    type Err = SyntaxError;

    /// Stops before a `::` that is not followed by a name, which leaves `::{` and `::*` to
    /// whoever is parsing the path.
    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let mut path = Path::Ident(parser.parse(Ident::parse)?);
        while parser.next_is(&TokenKind::DoubleColon)?
            && parser.nth_matches(1, |kind| matches!(kind, TokenKind::Identifier(_)))?
        {
            let double_colon = parser.parse(DoubleColon::parse)?;
            let name = parser.parse(Ident::parse)?;
            path = Path::Scoped(ScopedIdentifier {
                path: Box::new(path),
                double_colon,
                name,
            });
        }
        Ok(path)
    }
}

impl CouldParse for Path {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        Ident::could_parse(parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use test_log::test;

    #[test]
    fn test_parse_ident() {
        test_parser("hello", |parser| {
            let ident = parser.parse(Ident::parse).unwrap();
            assert_eq!(ident.name(), "hello");
            assert_eq!(ident.kind(), "identifier");
            assert!(ident.children().is_empty());
        });
    }

    #[test]
    fn test_keyword_is_not_ident() {
        test_parser("fn", |parser| {
            assert!(!Ident::could_parse(parser).unwrap());
            assert!(parser.parse(Ident::parse).is_err());
        });
    }

    #[test]
    fn test_parse_scoped() {
        test_parser("io::file::open", |parser| {
            let path = parser.parse(Path::parse).unwrap();
            assert_eq!(path.to_string(), "io::file::open");
            assert_eq!(path.kind(), "scoped_identifier");
            assert_eq!(path.name().name(), "open");
            let children = path.children();
            assert_eq!(children.len(), 2);
            assert_eq!(children[0].kind(), "scoped_identifier");
            assert_eq!(children[1].kind(), "identifier");
        });
    }

    #[test]
    fn test_path_stops_before_member_list() {
        test_parser("fmt::{println}", |parser| {
            let path = parser.parse(Path::parse).unwrap();
            assert_eq!(path.kind(), "identifier");
            assert!(parser.next_is(&TokenKind::DoubleColon).unwrap());
        });
    }
}
