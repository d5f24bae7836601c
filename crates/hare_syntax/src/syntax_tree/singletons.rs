//! Syntax tree parts made of exactly one token of a fixed kind

use crate::parser::{CouldParse, Err, ErrorKind, Parsable, SyntacticParser, SyntaxError};
use crate::tree::{ChildNodes, SyntaxNode};
use hare_tokens::spanned::Span;
use hare_tokens::token::{ToTokens, Token, TokenKind, TokenStream};

macro_rules! token_singleton {
    ($ty:ident, $($pat:tt)*) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $ty {
            token: Token,
        }

        impl $ty {
            pub fn token(&self) -> &Token {
                &self.token
            }
        }

        impl TryFrom<Token> for $ty {
            type Error = SyntaxError;

            fn try_from(token: Token) -> Result<Self, Self::Error> {
                match token.kind() {
                    $($pat)* => { Ok(Self { token }) },
                    _ => Err(ErrorKind::expected_token([$($pat)*.to_string()], token).into())
                }
            }
        }

        #[automatically_derived]
        impl ToTokens for $ty {
            fn to_tokens(&self) -> TokenStream {
                TokenStream::from_iter([self.token.clone()])
            }
        }

        #[automatically_derived]
        impl Parsable for $ty {
            type Err = SyntaxError;

            fn parse(parser: &mut SyntacticParser<'_>) -> Result<Self, Err<Self::Err>> {
                if let Some(tok) = parser.consume_if(|token| matches!(token.kind(), $($pat)*))? {
                    Ok($ty { token: tok })
                } else {
                    Err(parser.expected([$($pat)*.to_string()]))
                }
            }
        }

        #[automatically_derived]
        impl CouldParse for $ty {
            fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
                if let Some(peek) = parser.peek()? {
                    Ok(matches!(peek.kind(), $($pat)*))
                } else {
                    Ok(false)
                }
            }
        }

        impl ChildNodes for $ty {
            fn collect_children<'a>(&'a self, _out: &mut Vec<&'a dyn SyntaxNode>) {}
        }
    };
}

token_singleton!(LParen, TokenKind::LParen);
token_singleton!(RParen, TokenKind::RParen);
token_singleton!(LBracket, TokenKind::LBracket);
token_singleton!(RBracket, TokenKind::RBracket);
token_singleton!(LCurly, TokenKind::LCurly);
token_singleton!(RCurly, TokenKind::RCurly);
token_singleton!(SemiC, TokenKind::SemiColon);
token_singleton!(Comma, TokenKind::Comma);
token_singleton!(Colon, TokenKind::Colon);
token_singleton!(DoubleColon, TokenKind::DoubleColon);
token_singleton!(Dot, TokenKind::Dot);
token_singleton!(DotDot, TokenKind::DotDot);
token_singleton!(Ellipsis, TokenKind::Ellipsis);
token_singleton!(QMark, TokenKind::QMark);
token_singleton!(FatArrow, TokenKind::FatArrow);
token_singleton!(Assign, TokenKind::Assign);
token_singleton!(Bang, TokenKind::Bang);
token_singleton!(Star, TokenKind::Star);
token_singleton!(Pipe, TokenKind::BitwiseOr);
token_singleton!(Underscore, TokenKind::Underscore);

token_singleton!(Use, TokenKind::Use);
token_singleton!(Export, TokenKind::Export);
token_singleton!(Const, TokenKind::Const);
token_singleton!(Let, TokenKind::Let);
token_singleton!(Def, TokenKind::Def);
token_singleton!(TypeKw, TokenKind::Type);
token_singleton!(Fn, TokenKind::Fn);
token_singleton!(Static, TokenKind::Static);
token_singleton!(If, TokenKind::If);
token_singleton!(Else, TokenKind::Else);
token_singleton!(For, TokenKind::For);
token_singleton!(Break, TokenKind::Break);
token_singleton!(Defer, TokenKind::Defer);
token_singleton!(Return, TokenKind::Return);
token_singleton!(Yield, TokenKind::Yield);
token_singleton!(Switch, TokenKind::Switch);
token_singleton!(Match, TokenKind::Match);
token_singleton!(CaseKw, TokenKind::Case);
token_singleton!(Struct, TokenKind::Struct);
token_singleton!(Union, TokenKind::Union);
token_singleton!(Enum, TokenKind::Enum);
token_singleton!(Size, TokenKind::Size);
token_singleton!(Nullable, TokenKind::Nullable);

token_singleton!(AtSymbol, TokenKind::AtSymbol);
token_singleton!(AtFini, TokenKind::AtFini);
token_singleton!(AtInit, TokenKind::AtInit);
token_singleton!(AtTest, TokenKind::AtTest);
token_singleton!(AtNoreturn, TokenKind::AtNoreturn);
token_singleton!(AtPacked, TokenKind::AtPacked);
token_singleton!(AtOffset, TokenKind::AtOffset);

token_singleton!(Eof, TokenKind::Eof);

impl Eof {
    /// The end of a source of length `len`
    pub fn at(len: usize) -> Self {
        Self {
            token: Token::new(Span::new(len, 0), TokenKind::Eof, ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use test_log::test;

    #[test]
    fn test_parse_singleton() {
        test_parser("; ,", |parser| {
            assert!(SemiC::could_parse(parser).unwrap());
            assert!(!Comma::could_parse(parser).unwrap());
            let semi = parser.parse(SemiC::parse).unwrap();
            assert_eq!(semi.token().text(), ";");
            assert!(parser.parse(Comma::parse).is_ok());
            assert!(parser.parse(Eof::parse).is_ok());
        });
    }

    #[test]
    fn test_singleton_error_does_not_consume() {
        test_parser("x", |parser| {
            let Err(Err::Error(error)) = parser.parse(SemiC::parse) else {
                panic!("expected error")
            };
            assert_eq!(error.expected(), [";"]);
            assert_eq!(error.found().map(|t| t.text()), Some("x"));
            assert_eq!(parser.peek().unwrap().map(|t| t.text()), Some("x"));
        });
    }

    #[test]
    fn test_try_from_token() {
        let token = Token::new(Span::new(0, 2), TokenKind::Fn, "fn");
        assert!(Fn::try_from(token.clone()).is_ok());
        assert!(Let::try_from(token).is_err());
    }
}
