//! Literal values, from single tokens up to struct and tuple literals

use crate::parser::{CouldParse, Err, ErrorKind, Parsable, SyntacticParser, SyntaxError, SyntaxResult};
use crate::syntax_tree::expr::Expr;
use crate::syntax_tree::helpers::Punctuated0;
use crate::syntax_tree::identifiers::{Ident, Path};
use crate::syntax_tree::singletons::{
    Assign, Comma, Ellipsis, LBracket, LCurly, LParen, RBracket, RCurly, RParen, Struct,
};
use crate::syntax_tree::types::TypeAnnotation;
use crate::tree::{ChildNodes, SyntaxNode};
use hare_tokens::token::{
    FloatSuffix, IntegerSuffix, IntegerValue, Radix, ToTokens, Token, TokenKind, TokenStream,
};

macro_rules! leaf_literal {
    ($(#[$meta:meta])* $ty:ident, $description:literal, $($pat:tt)*) => {
        $(#[$meta])*
        #[derive(Debug, Clone, SyntaxNode)]
        pub struct $ty {
            token: Token,
        }

        impl $ty {
            pub fn token(&self) -> &Token {
                &self.token
            }
        }

        impl ToTokens for $ty {
            fn to_tokens(&self) -> TokenStream {
                TokenStream::from_iter([self.token.clone()])
            }
        }

        impl Parsable for $ty {
            type Err = SyntaxError;

            fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
                if let Some(token) = parser.consume_if(|token| matches!(token.kind(), $($pat)*))? {
                    Ok(Self { token })
                } else {
                    Err(parser.expected([$description]))
                }
            }
        }

        impl CouldParse for $ty {
            fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
                parser.nth_matches(0, |kind| matches!(kind, $($pat)*))
            }
        }
    };
}

leaf_literal!(
    /// An integer, in any radix and with an optional type suffix
    IntegerLiteral, "integer", TokenKind::Integer(_)
);
leaf_literal!(FloatLiteral, "float", TokenKind::Float(_));
leaf_literal!(
    /// A double quoted string
    StringLiteral, "string", TokenKind::String(_)
);
leaf_literal!(
    /// A backtick quoted string, which has no escapes
    RawStringLiteral, "raw string", TokenKind::RawString(_)
);
leaf_literal!(RuneLiteral, "rune", TokenKind::Rune(_));
leaf_literal!(BooleanLiteral, "boolean", TokenKind::True | TokenKind::False);
leaf_literal!(VoidLiteral, "void", TokenKind::Void);
leaf_literal!(NullLiteral, "null", TokenKind::Null);

impl IntegerLiteral {
    fn integer(&self) -> IntegerValue {
        match self.token.kind() {
            TokenKind::Integer(value) => *value,
            _ => unreachable!("integer literals only hold integer tokens"),
        }
    }

    /// The value, or `None` if it does not fit into 64 bits
    pub fn value(&self) -> Option<u64> {
        self.integer().value
    }

    pub fn radix(&self) -> Radix {
        self.integer().radix
    }

    pub fn suffix(&self) -> Option<IntegerSuffix> {
        self.integer().suffix
    }
}

impl FloatLiteral {
    pub fn value(&self) -> f64 {
        match self.token.kind() {
            TokenKind::Float(float) => float.value,
            _ => unreachable!("float literals only hold float tokens"),
        }
    }

    pub fn suffix(&self) -> Option<FloatSuffix> {
        match self.token.kind() {
            TokenKind::Float(float) => float.suffix,
            _ => None,
        }
    }
}

impl StringLiteral {
    /// The string with its escapes applied
    pub fn value(&self) -> &str {
        match self.token.kind() {
            TokenKind::String(value) => value,
            _ => unreachable!("string literals only hold string tokens"),
        }
    }
}

impl RawStringLiteral {
    pub fn value(&self) -> &str {
        match self.token.kind() {
            TokenKind::RawString(value) => value,
            _ => unreachable!("raw string literals only hold raw string tokens"),
        }
    }
}

impl RuneLiteral {
    pub fn value(&self) -> char {
        match self.token.kind() {
            TokenKind::Rune(value) => *value,
            _ => unreachable!("rune literals only hold rune tokens"),
        }
    }
}

impl BooleanLiteral {
    pub fn value(&self) -> bool {
        self.token.kind() == &TokenKind::True
    }
}

/// Two or more adjacent strings, which form a single string
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ConcatenatedString {
    pub strings: Vec<StringLiteral>,
}

impl ConcatenatedString {
    pub fn value(&self) -> String {
        self.strings.iter().map(StringLiteral::value).collect()
    }
}

/// `[a, b, c...]`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ArrayLiteral {
    pub lbracket: LBracket,
    pub elements: Punctuated0<ArrayElement, Comma>,
    pub rbracket: RBracket,
}

impl Parsable for ArrayLiteral {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let lbracket = parser.parse(LBracket::parse)?;
        let elements = Punctuated0::parse_until(parser, &TokenKind::RBracket)?;
        let rbracket = parser.parse(RBracket::parse)?;
        Ok(Self {
            lbracket,
            elements,
            rbracket,
        })
    }
}

/// An element of an array literal. A trailing `...` repeats the element to fill the array.
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct ArrayElement {
    pub value: Expr,
    pub ellipsis: Option<Ellipsis>,
}

impl Parsable for ArrayElement {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let value = parser.parse(Expr::parse)?;
        let ellipsis = parser.parse_opt::<Ellipsis>()?;
        Ok(Self { value, ellipsis })
    }
}

/// Either `struct { ... }` or `name { ... }`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct StructLiteral {
    pub head: StructLiteralHead,
    pub lcurly: LCurly,
    pub fields: Punctuated0<FieldInitializer, Comma>,
    /// Only named struct literals may leave the remaining fields at their defaults with `...`
    pub ellipsis: Option<Ellipsis>,
    pub rcurly: RCurly,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum StructLiteralHead {
    Anonymous(Struct),
    Named(Path),
}

impl StructLiteral {
    /// Parses the braced part of a struct literal whose head was already parsed
    pub fn parse_body(parser: &mut SyntacticParser<'_>, head: StructLiteralHead) -> SyntaxResult<Self> {
        let named = matches!(head, StructLiteralHead::Named(_));
        let lcurly = parser.parse(LCurly::parse)?;
        let mut fields = vec![];
        let mut ellipsis = None;
        loop {
            if parser.next_is(&TokenKind::RCurly)? {
                break;
            }
            if named && parser.next_is(&TokenKind::Ellipsis)? {
                ellipsis = Some(parser.parse(Ellipsis::parse)?);
                break;
            }
            let field = parser.parse(FieldInitializer::parse)?;
            match parser.parse_opt::<Comma>()? {
                Some(comma) => fields.push((field, Some(comma))),
                None => {
                    fields.push((field, None));
                    break;
                }
            }
        }
        if fields.is_empty() && ellipsis.is_none() {
            return Err(if named {
                parser.expected(["identifier", "..."])
            } else {
                parser.expected(["identifier"])
            });
        }
        let rcurly = parser.parse(RCurly::parse)?;
        Ok(Self {
            head,
            lcurly,
            fields: fields.into(),
            ellipsis,
            rcurly,
        })
    }

    pub fn name(&self) -> Option<&Path> {
        match &self.head {
            StructLiteralHead::Anonymous(_) => None,
            StructLiteralHead::Named(path) => Some(path),
        }
    }
}

impl Parsable for StructLiteral {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let head = if parser.next_is(&TokenKind::Struct)? {
            StructLiteralHead::Anonymous(parser.parse(Struct::parse)?)
        } else {
            StructLiteralHead::Named(parser.parse(Path::parse)?)
        };
        Self::parse_body(parser, head)
    }
}

/// A field of a struct literal, which is either assigned or is itself a struct literal
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum FieldInitializer {
    Assignment(FieldAssignment),
    Literal(StructLiteral),
}

impl Parsable for FieldInitializer {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let assignment = parser.nth_matches(0, |kind| matches!(kind, TokenKind::Identifier(_)))?
            && parser.nth_matches(1, |kind| matches!(kind, TokenKind::Assign | TokenKind::Colon))?;
        if assignment {
            Ok(FieldInitializer::Assignment(parser.parse(FieldAssignment::parse)?))
        } else {
            Ok(FieldInitializer::Literal(parser.parse(StructLiteral::parse)?))
        }
    }
}

/// `name: type = value`, where the type is optional
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct FieldAssignment {
    pub name: Ident,
    pub type_annotation: Option<TypeAnnotation>,
    pub assign: Assign,
    pub value: Box<Expr>,
}

impl Parsable for FieldAssignment {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let name = parser.parse(Ident::parse)?;
        let type_annotation = parser.parse_opt::<TypeAnnotation>()?;
        let assign = parser.parse(Assign::parse)?;
        let value = Box::new(parser.parse(Expr::parse)?);
        Ok(Self {
            name,
            type_annotation,
            assign,
            value,
        })
    }
}

/// `(a, b)`. A single parenthesized expression is only a tuple if followed by a comma.
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct TupleLiteral {
    pub lparen: LParen,
    pub elements: Punctuated0<Expr, Comma>,
    pub rparen: RParen,
}

impl TupleLiteral {
    /// Parses the rest of a tuple whose first element and following comma were already parsed
    pub fn parse_rest(
        parser: &mut SyntacticParser<'_>,
        lparen: LParen,
        first: Expr,
        comma: Comma,
    ) -> SyntaxResult<Self> {
        let mut elements = vec![(first, Some(comma))];
        elements.extend(Punctuated0::<Expr, Comma>::parse_until(parser, &TokenKind::RParen)?.punctuated);
        let rparen = parser.parse(RParen::parse)?;
        Ok(Self {
            lparen,
            elements: elements.into(),
            rparen,
        })
    }
}

impl Parsable for TupleLiteral {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let lparen = parser.parse(LParen::parse)?;
        let first = parser.parse(Expr::parse)?;
        let comma = parser.parse(Comma::parse)?;
        Self::parse_rest(parser, lparen, first, comma)
    }
}

impl CouldParse for TupleLiteral {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        LParen::could_parse(parser)
    }
}

#[derive(Debug, Clone, ToTokens, SyntaxNode, derive_more::From)]
pub enum Literal {
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    String(StringLiteral),
    RawString(RawStringLiteral),
    ConcatenatedString(ConcatenatedString),
    Rune(RuneLiteral),
    Boolean(BooleanLiteral),
    Void(VoidLiteral),
    Null(NullLiteral),
    Array(ArrayLiteral),
    Struct(StructLiteral),
    Tuple(TupleLiteral),
}

impl Literal {
    /// Parses a literal made of a single token, or a run of adjacent strings
    pub fn parse_simple(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let Some(kind) = parser.peek()?.map(|token| token.kind().clone()) else {
            return Err(parser.error(ErrorKind::UnexpectedEof, None));
        };
        Ok(match kind {
            TokenKind::Integer(_) => parser.parse(IntegerLiteral::parse)?.into(),
            TokenKind::Float(_) => parser.parse(FloatLiteral::parse)?.into(),
            TokenKind::String(_) => {
                let first = parser.parse(StringLiteral::parse)?;
                if StringLiteral::could_parse(parser)? {
                    let mut strings = vec![first];
                    while let Some(next) = parser.parse_opt::<StringLiteral>()? {
                        strings.push(next);
                    }
                    ConcatenatedString { strings }.into()
                } else {
                    first.into()
                }
            }
            TokenKind::RawString(_) => parser.parse(RawStringLiteral::parse)?.into(),
            TokenKind::Rune(_) => parser.parse(RuneLiteral::parse)?.into(),
            TokenKind::True | TokenKind::False => parser.parse(BooleanLiteral::parse)?.into(),
            TokenKind::Void => parser.parse(VoidLiteral::parse)?.into(),
            TokenKind::Null => parser.parse(NullLiteral::parse)?.into(),
            _ => return Err(parser.expected(["literal"])),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use hare_tokens::spanned::Spanned;
    use test_log::test;

    fn literal(src: &str) -> Literal {
        let mut result = None;
        test_parser(src, |parser| {
            result = Some(parser.parse(Literal::parse_simple).unwrap());
            assert!(parser.at_eof().unwrap());
        });
        result.unwrap()
    }

    #[test]
    fn test_integer_literal() {
        let Literal::Integer(integer) = literal("0x1fu8") else {
            panic!("expected integer")
        };
        assert_eq!(integer.value(), Some(31));
        assert_eq!(integer.radix(), Radix::Hexadecimal);
        assert_eq!(integer.suffix(), Some(IntegerSuffix::U8));
        assert_eq!(integer.kind(), "integer_literal");
    }

    #[test]
    fn test_concatenated_string() {
        let Literal::ConcatenatedString(strings) = literal(r#""a\n" "b""#) else {
            panic!("expected concatenated string")
        };
        assert_eq!(strings.value(), "a\nb");
        assert_eq!(strings.children().len(), 2);
        assert_eq!(strings.span().range(), 0..9);
    }

    #[test]
    fn test_single_string() {
        assert!(matches!(literal("\"a\""), Literal::String(_)));
        assert!(matches!(literal("`a`"), Literal::RawString(_)));
    }

    #[test]
    fn test_simple_literals() {
        assert!(matches!(literal("true"), Literal::Boolean(b) if b.value()));
        assert!(matches!(literal("false"), Literal::Boolean(b) if !b.value()));
        assert!(matches!(literal("'x'"), Literal::Rune(r) if r.value() == 'x'));
        assert!(matches!(literal("1.5"), Literal::Float(f) if f.value() == 1.5));
        assert_eq!(literal("null").kind(), "null_literal");
        assert_eq!(literal("void").kind(), "void_literal");
    }

    #[test]
    fn test_not_a_literal() {
        test_parser("x", |parser| {
            let error = parser.parse(Literal::parse_simple).unwrap_err().into_inner();
            assert_eq!(error.expected(), ["literal"]);
        });
    }
}
