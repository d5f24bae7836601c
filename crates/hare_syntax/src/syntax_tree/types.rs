//! Types, as written in declarations, casts and case patterns

use crate::parser::{CouldParse, Err, ErrorKind, Parsable, SyntacticParser, SyntaxError, SyntaxResult};
use crate::syntax_tree::expr::{Expr, Initializer};
use crate::syntax_tree::helpers::{Punctuated, Punctuated0, Punctuated1};
use crate::syntax_tree::identifiers::{Ident, Path};
use crate::syntax_tree::literals::StringLiteral;
use crate::syntax_tree::singletons::{
    AtFini, AtInit, AtNoreturn, AtOffset, AtPacked, AtSymbol, AtTest, Bang, Colon, Comma, Const,
    Ellipsis, Enum, Fn, LBracket, LCurly, LParen, Nullable, Pipe, RBracket, RCurly, RParen, Star,
    Struct, Underscore, Union,
};
use crate::tree::{ChildNodes, SyntaxNode};
use hare_tokens::spanned::Spanned;
use hare_tokens::token::{ToTokens, Token, TokenKind, TokenStream};
use std::str::FromStr;
use tracing::trace;

/// Checks if a type could start with a token of this kind
pub fn can_start_type(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::Size
            | TokenKind::Void
            | TokenKind::Nullable
            | TokenKind::Star
            | TokenKind::Const
            | TokenKind::Bang
            | TokenKind::LBracket
            | TokenKind::Enum
            | TokenKind::Struct
            | TokenKind::Union
            | TokenKind::LParen
            | TokenKind::Ellipsis
    ) || can_start_function_type(kind)
}

fn can_start_function_type(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Fn
            | TokenKind::AtFini
            | TokenKind::AtInit
            | TokenKind::AtTest
            | TokenKind::AtNoreturn
            | TokenKind::AtSymbol
    )
}

#[derive(Debug, Clone, ToTokens, SyntaxNode, derive_more::From)]
pub enum Type {
    Builtin(BuiltinType),
    Pointer(PointerType),
    Const(ConstType),
    Error(ErrorType),
    Array(ArrayType),
    Enum(EnumType),
    Slice(SliceType),
    Struct(StructType),
    Tuple(TupleType),
    Union(UnionType),
    TaggedUnion(TaggedUnionType),
    Function(FunctionType),
    Unwrapped(UnwrappedType),
    /// A reference to a type declared elsewhere
    Named(Path),
}

impl Parsable for Type {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let Some(kind) = parser.peek()?.map(|token| token.kind().clone()) else {
            return Err(parser.expected(["type"]));
        };
        trace!("parsing type starting with {kind:?}");
        Ok(match &kind {
            TokenKind::Identifier(name) if BuiltinKind::from_str(name).is_ok() => {
                parser.parse(BuiltinType::parse)?.into()
            }
            TokenKind::Identifier(_) => Type::Named(parser.parse(Path::parse)?),
            TokenKind::Size | TokenKind::Void => parser.parse(BuiltinType::parse)?.into(),
            TokenKind::Nullable | TokenKind::Star => parser.parse(PointerType::parse)?.into(),
            TokenKind::Const => parser.parse(ConstType::parse)?.into(),
            TokenKind::Bang => parser.parse(ErrorType::parse)?.into(),
            TokenKind::LBracket => {
                if parser.nth_is(1, &TokenKind::RBracket)? {
                    parser.parse(ArrayType::parse)?.into()
                } else {
                    parser.parse(SliceType::parse)?.into()
                }
            }
            TokenKind::Enum => parser.parse(EnumType::parse)?.into(),
            TokenKind::Struct => parser.parse(StructType::parse)?.into(),
            TokenKind::Union => parser.parse(UnionType::parse)?.into(),
            TokenKind::LParen => parser.parse(parse_parenthesized_type)?,
            TokenKind::Ellipsis => parser.parse(UnwrappedType::parse)?.into(),
            kind if can_start_function_type(kind) => parser.parse(FunctionType::parse)?.into(),
            _ => return Err(parser.expected(["type"])),
        })
    }
}

impl CouldParse for Type {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        parser.nth_matches(0, can_start_type)
    }
}

/// The builtin primitive types
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, strum::EnumString, strum::AsRefStr, strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Int,
    Uint,
    Size,
    Uintptr,
    Char,
    F32,
    F64,
    Rune,
    Str,
    Bool,
    Void,
}

/// A builtin type, such as `int` or `str`
#[derive(Debug, Clone, SyntaxNode)]
pub struct BuiltinType {
    token: Token,
    #[syntax(skip)]
    builtin: BuiltinKind,
}

impl BuiltinType {
    pub fn builtin(&self) -> BuiltinKind {
        self.builtin
    }
}

impl ToTokens for BuiltinType {
    fn to_tokens(&self) -> TokenStream {
        TokenStream::from_iter([self.token.clone()])
    }
}

impl Parsable for BuiltinType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let builtin = parser.peek()?.and_then(|token| match token.kind() {
            TokenKind::Identifier(name) => BuiltinKind::from_str(name).ok(),
            TokenKind::Size => Some(BuiltinKind::Size),
            TokenKind::Void => Some(BuiltinKind::Void),
            _ => None,
        });
        match builtin {
            Some(builtin) => match parser.consume()? {
                Some(token) => Ok(Self { token, builtin }),
                None => Err(parser.error(ErrorKind::UnexpectedEof, None)),
            },
            None => Err(parser.expected(["builtin type"])),
        }
    }
}

/// `*T` or `nullable *T`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct PointerType {
    pub nullable: Option<Nullable>,
    pub star: Star,
    pub ty: Box<Type>,
}

impl Parsable for PointerType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            nullable: parser.parse_opt::<Nullable>()?,
            star: parser.parse(Star::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
        })
    }
}

/// `const T`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ConstType {
    pub const_tok: Const,
    pub ty: Box<Type>,
}

impl Parsable for ConstType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            const_tok: parser.parse(Const::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
        })
    }
}

/// `!T`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ErrorType {
    pub bang: Bang,
    pub ty: Box<Type>,
}

impl Parsable for ErrorType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            bang: parser.parse(Bang::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
        })
    }
}

/// `[]T`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ArrayType {
    pub lbracket: LBracket,
    pub rbracket: RBracket,
    pub ty: Box<Type>,
}

impl Parsable for ArrayType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            lbracket: parser.parse(LBracket::parse)?,
            rbracket: parser.parse(RBracket::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
        })
    }
}

/// `[len]T`, `[*]T` or `[_]T`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct SliceType {
    pub lbracket: LBracket,
    pub length: SliceLength,
    pub rbracket: RBracket,
    pub ty: Box<Type>,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum SliceLength {
    /// `*`
    Unbounded(Star),
    /// `_`
    Inferred(Underscore),
    Expr(Box<Expr>),
}

impl Parsable for SliceType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let lbracket = parser.parse(LBracket::parse)?;
        let length = if parser.next_is(&TokenKind::Underscore)? {
            SliceLength::Inferred(parser.parse(Underscore::parse)?)
        } else if parser.next_is(&TokenKind::Star)? && parser.nth_is(1, &TokenKind::RBracket)? {
            SliceLength::Unbounded(parser.parse(Star::parse)?)
        } else {
            SliceLength::Expr(Box::new(parser.parse(Expr::parse)?))
        };
        Ok(Self {
            lbracket,
            length,
            rbracket: parser.parse(RBracket::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
        })
    }
}

/// `enum u8 { A, B = 2 }`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct EnumType {
    pub enum_tok: Enum,
    pub underlying: Option<BuiltinType>,
    pub lcurly: LCurly,
    pub fields: Punctuated0<EnumField, Comma>,
    pub rcurly: RCurly,
}

impl Parsable for EnumType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let enum_tok = parser.parse(Enum::parse)?;
        let underlying = if parser.next_is(&TokenKind::LCurly)? {
            None
        } else {
            Some(parser.parse(BuiltinType::parse)?)
        };
        let lcurly = parser.parse(LCurly::parse)?;
        let fields = non_empty_fields(parser)?;
        Ok(Self {
            enum_tok,
            underlying,
            lcurly,
            fields,
            rcurly: parser.parse(RCurly::parse)?,
        })
    }
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct EnumField {
    pub name: Ident,
    pub value: Option<Initializer>,
}

impl Parsable for EnumField {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            name: parser.parse(Ident::parse)?,
            value: parser.parse_opt::<Initializer>()?,
        })
    }
}

/// Parses the fields of an enum, struct or union, which must have at least one
fn non_empty_fields<T>(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Punctuated0<T, Comma>>
where
    T: Parsable<Err = SyntaxError>,
{
    let fields = Punctuated0::parse_until(parser, &TokenKind::RCurly)?;
    if fields.is_empty() {
        return Err(parser.expected(["identifier"]));
    }
    Ok(fields)
}

/// `struct @packed? { fields }`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct StructType {
    pub struct_tok: Struct,
    pub packed: Option<AtPacked>,
    pub lcurly: LCurly,
    pub fields: Punctuated0<Field, Comma>,
    pub rcurly: RCurly,
}

impl Parsable for StructType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let struct_tok = parser.parse(Struct::parse)?;
        let packed = parser.parse_opt::<AtPacked>()?;
        let lcurly = parser.parse(LCurly::parse)?;
        let fields = non_empty_fields(parser)?;
        Ok(Self {
            struct_tok,
            packed,
            lcurly,
            fields,
            rcurly: parser.parse(RCurly::parse)?,
        })
    }
}

/// `union { fields }`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct UnionType {
    pub union_tok: Union,
    pub lcurly: LCurly,
    pub fields: Punctuated0<Field, Comma>,
    pub rcurly: RCurly,
}

impl Parsable for UnionType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let union_tok = parser.parse(Union::parse)?;
        let lcurly = parser.parse(LCurly::parse)?;
        let fields = non_empty_fields(parser)?;
        Ok(Self {
            union_tok,
            lcurly,
            fields,
            rcurly: parser.parse(RCurly::parse)?,
        })
    }
}

/// A struct or union member
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct Field {
    pub offset: Option<OffsetSpecifier>,
    pub member: FieldMember,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum FieldMember {
    Named {
        name: Ident,
        colon: Colon,
        ty: Box<Type>,
    },
    Struct(StructType),
    Union(UnionType),
    /// The fields of the named type are promoted into the enclosing type
    Embedded(Path),
}

impl Parsable for Field {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let offset = parser.parse_opt::<OffsetSpecifier>()?;
        let member = if parser.next_is(&TokenKind::Struct)? {
            FieldMember::Struct(parser.parse(StructType::parse)?)
        } else if parser.next_is(&TokenKind::Union)? {
            FieldMember::Union(parser.parse(UnionType::parse)?)
        } else if !Ident::could_parse(parser)? {
            return Err(parser.expected(["identifier", "struct", "union"]));
        } else if parser.nth_is(1, &TokenKind::Colon)? {
            FieldMember::Named {
                name: parser.parse(Ident::parse)?,
                colon: parser.parse(Colon::parse)?,
                ty: Box::new(parser.parse(Type::parse)?),
            }
        } else {
            FieldMember::Embedded(parser.parse(Path::parse)?)
        };
        Ok(Self { offset, member })
    }
}

/// `@offset(expr)`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct OffsetSpecifier {
    pub at_offset: AtOffset,
    pub lparen: LParen,
    pub value: Box<Expr>,
    pub rparen: RParen,
}

impl Parsable for OffsetSpecifier {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            at_offset: parser.parse(AtOffset::parse)?,
            lparen: parser.parse(LParen::parse)?,
            value: Box::new(parser.parse(Expr::parse)?),
            rparen: parser.parse(RParen::parse)?,
        })
    }
}

impl CouldParse for OffsetSpecifier {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        AtOffset::could_parse(parser)
    }
}

/// `(A, B)`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct TupleType {
    pub lparen: LParen,
    pub elements: Punctuated0<Type, Comma>,
    pub rparen: RParen,
}

/// `(A | B)`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct TaggedUnionType {
    pub lparen: LParen,
    pub alternatives: Punctuated1<Type, Pipe>,
    pub rparen: RParen,
}

impl TaggedUnionType {
    pub fn alternatives(&self) -> Vec<&Type> {
        self.alternatives.items()
    }
}

/// Tuples and tagged unions both start with `(`. Which one it is depends on the separator
/// after the first type.
fn parse_parenthesized_type(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Type> {
    let lparen = parser.parse(LParen::parse)?;
    if parser.next_is(&TokenKind::RParen)? {
        return Ok(TupleType {
            lparen,
            elements: Punctuated0::default(),
            rparen: parser.parse(RParen::parse)?,
        }
        .into());
    }
    let first = parser.parse(Type::parse)?;
    if parser.next_is(&TokenKind::BitwiseOr)? {
        let mut alternatives = vec![];
        let mut current = first;
        while let Some(pipe) = parser.parse_opt::<Pipe>()? {
            alternatives.push((current, Some(pipe)));
            current = parser.parse(Type::parse)?;
        }
        alternatives.push((current, None));
        Ok(TaggedUnionType {
            lparen,
            alternatives: Punctuated1 {
                punctuated: alternatives,
            },
            rparen: parser.parse(RParen::parse)?,
        }
        .into())
    } else {
        let mut elements = vec![];
        match parser.parse_opt::<Comma>()? {
            Some(comma) => {
                elements.push((first, Some(comma)));
                elements.extend(
                    Punctuated0::<Type, Comma>::parse_until(parser, &TokenKind::RParen)?.punctuated,
                );
            }
            None => elements.push((first, None)),
        }
        Ok(TupleType {
            lparen,
            elements: elements.into(),
            rparen: parser.parse(RParen::parse)?,
        }
        .into())
    }
}

/// `fn (params) returns`, with an optional attribute
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct FunctionType {
    pub attribute: Option<FunctionAttribute>,
    pub fn_tok: Fn,
    pub params: ParameterList,
    pub returns: Option<Box<Type>>,
}

impl Parsable for FunctionType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            attribute: parser.parse_opt::<FunctionAttribute>()?,
            fn_tok: parser.parse(Fn::parse)?,
            params: parser.parse(ParameterList::parse)?,
            returns: parse_return_type(parser)?,
        })
    }
}

/// The return type of a function is left out when nothing that could start a type follows
pub(crate) fn parse_return_type(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Option<Box<Type>>> {
    Ok(parser.parse_opt::<Type>()?.map(Box::new))
}

/// `@fini`, `@init`, `@test`, `@noreturn` or `@symbol("name")`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct FunctionAttribute {
    pub attribute: Attribute,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum Attribute {
    Fini(AtFini),
    Init(AtInit),
    Test(AtTest),
    Noreturn(AtNoreturn),
    Symbol(SymbolAttribute),
}

impl Parsable for FunctionAttribute {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let Some(kind) = parser.peek()?.map(|token| token.kind().clone()) else {
            return Err(parser.expected(["attribute"]));
        };
        let attribute = match kind {
            TokenKind::AtFini => Attribute::Fini(parser.parse(AtFini::parse)?),
            TokenKind::AtInit => Attribute::Init(parser.parse(AtInit::parse)?),
            TokenKind::AtTest => Attribute::Test(parser.parse(AtTest::parse)?),
            TokenKind::AtNoreturn => Attribute::Noreturn(parser.parse(AtNoreturn::parse)?),
            TokenKind::AtSymbol => Attribute::Symbol(parser.parse(SymbolAttribute::parse)?),
            _ => return Err(parser.expected(["@fini", "@init", "@test", "@noreturn", "@symbol"])),
        };
        Ok(Self { attribute })
    }
}

impl CouldParse for FunctionAttribute {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        parser.nth_matches(0, |kind| {
            can_start_function_type(kind) && kind != &TokenKind::Fn
        })
    }
}

/// `@symbol("name")`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct SymbolAttribute {
    pub at_symbol: AtSymbol,
    pub lparen: LParen,
    pub name: StringLiteral,
    pub rparen: RParen,
}

impl Parsable for SymbolAttribute {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            at_symbol: parser.parse(AtSymbol::parse)?,
            lparen: parser.parse(LParen::parse)?,
            name: parser.parse(StringLiteral::parse)?,
            rparen: parser.parse(RParen::parse)?,
        })
    }
}

impl CouldParse for SymbolAttribute {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        AtSymbol::could_parse(parser)
    }
}

/// `(a: int, _: str, rest: int...)`
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct ParameterList {
    pub lparen: LParen,
    pub params: Punctuated0<Parameter, Comma>,
    pub rparen: RParen,
}

impl ParameterList {
    pub fn params(&self) -> Vec<&Parameter> {
        self.params.items()
    }

    /// Whether the last parameter takes the remaining arguments
    pub fn is_variadic(&self) -> bool {
        self.params
            .punctuated
            .last()
            .is_some_and(|(param, _)| param.ellipsis.is_some())
    }

    /// Reports every variadic parameter that is not the last parameter
    fn validate_variadics(&self, parser: &mut SyntacticParser<'_>) {
        let params = self.params();
        let last = params.len().saturating_sub(1);
        for (idx, param) in params.into_iter().enumerate() {
            if idx != last && param.ellipsis.is_some() {
                let error = parser
                    .error_with_span(ErrorKind::MisplacedVariadic, None, param.span())
                    .into_inner();
                parser.report(error);
            }
        }
    }
}

impl Parsable for ParameterList {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let lparen = parser.parse(LParen::parse)?;
        let params = Punctuated0::parse_until(parser, &TokenKind::RParen)?;
        let rparen = parser.parse(RParen::parse)?;
        let list = Self {
            lparen,
            params,
            rparen,
        };
        if parser.options().validate_variadics() {
            list.validate_variadics(parser);
        }
        Ok(list)
    }
}

/// `name: type`, where a trailing `...` makes the parameter variadic
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct Parameter {
    pub name: ParameterName,
    pub colon: Colon,
    pub ty: Box<Type>,
    pub ellipsis: Option<Ellipsis>,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum ParameterName {
    Named(Ident),
    /// `_`
    Ignored(Underscore),
}

impl Parsable for Parameter {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let name = if parser.next_is(&TokenKind::Underscore)? {
            ParameterName::Ignored(parser.parse(Underscore::parse)?)
        } else if Ident::could_parse(parser)? {
            ParameterName::Named(parser.parse(Ident::parse)?)
        } else {
            return Err(parser.expected(["identifier", "_"]));
        };
        Ok(Self {
            name,
            colon: parser.parse(Colon::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
            ellipsis: parser.parse_opt::<Ellipsis>()?,
        })
    }
}

/// `... T`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct UnwrappedType {
    pub ellipsis: Ellipsis,
    pub ty: Box<Type>,
}

impl Parsable for UnwrappedType {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            ellipsis: parser.parse(Ellipsis::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
        })
    }
}

/// `: T`, as it follows a binding or field name
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct TypeAnnotation {
    pub colon: Colon,
    pub ty: Box<Type>,
}

impl Parsable for TypeAnnotation {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            colon: parser.parse(Colon::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
        })
    }
}

impl CouldParse for TypeAnnotation {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        Colon::could_parse(parser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use crate::ParseOptions;
    use crate::lexer::Lexer;
    use strum::IntoEnumIterator;
    use test_log::test;

    fn parse_type(src: &str) -> Type {
        let mut result = None;
        test_parser(src, |parser| {
            result = Some(parser.parse(Type::parse).unwrap_or_else(|e| panic!("{e}")));
            assert!(parser.at_eof().unwrap(), "did not consume all of {src:?}");
        });
        result.unwrap()
    }

    #[test]
    fn test_builtin_types() {
        for builtin in BuiltinKind::iter() {
            let Type::Builtin(ty) = parse_type(builtin.as_ref()) else {
                panic!("{builtin:?} is not a builtin type")
            };
            assert_eq!(ty.builtin(), builtin);
        }
    }

    #[test]
    fn test_scoped_named_type() {
        let Type::Named(Path::Scoped(outer)) = parse_type("a::b::c") else {
            panic!("expected scoped type")
        };
        assert_eq!(outer.name.name(), "c");
        let Path::Scoped(inner) = outer.path.as_ref() else {
            panic!("expected nested scope")
        };
        assert_eq!(inner.name.name(), "b");
        assert!(matches!(inner.path.as_ref(), Path::Ident(a) if a.name() == "a"));
    }

    #[test]
    fn test_tuple_vs_tagged_union() {
        let Type::Tuple(tuple) = parse_type("(int, str)") else {
            panic!("expected tuple")
        };
        assert_eq!(tuple.elements.len(), 2);
        let Type::TaggedUnion(union) = parse_type("(int | str)") else {
            panic!("expected tagged union")
        };
        assert_eq!(union.alternatives().len(), 2);
        assert_eq!(union.kind(), "tagged_union_type");
    }

    #[test]
    fn test_array_vs_slice() {
        assert!(matches!(parse_type("[]u8"), Type::Array(_)));
        let Type::Slice(slice) = parse_type("[*]u8") else {
            panic!("expected slice")
        };
        assert!(matches!(slice.length, SliceLength::Unbounded(_)));
        let Type::Slice(slice) = parse_type("[_]u8") else {
            panic!("expected slice")
        };
        assert!(matches!(slice.length, SliceLength::Inferred(_)));
        let Type::Slice(slice) = parse_type("[4 * N]u8") else {
            panic!("expected slice")
        };
        assert!(matches!(slice.length, SliceLength::Expr(_)));
    }

    #[test]
    fn test_pointer_types() {
        let Type::Pointer(ptr) = parse_type("nullable *const int") else {
            panic!("expected pointer")
        };
        assert!(ptr.nullable.is_some());
        assert!(matches!(*ptr.ty, Type::Const(_)));
        assert!(matches!(parse_type("!void"), Type::Error(_)));
    }

    #[test]
    fn test_struct_type_fields() {
        let Type::Struct(st) = parse_type(
            "struct @packed { @offset(4) x: int, struct { y: u8 }, union { z: u8, w: u16 }, io::handle, }",
        ) else {
            panic!("expected struct")
        };
        assert!(st.packed.is_some());
        let fields = st.fields.items();
        assert_eq!(fields.len(), 4);
        assert!(fields[0].offset.is_some());
        assert!(matches!(fields[0].member, FieldMember::Named { .. }));
        assert!(matches!(fields[1].member, FieldMember::Struct(_)));
        assert!(matches!(fields[2].member, FieldMember::Union(_)));
        assert!(matches!(fields[3].member, FieldMember::Embedded(Path::Scoped(_))));
    }

    #[test]
    fn test_empty_struct_is_error() {
        test_parser("struct { }", |parser| {
            let error = parser.parse(Type::parse).unwrap_err().into_inner();
            assert_eq!(error.offset(), 9);
        });
    }

    #[test]
    fn test_enum_type() {
        let Type::Enum(en) = parse_type("enum u8 { A, B = 2, }") else {
            panic!("expected enum")
        };
        assert_eq!(en.underlying.as_ref().map(|u| u.builtin()), Some(BuiltinKind::U8));
        let fields = en.fields.items();
        assert_eq!(fields.len(), 2);
        assert!(fields[0].value.is_none());
        assert!(fields[1].value.is_some());
    }

    #[test]
    fn test_function_type() {
        let Type::Function(func) = parse_type("@noreturn fn(x: int, _: str, rest: u8...) void") else {
            panic!("expected function type")
        };
        assert!(func.attribute.is_some());
        assert_eq!(func.params.params().len(), 3);
        assert!(func.params.is_variadic());
        assert!(func.returns.is_some());
        assert!(matches!(parse_type("fn()"), Type::Function(f) if f.returns.is_none()));
    }

    #[test]
    fn test_unwrapped_type() {
        assert!(matches!(parse_type("...foo"), Type::Unwrapped(_)));
    }

    #[test]
    fn test_misplaced_variadic_is_reported_when_validating() {
        let src = "fn(a: int..., b: int)";
        let mut parser = SyntacticParser::new(
            Lexer::new(src),
            ParseOptions::default().with_validate_variadics(true),
        );
        assert!(parser.parse(Type::parse).is_ok());
        let (_, errors) = parser.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].offset(), 3);

        let mut parser = SyntacticParser::from(Lexer::new(src));
        assert!(parser.parse(Type::parse).is_ok());
        assert!(parser.finish().1.is_empty());
    }

    #[test]
    fn test_not_a_type() {
        test_parser("1", |parser| {
            let error = parser.parse(Type::parse).unwrap_err().into_inner();
            assert_eq!(error.expected(), ["type"]);
        });
    }
}
