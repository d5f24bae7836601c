//! A lexical token from a source buffer, along with streams for said token

use crate::spanned::{Span, Spanned};
#[cfg(feature = "derive")]
pub use hare_tokens_derive::ToTokens;
use std::collections::VecDeque;
use std::fmt::{Debug, Display, Formatter};
use std::iter;

/// A lexical token from a source buffer
#[derive(Clone)]
pub struct Token {
    span: Span,
    kind: TokenKind,
    text: String,
}

impl Token {
    /// Creates a new token
    pub fn new(span: Span, kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            span,
            kind,
            text: text.into(),
        }
    }

    /// Gets the kind for this token
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Gets the exact source text of this token
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}@{}", self.kind, self.span.offset())
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Suffix of an integer literal
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::EnumString, strum::AsRefStr, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum IntegerSuffix {
    I,
    U,
    Z,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

/// Suffix of a floating point literal
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FloatSuffix {
    F32,
    F64,
}

/// The base an integer literal was written in
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl Radix {
    pub fn base(&self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hexadecimal => 16,
        }
    }
}

/// The value of an integer literal
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct IntegerValue {
    /// `None` if the literal does not fit into 64 bits
    pub value: Option<u64>,
    pub radix: Radix,
    pub suffix: Option<IntegerSuffix>,
}

/// The value of a floating point literal
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FloatValue {
    pub value: f64,
    pub suffix: Option<FloatSuffix>,
}

/// The kind for this token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // keywords
    Use,
    Export,
    Const,
    Let,
    Def,
    Type,
    Fn,
    Static,
    If,
    Else,
    For,
    Break,
    Defer,
    Return,
    Yield,
    Switch,
    Match,
    Case,
    Struct,
    Union,
    Enum,
    As,
    Is,
    Size,
    Nullable,
    True,
    False,
    Void,
    Null,

    // attributes
    AtSymbol,
    AtFini,
    AtInit,
    AtTest,
    AtNoreturn,
    AtPacked,
    AtOffset,

    Identifier(String),
    /// `_`
    Underscore,

    // literals
    Integer(IntegerValue),
    Float(FloatValue),
    /// A quoted string, with escapes already applied
    String(String),
    /// A backtick delimited string
    RawString(String),
    Rune(char),
    /// A line comment, holding the text after `//`
    Comment(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    LCurly,
    RCurly,
    Comma,
    SemiColon,
    Colon,
    DoubleColon,
    Dot,
    DotDot,
    Ellipsis,
    QMark,
    /// `=>`
    FatArrow,

    /// =
    Assign,
    /// ==
    Eq,
    Neq,
    Bang,
    Tilde,
    Plus,
    Minus,
    Star,
    Div,
    Rem,
    BitwiseAnd,
    And,
    BitwiseOr,
    Or,
    BitwiseXor,
    /// `^^`
    Xor,
    Lt,
    Lte,
    LShift,
    Gt,
    Gte,
    RShift,

    PlusAssign,
    MinusAssign,
    MultAssign,
    DivAssign,
    RemAssign,
    LShiftAssign,
    RShiftAssign,
    BitwiseOrAssign,
    BitwiseAndAssign,
    BitwiseXorAssign,
    OrAssign,
    AndAssign,
    XorAssign,

    /// EOF, will only appear at the end of a token sequence
    Eof,
}

impl TokenKind {
    /// Checks if this is trivia, which never takes part in the shape of a syntax tree
    pub fn is_trivia(&self) -> bool {
        matches!(self, TokenKind::Comment(_))
    }

    /// Gets the keyword for a given identifier lexeme, if it is one
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "use" => TokenKind::Use,
            "export" => TokenKind::Export,
            "const" => TokenKind::Const,
            "let" => TokenKind::Let,
            "def" => TokenKind::Def,
            "type" => TokenKind::Type,
            "fn" => TokenKind::Fn,
            "static" => TokenKind::Static,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "break" => TokenKind::Break,
            "defer" => TokenKind::Defer,
            "return" => TokenKind::Return,
            "yield" => TokenKind::Yield,
            "switch" => TokenKind::Switch,
            "match" => TokenKind::Match,
            "case" => TokenKind::Case,
            "struct" => TokenKind::Struct,
            "union" => TokenKind::Union,
            "enum" => TokenKind::Enum,
            "as" => TokenKind::As,
            "is" => TokenKind::Is,
            "size" => TokenKind::Size,
            "nullable" => TokenKind::Nullable,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "void" => TokenKind::Void,
            "null" => TokenKind::Null,
            "_" => TokenKind::Underscore,
            _ => return None,
        })
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Use => "use",
            TokenKind::Export => "export",
            TokenKind::Const => "const",
            TokenKind::Let => "let",
            TokenKind::Def => "def",
            TokenKind::Type => "type",
            TokenKind::Fn => "fn",
            TokenKind::Static => "static",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::Break => "break",
            TokenKind::Defer => "defer",
            TokenKind::Return => "return",
            TokenKind::Yield => "yield",
            TokenKind::Switch => "switch",
            TokenKind::Match => "match",
            TokenKind::Case => "case",
            TokenKind::Struct => "struct",
            TokenKind::Union => "union",
            TokenKind::Enum => "enum",
            TokenKind::As => "as",
            TokenKind::Is => "is",
            TokenKind::Size => "size",
            TokenKind::Nullable => "nullable",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Void => "void",
            TokenKind::Null => "null",
            TokenKind::AtSymbol => "@symbol",
            TokenKind::AtFini => "@fini",
            TokenKind::AtInit => "@init",
            TokenKind::AtTest => "@test",
            TokenKind::AtNoreturn => "@noreturn",
            TokenKind::AtPacked => "@packed",
            TokenKind::AtOffset => "@offset",
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Underscore => "_",
            TokenKind::Integer(_) => "integer",
            TokenKind::Float(_) => "float",
            TokenKind::String(_) => "string",
            TokenKind::RawString(_) => "raw string",
            TokenKind::Rune(_) => "rune",
            TokenKind::Comment(_) => "comment",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LCurly => "{",
            TokenKind::RCurly => "}",
            TokenKind::Comma => ",",
            TokenKind::SemiColon => ";",
            TokenKind::Colon => ":",
            TokenKind::DoubleColon => "::",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Ellipsis => "...",
            TokenKind::QMark => "?",
            TokenKind::FatArrow => "=>",
            TokenKind::Assign => "=",
            TokenKind::Eq => "==",
            TokenKind::Neq => "!=",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Div => "/",
            TokenKind::Rem => "%",
            TokenKind::BitwiseAnd => "&",
            TokenKind::And => "&&",
            TokenKind::BitwiseOr => "|",
            TokenKind::Or => "||",
            TokenKind::BitwiseXor => "^",
            TokenKind::Xor => "^^",
            TokenKind::Lt => "<",
            TokenKind::Lte => "<=",
            TokenKind::LShift => "<<",
            TokenKind::Gt => ">",
            TokenKind::Gte => ">=",
            TokenKind::RShift => ">>",
            TokenKind::PlusAssign => "+=",
            TokenKind::MinusAssign => "-=",
            TokenKind::MultAssign => "*=",
            TokenKind::DivAssign => "/=",
            TokenKind::RemAssign => "%=",
            TokenKind::LShiftAssign => "<<=",
            TokenKind::RShiftAssign => ">>=",
            TokenKind::BitwiseOrAssign => "|=",
            TokenKind::BitwiseAndAssign => "&=",
            TokenKind::BitwiseXorAssign => "^=",
            TokenKind::OrAssign => "||=",
            TokenKind::AndAssign => "&&=",
            TokenKind::XorAssign => "^^=",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

/// A stream of tokens
pub struct TokenStream(VecDeque<Token>);

impl FromIterator<Token> for TokenStream {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_front()
    }
}

impl Default for TokenStream {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStream {
    #[inline]
    pub fn new() -> Self {
        TokenStream::from_iter(iter::empty())
    }
}

/// A trait to convert something to an iterator of tokens
pub trait ToTokens {
    /// Gets an iterator over tokens
    fn to_tokens(&self) -> TokenStream;

    fn to_token_tree(&self) -> TokenTree {
        TokenTree::Leaf(Vec::from_iter(self.to_tokens()))
    }
}

impl<T: ToTokens> Spanned for T {
    fn span(&self) -> Span {
        self.to_tokens()
            .map::<Span, _>(|token| token.span())
            .reduce(|a, b| a.join(b))
            .expect("Spanned has no tokens despite implementing ToTokens")
    }
}

impl<T: ToTokens> ToTokens for Option<T> {
    fn to_tokens(&self) -> TokenStream {
        match self {
            None => TokenStream::new(),
            Some(s) => s.to_tokens(),
        }
    }
}

impl<T: ToTokens> ToTokens for Box<T> {
    fn to_tokens(&self) -> TokenStream {
        self.as_ref().to_tokens()
    }

    fn to_token_tree(&self) -> TokenTree {
        self.as_ref().to_token_tree()
    }
}

impl<T: ToTokens> ToTokens for Vec<T> {
    fn to_tokens(&self) -> TokenStream {
        self.iter().flat_map(|t| t.to_tokens()).collect()
    }

    fn to_token_tree(&self) -> TokenTree {
        TokenTree::Node(self.iter().map(|t| t.to_token_tree()).collect())
    }
}

/// A way of representing tokens in a tree format
#[derive(Debug)]
pub enum TokenTree {
    Leaf(Vec<Token>),
    Node(Vec<TokenTree>),
}

impl TokenTree {
    /// Flattens this tree back into the tokens it was built from, in order
    pub fn flatten(self) -> Vec<Token> {
        match self {
            TokenTree::Leaf(tokens) => tokens,
            TokenTree::Node(children) => children.into_iter().flat_map(TokenTree::flatten).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_create_token_stream() {
        let vec: Vec<Token> = vec![];
        let mut stream = TokenStream::from_iter(vec);
        assert!(stream.next().is_none())
    }

    #[test]
    fn test_keywords() {
        assert_eq!(TokenKind::keyword("def"), Some(TokenKind::Def));
        assert_eq!(TokenKind::keyword("nullable"), Some(TokenKind::Nullable));
        assert_eq!(TokenKind::keyword("_"), Some(TokenKind::Underscore));
        assert_eq!(TokenKind::keyword("define"), None);
        assert_eq!(TokenKind::keyword("int"), None);
    }

    #[test]
    fn test_integer_suffix_from_str() {
        assert_eq!("u8".parse::<IntegerSuffix>().unwrap(), IntegerSuffix::U8);
        assert_eq!("z".parse::<IntegerSuffix>().unwrap(), IntegerSuffix::Z);
        assert_eq!(IntegerSuffix::I64.as_ref(), "i64");
        assert!("f32".parse::<IntegerSuffix>().is_err());
    }

    #[test]
    fn test_span_of_tokens() {
        struct Pair(Token, Token);
        impl ToTokens for Pair {
            fn to_tokens(&self) -> TokenStream {
                TokenStream::from_iter([self.0.clone(), self.1.clone()])
            }
        }
        let pair = Pair(
            Token::new(Span::new(2, 3), TokenKind::Let, "let"),
            Token::new(Span::new(6, 1), TokenKind::Identifier("x".to_string()), "x"),
        );
        assert_eq!(pair.span(), Span::new(2, 5));
    }
}
