//! Expressions, parsed by precedence climbing over the binary operators

use crate::parser::{CouldParse, Err, ErrorKind, Parsable, SyntacticParser, SyntaxError, SyntaxResult};
use crate::parser::Boundary;
use crate::syntax_tree::helpers::{Punctuated, Punctuated0, Punctuated1};
use crate::syntax_tree::identifiers::{Ident, Path, ScopedIdentifier};
use crate::syntax_tree::literals::{
    ArrayLiteral, IntegerLiteral, Literal, StructLiteral, StructLiteralHead, TupleLiteral,
};
use crate::syntax_tree::singletons::{
    Assign, Bang, CaseKw, Colon, Comma, Dot, DotDot, Ellipsis, Else, FatArrow, For, If, LBracket, LCurly,
    LParen, Let, Match, QMark, RBracket, RCurly, RParen, Return, SemiC, Size, Switch,
};
use crate::syntax_tree::statement::Statement;
use crate::syntax_tree::types::{Type, TypeAnnotation};
use crate::tree::{ChildNodes, SyntaxNode};
use hare_tokens::token::{ToTokens, Token, TokenKind, TokenStream};
use tracing::trace;

/// Checks if an expression could start with a token of this kind
pub fn can_start_expr(kind: &TokenKind) -> bool {
    UnaryOp::from_token_kind(kind).is_some()
        || matches!(
            kind,
            TokenKind::Identifier(_)
                | TokenKind::Integer(_)
                | TokenKind::Float(_)
                | TokenKind::String(_)
                | TokenKind::RawString(_)
                | TokenKind::Rune(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Void
                | TokenKind::Null
                | TokenKind::LBracket
                | TokenKind::Struct
                | TokenKind::LParen
                | TokenKind::LCurly
                | TokenKind::Colon
                | TokenKind::If
                | TokenKind::For
                | TokenKind::Return
                | TokenKind::Switch
                | TokenKind::Match
                | TokenKind::Size
        )
}

/// An expression
#[derive(Debug, Clone, ToTokens, SyntaxNode, derive_more::From)]
pub enum Expr {
    Assignment(AssignmentExpr),
    Update(UpdateExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Cast(CastExpr),
    Size(SizeExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Range(RangeExpr),
    Member(MemberExpr),
    Try(TryExpr),
    ErrorAssertion(ErrorAssertionExpr),
    Parenthesized(ParenthesizedExpr),
    If(IfExpr),
    For(ForExpr),
    Return(ReturnExpr),
    Switch(SwitchExpr),
    Match(MatchExpr),
    Block(Block),
    Identifier(Ident),
    ScopedIdentifier(ScopedIdentifier),
    Literal(Literal),
}

impl Parsable for Expr {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        parse_assignment(parser)
    }
}

impl CouldParse for Expr {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        parser.nth_matches(0, can_start_expr)
    }
}

macro_rules! operator {
    ($(#[$meta:meta])* $ty:ident, $op:ident, $description:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            token: Token,
            op: $op,
        }

        impl $ty {
            pub fn op(&self) -> $op {
                self.op
            }

            pub fn token(&self) -> &Token {
                &self.token
            }
        }

        impl ToTokens for $ty {
            fn to_tokens(&self) -> TokenStream {
                TokenStream::from_iter([self.token.clone()])
            }
        }

        impl ChildNodes for $ty {
            fn collect_children<'a>(&'a self, _out: &mut Vec<&'a dyn SyntaxNode>) {}
        }

        impl Parsable for $ty {
            type Err = SyntaxError;

            fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
                let op = parser
                    .peek()?
                    .and_then(|token| $op::from_token_kind(token.kind()));
                match op {
                    Some(op) => match parser.consume()? {
                        Some(token) => Ok(Self { token, op }),
                        None => Err(parser.error(ErrorKind::UnexpectedEof, None)),
                    },
                    None => Err(parser.expected([$description])),
                }
            }
        }

        impl CouldParse for $ty {
            fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
                parser.nth_matches(0, |kind| $op::from_token_kind(kind).is_some())
            }
        }
    };
}

/// Binary operators, from the loosest binding up
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BinaryOp {
    LogicalXor,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    Eq,
    Neq,
    Gt,
    Gte,
    Lte,
    Lt,
    LShift,
    RShift,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    pub fn from_token_kind(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Xor => BinaryOp::LogicalXor,
            TokenKind::Or => BinaryOp::LogicalOr,
            TokenKind::And => BinaryOp::LogicalAnd,
            TokenKind::BitwiseOr => BinaryOp::BitwiseOr,
            TokenKind::BitwiseXor => BinaryOp::BitwiseXor,
            TokenKind::BitwiseAnd => BinaryOp::BitwiseAnd,
            TokenKind::Eq => BinaryOp::Eq,
            TokenKind::Neq => BinaryOp::Neq,
            TokenKind::Gt => BinaryOp::Gt,
            TokenKind::Gte => BinaryOp::Gte,
            TokenKind::Lte => BinaryOp::Lte,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LShift => BinaryOp::LShift,
            TokenKind::RShift => BinaryOp::RShift,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Div => BinaryOp::Div,
            TokenKind::Rem => BinaryOp::Rem,
            _ => return None,
        })
    }

    /// How tightly this operator binds. Every binary operator is left associative.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::LogicalXor => 1,
            BinaryOp::LogicalOr => 2,
            BinaryOp::LogicalAnd => 3,
            BinaryOp::BitwiseOr => 4,
            BinaryOp::BitwiseXor => 5,
            BinaryOp::BitwiseAnd => 6,
            BinaryOp::Eq | BinaryOp::Neq => 7,
            BinaryOp::Gt | BinaryOp::Gte | BinaryOp::Lte | BinaryOp::Lt => 8,
            BinaryOp::LShift | BinaryOp::RShift => 9,
            BinaryOp::Add | BinaryOp::Sub => 10,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 11,
        }
    }
}

operator!(BinaryOperator, BinaryOp, "binary operator");

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnaryOp {
    Plus,
    Minus,
    /// `~`
    BitwiseNot,
    /// `!`
    LogicalNot,
    /// `*`
    Deref,
    /// `&`
    AddressOf,
}

impl UnaryOp {
    pub fn from_token_kind(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Tilde => UnaryOp::BitwiseNot,
            TokenKind::Bang => UnaryOp::LogicalNot,
            TokenKind::Star => UnaryOp::Deref,
            TokenKind::BitwiseAnd => UnaryOp::AddressOf,
            _ => return None,
        })
    }
}

operator!(UnaryOperator, UnaryOp, "unary operator");

/// Compound assignment operators, like `+=`
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UpdateOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    LShift,
    RShift,
    BitwiseOr,
    BitwiseAnd,
    BitwiseXor,
    LogicalOr,
    LogicalAnd,
    LogicalXor,
}

impl UpdateOp {
    pub fn from_token_kind(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::PlusAssign => UpdateOp::Add,
            TokenKind::MinusAssign => UpdateOp::Sub,
            TokenKind::MultAssign => UpdateOp::Mul,
            TokenKind::DivAssign => UpdateOp::Div,
            TokenKind::RemAssign => UpdateOp::Rem,
            TokenKind::LShiftAssign => UpdateOp::LShift,
            TokenKind::RShiftAssign => UpdateOp::RShift,
            TokenKind::BitwiseOrAssign => UpdateOp::BitwiseOr,
            TokenKind::BitwiseAndAssign => UpdateOp::BitwiseAnd,
            TokenKind::BitwiseXorAssign => UpdateOp::BitwiseXor,
            TokenKind::OrAssign => UpdateOp::LogicalOr,
            TokenKind::AndAssign => UpdateOp::LogicalAnd,
            TokenKind::XorAssign => UpdateOp::LogicalXor,
            _ => return None,
        })
    }
}

operator!(UpdateOperator, UpdateOp, "compound assignment");

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CastOp {
    /// `: type`
    Type,
    /// `as type`
    As,
    /// `is type`
    Is,
}

impl CastOp {
    pub fn from_token_kind(kind: &TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Colon => CastOp::Type,
            TokenKind::As => CastOp::As,
            TokenKind::Is => CastOp::Is,
            _ => return None,
        })
    }
}

operator!(CastOperator, CastOp, "cast");

/// `target = value`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "assignment_expression")]
pub struct AssignmentExpr {
    pub target: Box<Expr>,
    pub assign: Assign,
    pub value: Box<Expr>,
}

/// `target += value`, and the other compound assignments
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "update_expression")]
pub struct UpdateExpr {
    pub target: Box<Expr>,
    pub op: UpdateOperator,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "unary_expression")]
pub struct UnaryExpr {
    pub op: UnaryOperator,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "binary_expression")]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinaryOperator,
    pub right: Box<Expr>,
}

/// `value: type`, `value as type` or `value is type`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "cast_expression")]
pub struct CastExpr {
    pub value: Box<Expr>,
    pub op: CastOperator,
    pub ty: Box<Type>,
}

/// `size(type)`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "size_expression")]
pub struct SizeExpr {
    pub size_tok: Size,
    pub lparen: LParen,
    pub ty: Box<Type>,
    pub rparen: RParen,
}

impl Parsable for SizeExpr {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            size_tok: parser.parse(Size::parse)?,
            lparen: parser.parse(LParen::parse)?,
            ty: Box::new(parser.parse(Type::parse)?),
            rparen: parser.parse(RParen::parse)?,
        })
    }
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "call_expression")]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub lparen: LParen,
    pub arguments: Punctuated0<Argument, Comma>,
    pub rparen: RParen,
}

impl CallExpr {
    pub fn arguments(&self) -> Vec<&Argument> {
        self.arguments.items()
    }
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum Argument {
    Value(Expr),
    Spread(VariadicArgument),
}

/// `value...`, which spreads a slice over the variadic parameter
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct VariadicArgument {
    pub value: Expr,
    pub ellipsis: Ellipsis,
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "index_expression")]
pub struct IndexExpr {
    pub object: Box<Expr>,
    pub lbracket: LBracket,
    pub index: Box<Expr>,
    pub rbracket: RBracket,
}

/// `object[start..end]`, where both bounds are optional
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "range_expression")]
pub struct RangeExpr {
    pub object: Box<Expr>,
    pub lbracket: LBracket,
    pub start: Option<Box<Expr>>,
    pub dot_dot: DotDot,
    pub end: Option<Box<Expr>>,
    pub rbracket: RBracket,
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "member_expression")]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub dot: Dot,
    pub member: Member,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum Member {
    Field(Ident),
    /// A tuple element, like `.0`
    Index(IntegerLiteral),
}

/// `value?`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "try_expression")]
pub struct TryExpr {
    pub value: Box<Expr>,
    pub qmark: QMark,
}

/// `value!`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "error_assertion_expression")]
pub struct ErrorAssertionExpr {
    pub value: Box<Expr>,
    pub bang: Bang,
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "parenthesized_expression")]
pub struct ParenthesizedExpr {
    pub lparen: LParen,
    pub value: Box<Expr>,
    pub rparen: RParen,
}

/// `if (condition) consequence else alternative`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "if_expression")]
pub struct IfExpr {
    pub if_tok: If,
    pub lparen: LParen,
    pub condition: Box<Expr>,
    pub rparen: RParen,
    pub consequence: Box<Expr>,
    pub alternative: Option<ElseClause>,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct ElseClause {
    pub else_tok: Else,
    pub body: Box<Expr>,
}

impl Parsable for IfExpr {
    type Err = SyntaxError;

    /// An `else` always belongs to the innermost `if` without one
    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let if_tok = parser.parse(If::parse)?;
        let lparen = parser.parse(LParen::parse)?;
        let condition = Box::new(parser.parse(Expr::parse)?);
        let rparen = parser.parse(RParen::parse)?;
        let consequence = Box::new(parser.parse(Expr::parse)?);
        let alternative = match parser.parse_opt::<Else>()? {
            Some(else_tok) => Some(ElseClause {
                else_tok,
                body: Box::new(parser.parse(Expr::parse)?),
            }),
            None => None,
        };
        Ok(Self {
            if_tok,
            lparen,
            condition,
            rparen,
            consequence,
            alternative,
        })
    }
}

/// `for (let bindings; condition; afterthought) body`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "for_expression")]
pub struct ForExpr {
    pub for_tok: For,
    pub lparen: LParen,
    pub bindings: Option<ForBindings>,
    pub condition: Box<Expr>,
    pub afterthought: Option<Afterthought>,
    pub rparen: RParen,
    pub body: Box<Expr>,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct ForBindings {
    pub bindings: LetExpression,
    pub semi: SemiC,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct Afterthought {
    pub semi: SemiC,
    pub value: Box<Expr>,
}

impl Parsable for ForExpr {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let for_tok = parser.parse(For::parse)?;
        let lparen = parser.parse(LParen::parse)?;
        let bindings = match parser.parse_opt::<LetExpression>()? {
            Some(bindings) => Some(ForBindings {
                bindings,
                semi: parser.parse(SemiC::parse)?,
            }),
            None => None,
        };
        let condition = Box::new(parser.parse(Expr::parse)?);
        let afterthought = match parser.parse_opt::<SemiC>()? {
            Some(semi) => Some(Afterthought {
                semi,
                value: Box::new(parser.parse(Expr::parse)?),
            }),
            None => None,
        };
        Ok(Self {
            for_tok,
            lparen,
            bindings,
            condition,
            afterthought,
            rparen: parser.parse(RParen::parse)?,
            body: Box::new(parser.parse(Expr::parse)?),
        })
    }
}

/// `return value?`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "return_expression")]
pub struct ReturnExpr {
    pub return_tok: Return,
    pub value: Option<Box<Expr>>,
}

impl Parsable for ReturnExpr {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let return_tok = parser.parse(Return::parse)?;
        let value = parser.parse_opt::<Expr>()?.map(Box::new);
        Ok(Self { return_tok, value })
    }
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "switch_expression")]
pub struct SwitchExpr {
    pub switch_tok: Switch,
    pub value: Box<Expr>,
    pub lcurly: LCurly,
    pub cases: Vec<Case>,
    pub rcurly: RCurly,
}

impl Parsable for SwitchExpr {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let switch_tok = parser.parse(Switch::parse)?;
        let value = Box::new(parser.parse(Expr::parse)?);
        let (lcurly, cases, rcurly) = parse_cases(parser)?;
        Ok(Self {
            switch_tok,
            value,
            lcurly,
            cases,
            rcurly,
        })
    }
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
#[syntax(kind = "match_expression")]
pub struct MatchExpr {
    pub match_tok: Match,
    pub value: Box<Expr>,
    pub lcurly: LCurly,
    pub cases: Vec<Case>,
    pub rcurly: RCurly,
}

impl Parsable for MatchExpr {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let match_tok = parser.parse(Match::parse)?;
        let value = Box::new(parser.parse(Expr::parse)?);
        let (lcurly, cases, rcurly) = parse_cases(parser)?;
        Ok(Self {
            match_tok,
            value,
            lcurly,
            cases,
            rcurly,
        })
    }
}

fn parse_cases(parser: &mut SyntacticParser<'_>) -> SyntaxResult<(LCurly, Vec<Case>, RCurly)> {
    let lcurly = parser.parse(LCurly::parse)?;
    let cases = parser.parse(Vec::<Case>::parse)?;
    let rcurly = parser.parse(RCurly::parse)?;
    Ok((lcurly, cases, rcurly))
}

/// `case pattern => statements`. A case without a pattern matches anything.
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct Case {
    pub case_tok: CaseKw,
    pub pattern: Option<CasePattern>,
    pub arrow: FatArrow,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum CasePattern {
    Values(Punctuated1<Expr, Comma>),
    Let(LetExpression),
    /// Only builtin and array types are written bare
    Type(Type),
}

impl Parsable for Case {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let case_tok = parser.parse(CaseKw::parse)?;
        let pattern = if parser.next_is(&TokenKind::FatArrow)? {
            None
        } else if let Some(bindings) = parser.parse_opt::<LetExpression>()? {
            Some(CasePattern::Let(bindings))
        } else if let Some(ty) = parser.try_parse(parse_type_pattern).map_err(Err::Failure)? {
            Some(CasePattern::Type(ty))
        } else {
            Some(CasePattern::Values(Punctuated1::parse_with(
                parser,
                Expr::parse,
            )?))
        };
        let arrow = parser.parse(FatArrow::parse)?;
        let mut statements = vec![];
        loop {
            let end = parser.nth_matches(0, |kind| {
                matches!(kind, TokenKind::Case | TokenKind::RCurly | TokenKind::Eof)
            })?;
            if end || parser.at_eof()? {
                break;
            }
            if let Some(statement) = parser.recover(Statement::parse, Boundary::Block)? {
                statements.push(statement);
            }
            if parser.should_stop() {
                break;
            }
        }
        if statements.is_empty() {
            return Err(parser.expected(["statement"]));
        }
        Ok(Self {
            case_tok,
            pattern,
            arrow,
            statements,
        })
    }
}

impl CouldParse for Case {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        CaseKw::could_parse(parser)
    }
}

fn parse_type_pattern(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Type> {
    let ty = parser.parse(Type::parse)?;
    if matches!(ty, Type::Builtin(_) | Type::Array(_)) && parser.next_is(&TokenKind::FatArrow)? {
        Ok(ty)
    } else {
        Err(parser.error(ErrorKind::Custom("not a type pattern"), None))
    }
}

/// `let a: int = 1, b`, as it appears in `for` loops and `case` patterns
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct LetExpression {
    pub let_tok: Let,
    pub bindings: Punctuated1<LetBinding, Comma>,
}

impl Parsable for LetExpression {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            let_tok: parser.parse(Let::parse)?,
            bindings: parser.parse(Punctuated1::<LetBinding, Comma>::parse)?,
        })
    }
}

impl CouldParse for LetExpression {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        Let::could_parse(parser)
    }
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct LetBinding {
    pub name: Ident,
    pub type_annotation: Option<TypeAnnotation>,
    pub value: Option<Initializer>,
}

impl Parsable for LetBinding {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            name: parser.parse(Ident::parse)?,
            type_annotation: parser.parse_opt::<TypeAnnotation>()?,
            value: parser.parse_opt::<Initializer>()?,
        })
    }
}

/// `= value`
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct Initializer {
    pub assign: Assign,
    pub value: Box<Expr>,
}

impl Parsable for Initializer {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            assign: parser.parse(Assign::parse)?,
            value: Box::new(parser.parse(Expr::parse)?),
        })
    }
}

impl CouldParse for Initializer {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        Assign::could_parse(parser)
    }
}

/// `:name { statements }`, where the label is optional
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct Block {
    pub label: Option<Label>,
    pub lcurly: LCurly,
    pub statements: Vec<Statement>,
    pub rcurly: RCurly,
}

impl Parsable for Block {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let label = parser.parse_opt::<Label>()?;
        let lcurly = parser.parse(LCurly::parse)?;
        let mut statements = vec![];
        while !parser.next_is(&TokenKind::RCurly)? && !parser.at_eof()? {
            if let Some(statement) = parser.recover(Statement::parse, Boundary::Block)? {
                statements.push(statement);
            }
            if parser.should_stop() {
                break;
            }
        }
        Ok(Self {
            label,
            lcurly,
            statements,
            rcurly: parser.parse(RCurly::parse)?,
        })
    }
}

impl CouldParse for Block {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        parser.nth_matches(0, |kind| matches!(kind, TokenKind::LCurly | TokenKind::Colon))
    }
}

/// `:name`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct Label {
    pub colon: Colon,
    pub name: Ident,
}

impl Parsable for Label {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            colon: parser.parse(Colon::parse)?,
            name: parser.parse(Ident::parse)?,
        })
    }
}

impl CouldParse for Label {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        Colon::could_parse(parser)
    }
}

/// Assignments are the loosest binding expressions and are right associative
fn parse_assignment(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Expr> {
    let target = parser.parse(|parser: &mut SyntacticParser<'_>| parse_binary(parser, 1))?;
    if let Some(assign) = parser.parse_opt::<Assign>()? {
        let value = parser.parse(parse_assignment)?;
        return Ok(AssignmentExpr {
            target: Box::new(target),
            assign,
            value: Box::new(value),
        }
        .into());
    }
    if let Some(op) = parser.parse_opt::<UpdateOperator>()? {
        let value = parser.parse(parse_assignment)?;
        return Ok(UpdateExpr {
            target: Box::new(target),
            op,
            value: Box::new(value),
        }
        .into());
    }
    Ok(target)
}

/// Parses binary operations binding at least as tightly as `min_precedence`
fn parse_binary(parser: &mut SyntacticParser<'_>, min_precedence: u8) -> SyntaxResult<Expr> {
    let mut left = parse_cast(parser)?;
    loop {
        let Some(op) = parser
            .peek()?
            .and_then(|token| BinaryOp::from_token_kind(token.kind()))
        else {
            break;
        };
        let precedence = op.precedence();
        if precedence < min_precedence {
            break;
        }
        trace!("binary operator {op:?} at precedence {precedence}");
        let op = parser.parse(BinaryOperator::parse)?;
        let right = parse_binary(parser, precedence + 1)?;
        left = BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
        .into();
    }
    Ok(left)
}

fn parse_cast(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Expr> {
    let mut value = parse_unary(parser)?;
    while let Some(op) = parser.parse_opt::<CastOperator>()? {
        let ty = parser.parse(Type::parse)?;
        value = CastExpr {
            value: Box::new(value),
            op,
            ty: Box::new(ty),
        }
        .into();
    }
    Ok(value)
}

fn parse_unary(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Expr> {
    if let Some(op) = parser.parse_opt::<UnaryOperator>()? {
        let operand = parse_unary(parser)?;
        Ok(UnaryExpr {
            op,
            operand: Box::new(operand),
        }
        .into())
    } else {
        parse_postfix(parser)
    }
}

fn parse_postfix(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Expr> {
    let mut expr = parse_primary(parser)?;
    while let Some(kind) = parser.peek()?.map(|token| token.kind().clone()) {
        expr = match kind {
            TokenKind::LParen => parse_call(parser, expr)?,
            TokenKind::LBracket => parse_index(parser, expr)?,
            TokenKind::Dot => {
                let dot = parser.parse(Dot::parse)?;
                let member = if IntegerLiteral::could_parse(parser)? {
                    Member::Index(parser.parse(IntegerLiteral::parse)?)
                } else if Ident::could_parse(parser)? {
                    Member::Field(parser.parse(Ident::parse)?)
                } else {
                    return Err(parser.expected(["identifier", "integer"]));
                };
                MemberExpr {
                    object: Box::new(expr),
                    dot,
                    member,
                }
                .into()
            }
            TokenKind::QMark => TryExpr {
                value: Box::new(expr),
                qmark: parser.parse(QMark::parse)?,
            }
            .into(),
            TokenKind::Bang => ErrorAssertionExpr {
                value: Box::new(expr),
                bang: parser.parse(Bang::parse)?,
            }
            .into(),
            _ => break,
        };
    }
    Ok(expr)
}

/// Arguments may end with a single spread argument
fn parse_call(parser: &mut SyntacticParser<'_>, callee: Expr) -> SyntaxResult<Expr> {
    let lparen = parser.parse(LParen::parse)?;
    let mut arguments = vec![];
    while !parser.next_is(&TokenKind::RParen)? && !parser.at_eof()? {
        let value = parser.parse(Expr::parse)?;
        let argument = match parser.parse_opt::<Ellipsis>()? {
            Some(ellipsis) => Argument::Spread(VariadicArgument { value, ellipsis }),
            None => Argument::Value(value),
        };
        let spread = matches!(argument, Argument::Spread(_));
        let comma = parser.parse_opt::<Comma>()?;
        let last = comma.is_none() || spread;
        arguments.push((argument, comma));
        if last {
            break;
        }
    }
    let rparen = parser.parse(RParen::parse)?;
    Ok(CallExpr {
        callee: Box::new(callee),
        lparen,
        arguments: arguments.into(),
        rparen,
    }
    .into())
}

fn parse_index(parser: &mut SyntacticParser<'_>, object: Expr) -> SyntaxResult<Expr> {
    let lbracket = parser.parse(LBracket::parse)?;
    let start = if parser.next_is(&TokenKind::DotDot)? {
        None
    } else {
        Some(Box::new(parser.parse(Expr::parse)?))
    };
    match (start, parser.parse_opt::<DotDot>()?) {
        (start, Some(dot_dot)) => {
            let end = if parser.next_is(&TokenKind::RBracket)? {
                None
            } else {
                Some(Box::new(parser.parse(Expr::parse)?))
            };
            Ok(RangeExpr {
                object: Box::new(object),
                lbracket,
                start,
                dot_dot,
                end,
                rbracket: parser.parse(RBracket::parse)?,
            }
            .into())
        }
        (Some(index), None) => Ok(IndexExpr {
            object: Box::new(object),
            lbracket,
            index,
            rbracket: parser.parse(RBracket::parse)?,
        }
        .into()),
        (None, None) => Err(parser.expected([".."])),
    }
}

fn parse_primary(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Expr> {
    let Some(kind) = parser.peek()?.map(|token| token.kind().clone()) else {
        return Err(parser.expected(["expression"]));
    };
    Ok(match kind {
        TokenKind::Identifier(_) => {
            let path = parser.parse(Path::parse)?;
            if parser.next_is(&TokenKind::LCurly)? && starts_struct_body(parser)? {
                let literal = StructLiteral::parse_body(parser, StructLiteralHead::Named(path))?;
                Literal::from(literal).into()
            } else {
                match path {
                    Path::Ident(ident) => Expr::Identifier(ident),
                    Path::Scoped(scoped) => Expr::ScopedIdentifier(scoped),
                }
            }
        }
        TokenKind::Integer(_)
        | TokenKind::Float(_)
        | TokenKind::String(_)
        | TokenKind::RawString(_)
        | TokenKind::Rune(_)
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Void
        | TokenKind::Null => parser.parse(Literal::parse_simple)?.into(),
        TokenKind::LBracket => Literal::from(parser.parse(ArrayLiteral::parse)?).into(),
        TokenKind::Struct => Literal::from(parser.parse(StructLiteral::parse)?).into(),
        TokenKind::LParen => parse_parenthesized(parser)?,
        TokenKind::If => parser.parse(IfExpr::parse)?.into(),
        TokenKind::For => parser.parse(ForExpr::parse)?.into(),
        TokenKind::Return => parser.parse(ReturnExpr::parse)?.into(),
        TokenKind::Switch => parser.parse(SwitchExpr::parse)?.into(),
        TokenKind::Match => parser.parse(MatchExpr::parse)?.into(),
        TokenKind::LCurly | TokenKind::Colon => parser.parse(Block::parse)?.into(),
        TokenKind::Size => parser.parse(SizeExpr::parse)?.into(),
        _ => return Err(parser.expected(["expression"])),
    })
}

/// Whether the `{` after a name opens a struct literal rather than, for example, the cases of a
/// `switch`
fn starts_struct_body(parser: &mut SyntacticParser<'_>) -> SyntaxResult<bool> {
    struct_body_at(parser, 0)
}

/// Whether the `{` at lookahead `n` opens the fields of a struct literal
fn struct_body_at(parser: &mut SyntacticParser<'_>, n: usize) -> SyntaxResult<bool> {
    if parser.nth_matches(n + 1, |kind| matches!(kind, TokenKind::Ellipsis | TokenKind::Struct))? {
        return Ok(true);
    }
    if !parser.nth_matches(n + 1, |kind| matches!(kind, TokenKind::Identifier(_)))? {
        return Ok(false);
    }
    if parser.nth_matches(n + 2, |kind| matches!(kind, TokenKind::Assign | TokenKind::Colon))? {
        return Ok(true);
    }
    // a nested named literal, as in `outer { inner { ... } }`
    let mut next = n + 2;
    while parser.nth_is(next, &TokenKind::DoubleColon)?
        && parser.nth_matches(next + 1, |kind| matches!(kind, TokenKind::Identifier(_)))?
    {
        next += 2;
    }
    Ok(parser.nth_is(next, &TokenKind::LCurly)? && struct_body_at(parser, next)?)
}

/// `(e)` is a parenthesized expression while `(e, f)` is a tuple
fn parse_parenthesized(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Expr> {
    let lparen = parser.parse(LParen::parse)?;
    let first = parser.parse(Expr::parse)?;
    if let Some(comma) = parser.parse_opt::<Comma>()? {
        let tuple = TupleLiteral::parse_rest(parser, lparen, first, comma)?;
        return Ok(Literal::from(tuple).into());
    }
    Ok(ParenthesizedExpr {
        lparen,
        value: Box::new(first),
        rparen: parser.parse(RParen::parse)?,
    }
    .into())
}
