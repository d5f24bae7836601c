//! Statements, which make up the bodies of blocks and cases

use crate::parser::{Parsable, SyntacticParser, SyntaxError, SyntaxResult};
use crate::syntax_tree::expr::{Expr, Initializer, Label};
use crate::syntax_tree::helpers::Punctuated1;
use crate::syntax_tree::identifiers::Ident;
use crate::syntax_tree::literals::TupleLiteral;
use crate::syntax_tree::singletons::{Break, Comma, Const, Defer, Let, SemiC, Static, Yield};
use crate::syntax_tree::types::TypeAnnotation;
use crate::tree::{ChildNodes, SyntaxNode};
use hare_tokens::token::{ToTokens, TokenKind};

#[derive(Debug, Clone, ToTokens, SyntaxNode, derive_more::From)]
pub enum Statement {
    Break(BreakStatement),
    Defer(DeferStatement),
    Yield(YieldStatement),
    StaticOperation(StaticOperation),
    Let(LetDeclaration),
    Const(ConstDeclaration),
    Expression(ExpressionStatement),
}

impl Parsable for Statement {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let Some(kind) = parser.peek()?.map(|token| token.kind().clone()) else {
            return Err(parser.expected(["statement"]));
        };
        Ok(match kind {
            TokenKind::Break => parser.parse(BreakStatement::parse)?.into(),
            TokenKind::Defer => parser.parse(DeferStatement::parse)?.into(),
            TokenKind::Yield => parser.parse(YieldStatement::parse)?.into(),
            TokenKind::Let => parser.parse(LetDeclaration::parse)?.into(),
            TokenKind::Const => parser.parse(ConstDeclaration::parse)?.into(),
            TokenKind::Static if parser.nth_is(1, &TokenKind::Let)? => {
                parser.parse(LetDeclaration::parse)?.into()
            }
            TokenKind::Static if parser.nth_is(1, &TokenKind::Const)? => {
                parser.parse(ConstDeclaration::parse)?.into()
            }
            TokenKind::Static => parser.parse(StaticOperation::parse)?.into(),
            _ => parser.parse(ExpressionStatement::parse)?.into(),
        })
    }
}

/// `break :label;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct BreakStatement {
    pub break_tok: Break,
    pub label: Option<Label>,
    pub semi: SemiC,
}

impl Parsable for BreakStatement {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            break_tok: parser.parse(Break::parse)?,
            label: parser.parse_opt::<Label>()?,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

/// Runs a statement when the enclosing scope exits
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct DeferStatement {
    pub defer_tok: Defer,
    pub statement: Box<Statement>,
}

impl Parsable for DeferStatement {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            defer_tok: parser.parse(Defer::parse)?,
            statement: Box::new(parser.parse(Statement::parse)?),
        })
    }
}

/// `yield;`, `yield value;` or `yield :label, value;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct YieldStatement {
    pub yield_tok: Yield,
    pub value: Option<YieldValue>,
    pub semi: SemiC,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum YieldValue {
    Labeled {
        label: Label,
        comma: Comma,
        value: Box<Expr>,
    },
    Plain(Box<Expr>),
}

impl Parsable for YieldStatement {
    type Err = SyntaxError;

    /// A leading `:label` followed by a comma names the block to yield from. Otherwise the label
    /// belongs to a block expression being yielded.
    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let yield_tok = parser.parse(Yield::parse)?;
        let value = if parser.next_is(&TokenKind::SemiColon)? {
            None
        } else if parser.next_is(&TokenKind::Colon)? && parser.nth_is(2, &TokenKind::Comma)? {
            Some(YieldValue::Labeled {
                label: parser.parse(Label::parse)?,
                comma: parser.parse(Comma::parse)?,
                value: Box::new(parser.parse(Expr::parse)?),
            })
        } else {
            Some(YieldValue::Plain(Box::new(parser.parse(Expr::parse)?)))
        };
        Ok(Self {
            yield_tok,
            value,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

/// `static expr;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct StaticOperation {
    pub static_tok: Static,
    pub value: Expr,
    pub semi: SemiC,
}

impl Parsable for StaticOperation {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            static_tok: parser.parse(Static::parse)?,
            value: parser.parse(Expr::parse)?,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

/// `static? let a = 1, (b, c) = t;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct LetDeclaration {
    pub static_tok: Option<Static>,
    pub let_tok: Let,
    pub bindings: Punctuated1<LocalBinding, Comma>,
    pub semi: SemiC,
}

impl Parsable for LetDeclaration {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            static_tok: parser.parse_opt::<Static>()?,
            let_tok: parser.parse(Let::parse)?,
            bindings: Punctuated1::parse_with(parser, |parser: &mut SyntacticParser<'_>| {
                LocalBinding::parse_binding(parser, false)
            })?,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

/// `static? const a = 1;`, where every binding must be initialized
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ConstDeclaration {
    pub static_tok: Option<Static>,
    pub const_tok: Const,
    pub bindings: Punctuated1<LocalBinding, Comma>,
    pub semi: SemiC,
}

impl Parsable for ConstDeclaration {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            static_tok: parser.parse_opt::<Static>()?,
            const_tok: parser.parse(Const::parse)?,
            bindings: Punctuated1::parse_with(parser, |parser: &mut SyntacticParser<'_>| {
                LocalBinding::parse_binding(parser, true)
            })?,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

/// A binding of a local `let` or `const`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct LocalBinding {
    pub target: BindingTarget,
    pub type_annotation: Option<TypeAnnotation>,
    pub value: Option<Initializer>,
}

/// What a local binding binds to. A tuple destructures its value.
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum BindingTarget {
    Name(Ident),
    Tuple(TupleLiteral),
}

impl LocalBinding {
    fn parse_binding(parser: &mut SyntacticParser<'_>, initialized: bool) -> SyntaxResult<Self> {
        let target = if parser.next_is(&TokenKind::LParen)? {
            BindingTarget::Tuple(parser.parse(TupleLiteral::parse)?)
        } else {
            BindingTarget::Name(parser.parse(Ident::parse)?)
        };
        let type_annotation = parser.parse_opt::<TypeAnnotation>()?;
        let value = if initialized {
            Some(parser.parse(Initializer::parse)?)
        } else {
            parser.parse_opt::<Initializer>()?
        };
        Ok(Self {
            target,
            type_annotation,
            value,
        })
    }

    /// The name bound, unless the binding destructures a tuple
    pub fn name(&self) -> Option<&Ident> {
        match &self.target {
            BindingTarget::Name(name) => Some(name),
            BindingTarget::Tuple(_) => None,
        }
    }
}

/// `expr;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ExpressionStatement {
    pub value: Expr,
    pub semi: SemiC,
}

impl Parsable for ExpressionStatement {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            value: parser.parse(Expr::parse)?,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}
