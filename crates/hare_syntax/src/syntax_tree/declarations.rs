//! Modules, their imports and their top level declarations

use crate::parser::{Boundary, CouldParse, Err, Parsable, SyntacticParser, SyntaxError, SyntaxResult};
use crate::syntax_tree::expr::{Expr, Initializer};
use crate::syntax_tree::helpers::{Punctuated, Punctuated0, Punctuated1};
use crate::syntax_tree::identifiers::{Ident, Path};
use crate::syntax_tree::singletons::{
    Assign, Comma, Const, Def, DoubleColon, Eof, Export, Fn, LCurly, Let, RCurly, SemiC, Star,
    TypeKw, Use,
};
use crate::syntax_tree::types::{
    parse_return_type, FunctionAttribute, ParameterList, SymbolAttribute, Type, TypeAnnotation,
};
use crate::tree::{ChildNodes, SyntaxNode};
use hare_tokens::token::{ToTokens, TokenKind};
use tracing::{debug, trace};

/// A complete source file
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct Module {
    pub imports: Vec<UseStatement>,
    pub declarations: Vec<Declaration>,
    pub eof: Eof,
}

impl Module {
    /// A module without imports or declarations, for a source of length `len`
    pub fn empty(len: usize) -> Self {
        Self {
            imports: vec![],
            declarations: vec![],
            eof: Eof::at(len),
        }
    }
}

impl Parsable for Module {
    type Err = SyntaxError;

    /// Every import and declaration recovers from its own errors, so a module is always produced
    /// unless the parser itself fails.
    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let mut imports = vec![];
        while parser.next_is(&TokenKind::Use)? {
            if let Some(import) = parser.recover(UseStatement::parse, Boundary::Module)? {
                trace!("parsed import of {}", import.module);
                imports.push(import);
            }
            if parser.should_stop() {
                break;
            }
        }

        let mut declarations = vec![];
        while !parser.should_stop() && !parser.at_eof()? {
            if let Some(declaration) = parser.recover(Declaration::parse, Boundary::Module)? {
                declarations.push(declaration);
            }
        }

        if parser.should_stop() {
            debug!("stopped parsing early, skipping the rest of the input");
        }
        parser.skip_to_eof()?;
        let eof = parser.parse(Eof::parse)?;
        Ok(Self {
            imports,
            declarations,
            eof,
        })
    }
}

/// An import of another module, like `use fmt;`, `use io = std::io;`, `use fmt::{println};` or
/// `use strings::*;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct UseStatement {
    pub use_tok: Use,
    pub alias: Option<UseAlias>,
    pub module: Path,
    pub members: Option<UseMembers>,
    pub semi: SemiC,
}

/// `name =`, which names the imported module
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct UseAlias {
    pub name: Ident,
    pub assign: Assign,
}

/// `::{a, b}` or `::*`
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct UseMembers {
    pub double_colon: DoubleColon,
    pub list: MemberList,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum MemberList {
    Names {
        lcurly: LCurly,
        names: Punctuated0<Ident, Comma>,
        rcurly: RCurly,
    },
    Wildcard(Star),
}

impl UseStatement {
    /// The names imported by a member list, if there is one
    pub fn members(&self) -> Vec<&Ident> {
        match self.members.as_ref().map(|members| &members.list) {
            Some(MemberList::Names { names, .. }) => names.items(),
            _ => vec![],
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(
            self.members.as_ref().map(|members| &members.list),
            Some(MemberList::Wildcard(_))
        )
    }
}

impl Parsable for UseStatement {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let use_tok = parser.parse(Use::parse)?;
        let alias = if parser.nth_is(1, &TokenKind::Assign)? {
            Some(UseAlias {
                name: parser.parse(Ident::parse)?,
                assign: parser.parse(Assign::parse)?,
            })
        } else {
            None
        };
        let module = parser.parse(Path::parse)?;
        let members = match parser.parse_opt::<DoubleColon>()? {
            Some(double_colon) => {
                let list = if parser.next_is(&TokenKind::Star)? {
                    MemberList::Wildcard(parser.parse(Star::parse)?)
                } else {
                    MemberList::Names {
                        lcurly: parser.parse(LCurly::parse)?,
                        names: Punctuated0::parse_until(parser, &TokenKind::RCurly)?,
                        rcurly: parser.parse(RCurly::parse)?,
                    }
                };
                Some(UseMembers { double_colon, list })
            }
            None => None,
        };
        Ok(Self {
            use_tok,
            alias,
            module,
            members,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

impl CouldParse for UseStatement {
    fn could_parse(parser: &mut SyntacticParser<'_>) -> Result<bool, Err<Self::Err>> {
        Use::could_parse(parser)
    }
}

/// A top level declaration
#[derive(Debug, Clone, ToTokens, SyntaxNode, derive_more::From)]
pub enum Declaration {
    Global(GlobalDeclaration),
    Constant(ConstantDeclaration),
    TypeAlias(TypeDeclaration),
    Function(FunctionDeclaration),
}

impl Declaration {
    pub fn is_exported(&self) -> bool {
        match self {
            Declaration::Global(decl) => decl.export.is_some(),
            Declaration::Constant(decl) => decl.export.is_some(),
            Declaration::TypeAlias(decl) => decl.export.is_some(),
            Declaration::Function(decl) => decl.export.is_some(),
        }
    }
}

impl Parsable for Declaration {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let offset = usize::from(parser.next_is(&TokenKind::Export)?);
        let Some(kind) = parser.peek_nth(offset)?.map(|token| token.kind().clone()) else {
            return Err(parser.expected(["declaration"]));
        };
        Ok(match kind {
            TokenKind::Const | TokenKind::Let => parser.parse(GlobalDeclaration::parse)?.into(),
            TokenKind::Def => parser.parse(ConstantDeclaration::parse)?.into(),
            TokenKind::Type => parser.parse(TypeDeclaration::parse)?.into(),
            TokenKind::Fn
            | TokenKind::AtFini
            | TokenKind::AtInit
            | TokenKind::AtTest
            | TokenKind::AtNoreturn
            | TokenKind::AtSymbol => parser.parse(FunctionDeclaration::parse)?.into(),
            _ => {
                if offset == 1 {
                    parser.consume()?;
                }
                return Err(parser.expected(["const", "let", "def", "type", "fn"]));
            }
        })
    }
}

/// `let` or `const`
#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub enum GlobalKeyword {
    Const(Const),
    Let(Let),
}

/// `export? (const|let) bindings;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct GlobalDeclaration {
    pub export: Option<Export>,
    pub keyword: GlobalKeyword,
    pub bindings: Punctuated1<GlobalBinding, Comma>,
    pub semi: SemiC,
}

impl GlobalDeclaration {
    pub fn is_const(&self) -> bool {
        matches!(self.keyword, GlobalKeyword::Const(_))
    }
}

impl Parsable for GlobalDeclaration {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let export = parser.parse_opt::<Export>()?;
        let keyword = if parser.next_is(&TokenKind::Const)? {
            GlobalKeyword::Const(parser.parse(Const::parse)?)
        } else {
            GlobalKeyword::Let(parser.parse(Let::parse)?)
        };
        Ok(Self {
            export,
            keyword,
            bindings: parser.parse(Punctuated1::<GlobalBinding, Comma>::parse)?,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

/// `@symbol("name")? name: type = value`, where the value is optional
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct GlobalBinding {
    pub symbol: Option<SymbolAttribute>,
    pub name: Ident,
    pub type_annotation: TypeAnnotation,
    pub value: Option<Initializer>,
}

impl Parsable for GlobalBinding {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            symbol: parser.parse_opt::<SymbolAttribute>()?,
            name: parser.parse(Ident::parse)?,
            type_annotation: parser.parse(TypeAnnotation::parse)?,
            value: parser.parse_opt::<Initializer>()?,
        })
    }
}

/// `export? def name: type = value;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ConstantDeclaration {
    pub export: Option<Export>,
    pub def_tok: Def,
    pub bindings: Punctuated1<ConstantBinding, Comma>,
    pub semi: SemiC,
}

impl Parsable for ConstantDeclaration {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            export: parser.parse_opt::<Export>()?,
            def_tok: parser.parse(Def::parse)?,
            bindings: parser.parse(Punctuated1::<ConstantBinding, Comma>::parse)?,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

/// Both the type and the value of a constant are required
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct ConstantBinding {
    pub name: Ident,
    pub type_annotation: TypeAnnotation,
    pub value: Initializer,
}

impl Parsable for ConstantBinding {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            name: parser.parse(Ident::parse)?,
            type_annotation: parser.parse(TypeAnnotation::parse)?,
            value: parser.parse(Initializer::parse)?,
        })
    }
}

impl ConstantBinding {
    pub fn value(&self) -> &Expr {
        &self.value.value
    }

    pub fn ty(&self) -> &Type {
        &self.type_annotation.ty
    }
}

/// `export? type name = type, other = type;`
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct TypeDeclaration {
    pub export: Option<Export>,
    pub type_tok: TypeKw,
    pub bindings: Punctuated0<TypeBinding, Comma>,
    pub semi: SemiC,
}

impl Parsable for TypeDeclaration {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let export = parser.parse_opt::<Export>()?;
        let type_tok = parser.parse(TypeKw::parse)?;
        let bindings = Punctuated0::parse_until(parser, &TokenKind::SemiColon)?;
        if bindings.is_empty() {
            return Err(parser.expected(["identifier"]));
        }
        Ok(Self {
            export,
            type_tok,
            bindings,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct TypeBinding {
    pub name: Ident,
    pub assign: Assign,
    pub ty: Type,
}

impl Parsable for TypeBinding {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        Ok(Self {
            name: parser.parse(Ident::parse)?,
            assign: parser.parse(Assign::parse)?,
            ty: parser.parse(Type::parse)?,
        })
    }
}

/// `export? attributes fn name(params) returns = body;`. Without a body, this only declares the
/// function.
#[derive(Debug, Clone, ToTokens, SyntaxNode)]
pub struct FunctionDeclaration {
    pub export: Option<Export>,
    pub attributes: Vec<FunctionAttribute>,
    pub fn_tok: Fn,
    pub name: Ident,
    pub params: ParameterList,
    pub returns: Option<Box<Type>>,
    pub body: Option<FunctionBody>,
    pub semi: SemiC,
}

#[derive(Debug, Clone, ToTokens, ChildNodes)]
pub struct FunctionBody {
    pub assign: Assign,
    pub value: Expr,
}

impl FunctionDeclaration {
    pub fn body(&self) -> Option<&Expr> {
        self.body.as_ref().map(|body| &body.value)
    }
}

impl Parsable for FunctionDeclaration {
    type Err = SyntaxError;

    fn parse(parser: &mut SyntacticParser<'_>) -> SyntaxResult<Self> {
        let export = parser.parse_opt::<Export>()?;
        let attributes = parser.parse(Vec::<FunctionAttribute>::parse)?;
        let fn_tok = parser.parse(Fn::parse)?;
        let name = parser.parse(Ident::parse)?;
        trace!("parsing function {name}");
        let params = parser.parse(ParameterList::parse)?;
        let returns = parse_return_type(parser)?;
        let body = match parser.parse_opt::<Assign>()? {
            Some(assign) => Some(FunctionBody {
                assign,
                value: parser.parse(Expr::parse)?,
            }),
            None => None,
        };
        Ok(Self {
            export,
            attributes,
            fn_tok,
            name,
            params,
            returns,
            body,
            semi: parser.parse(SemiC::parse)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::syntax_tree::literals::Literal;
    use crate::syntax_tree::types::{Attribute, BuiltinKind};
    use test_log::test;

    fn module(src: &str) -> Module {
        let mut parser = SyntacticParser::from(Lexer::new(src));
        let module = parser.parse(Module::parse).unwrap_or_else(|e| panic!("{e}"));
        let (_, errors) = parser.finish();
        assert!(errors.is_empty(), "{errors:?}");
        module
    }

    #[test]
    fn test_use_statements() {
        let module = module("use fmt;\nuse io = std::io;\nuse fmt::{println, errorln,};\nuse strings::*;\n");
        let imports = &module.imports;
        assert_eq!(imports.len(), 4);
        assert!(imports[0].alias.is_none());
        assert_eq!(imports[1].alias.as_ref().map(|a| a.name.name()), Some("io"));
        assert_eq!(imports[1].module.to_string(), "std::io");
        let members = imports[2].members().iter().map(|m| m.name()).collect::<Vec<_>>();
        assert_eq!(members, ["println", "errorln"]);
        assert!(imports[3].is_wildcard());
    }

    #[test]
    fn test_constant_declaration() {
        let module = module("def x: int = 1;");
        let [Declaration::Constant(constant)] = module.declarations.as_slice() else {
            panic!("expected one constant")
        };
        let bindings = constant.bindings.items();
        let [binding] = bindings.as_slice() else {
            panic!("expected one binding")
        };
        assert_eq!(binding.name.name(), "x");
        assert!(matches!(binding.ty(), Type::Builtin(b) if b.builtin() == BuiltinKind::Int));
        let Expr::Literal(Literal::Integer(integer)) = binding.value() else {
            panic!("expected integer")
        };
        assert_eq!(integer.value(), Some(1));
        assert!(integer.suffix().is_none());
    }

    #[test]
    fn test_exported_function() {
        let module = module("export fn main() void = { return; };");
        let [Declaration::Function(function)] = module.declarations.as_slice() else {
            panic!("expected one function")
        };
        assert!(function.export.is_some());
        assert!(function.attributes.is_empty());
        assert!(function.params.params().is_empty());
        assert!(
            matches!(function.returns.as_deref(), Some(Type::Builtin(b)) if b.builtin() == BuiltinKind::Void)
        );
        let Some(Expr::Block(block)) = function.body() else {
            panic!("expected block body")
        };
        let [crate::syntax_tree::statement::Statement::Expression(statement)] =
            block.statements.as_slice()
        else {
            panic!("expected a single statement")
        };
        assert!(matches!(&statement.value, Expr::Return(r) if r.value.is_none()));
    }

    #[test]
    fn test_function_attributes_and_prototype() {
        let module = module("@symbol(\"puts\") @noreturn fn f(s: str, args: int...) void;");
        let [Declaration::Function(function)] = module.declarations.as_slice() else {
            panic!("expected one function")
        };
        assert_eq!(function.attributes.len(), 2);
        assert!(matches!(function.attributes[0].attribute, Attribute::Symbol(_)));
        assert!(function.body.is_none());
        assert!(function.params.is_variadic());
    }

    #[test]
    fn test_globals() {
        let module = module("export let @symbol(\"x\") x: int = 1, y: str;\nconst z: u8 = 2;");
        let [Declaration::Global(first), Declaration::Global(second)] =
            module.declarations.as_slice()
        else {
            panic!("expected two globals")
        };
        assert!(!first.is_const());
        assert!(first.export.is_some());
        let bindings = first.bindings.items();
        assert!(bindings[0].symbol.is_some());
        assert!(bindings[1].value.is_none());
        assert!(second.is_const());
    }

    #[test]
    fn test_type_aliases() {
        let module = module("type a = int, b = (str | void),;");
        let [Declaration::TypeAlias(alias)] = module.declarations.as_slice() else {
            panic!("expected one type declaration")
        };
        assert_eq!(alias.bindings.len(), 2);
        assert!(matches!(alias.bindings.items()[1].ty, Type::TaggedUnion(_)));
    }

    #[test]
    fn test_recovers_after_bad_declaration() {
        let mut parser = SyntacticParser::from(Lexer::new("fn f( : int) void;\ndef x: int = 1;"));
        let module = parser.parse(Module::parse).unwrap();
        let (_, errors) = parser.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].offset(), 6);
        assert_eq!(module.declarations.len(), 1);
        assert!(matches!(module.declarations[0], Declaration::Constant(_)));
    }

    #[test]
    fn test_not_a_declaration() {
        let mut parser = SyntacticParser::from(Lexer::new("export 1;\ntype t = int;"));
        let module = parser.parse(Module::parse).unwrap();
        let (_, errors) = parser.finish();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].offset(), 7);
        assert_eq!(module.declarations.len(), 1);
    }
}
