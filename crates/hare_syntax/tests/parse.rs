use hare_syntax::lexer::tokenize;
use hare_syntax::parser::ErrorKind;
use hare_syntax::syntax_tree::expr::Expr;
use hare_syntax::syntax_tree::helpers::Punctuated;
use hare_syntax::syntax_tree::literals::Literal;
use hare_syntax::syntax_tree::statement::Statement;
use hare_syntax::syntax_tree::types::{BuiltinKind, Type};
use hare_syntax::syntax_tree::{Declaration, Path};
use hare_syntax::tree::{node_at, walk, SyntaxNode};
use hare_syntax::{parse, parse_with, Error, ParseOptions};
use hare_tokens::spanned::Spanned;
use hare_tokens::token::TokenKind;
use test_log::test;

const PROGRAM: &str = r#"// Counts its arguments
use fmt;
use os;
use strings::{concat, dup,};

export type point = struct {
	x: int,
	y: int,
};

type circle = struct { center: point, radius: f64 };
type shape = (point | circle);

def ORIGIN: point = point { x = 0, y = 0 };

let counter: size = 0;

fn add(a: int, b: int) int = a + b * 2;

export fn main() void = {
	const args = os::args;
	let total = 0z;
	for (let i = 0z; i < 10; i += 1) {
		total += 1; // one more
	};
	if (total == 0) {
		fmt::println("no arguments")!;
	} else {
		fmt::printfln("{} arguments", total)!;
	};
	let s: shape = ORIGIN;
	const x = match (s) {
	case let p: point =>
		yield p.x;
	case =>
		yield 0;
	};
	switch (total) {
	case 0, 1 =>
		void;
	case =>
		return;
	};
};
"#;

/// The kind and depth of every node, which identifies a tree up to its byte offsets
fn shape(module: &dyn SyntaxNode) -> Vec<(&'static str, usize)> {
    let mut nodes = vec![];
    walk(module, |node, depth| nodes.push((node.kind(), depth)));
    nodes
}

/// The kind and value of every leaf literal, in source order
fn literal_values(module: &dyn SyntaxNode, src: &str) -> Vec<TokenKind> {
    let mut values = vec![];
    walk(module, |node, _| {
        if node.kind().ends_with("_literal") && node.children().is_empty() {
            let (tokens, _) = tokenize(&src[node.span().range()]);
            values.extend(tokens.first().map(|token| token.kind().clone()));
        }
    });
    values
}

#[test]
fn program_parses_without_errors() {
    let output = parse(PROGRAM);
    assert!(output.is_ok(), "{:#?}", output.errors);
    assert_eq!(output.module.imports.len(), 3);
    assert_eq!(output.module.declarations.len(), 7);
    assert_eq!(output.comments.len(), 2);
    assert!(output.module.declarations[0].is_exported());
}

#[test]
fn literals_relex_to_the_same_token() {
    let output = parse(PROGRAM);
    let mut seen = 0;
    walk(&output.module, |node, _| {
        if !node.kind().ends_with("_literal") || node.kind() == "struct_literal" {
            return;
        }
        let text = &PROGRAM[node.span().range()];
        let (tokens, errors) = tokenize(text);
        assert!(errors.is_empty(), "{text:?} did not relex: {errors:?}");
        let [token, eof] = tokens.as_slice() else {
            panic!("{text:?} relexed to {tokens:?}")
        };
        assert_eq!(token.text(), text);
        assert_eq!(eof.kind(), &TokenKind::Eof);
        seen += 1;
    });
    assert!(seen > 10, "only {seen} literals found");
}

#[test]
fn constant_declaration() {
    let output = parse("def x: int = 1;");
    assert!(output.is_ok());
    let [Declaration::Constant(constant)] = output.module.declarations.as_slice() else {
        panic!("expected a single constant")
    };
    let bindings = constant.bindings.items();
    let [binding] = bindings.as_slice() else {
        panic!("expected a single binding")
    };
    assert_eq!(binding.name.name(), "x");
    assert!(matches!(binding.ty(), Type::Builtin(b) if b.builtin() == BuiltinKind::Int));
    let Expr::Literal(Literal::Integer(value)) = binding.value() else {
        panic!("expected an integer")
    };
    assert_eq!(value.value(), Some(1));
    assert_eq!(value.suffix(), None);
}

#[test]
fn exported_main() {
    let output = parse("export fn main() void = { return; };");
    assert!(output.is_ok());
    let [Declaration::Function(main)] = output.module.declarations.as_slice() else {
        panic!("expected a single function")
    };
    assert!(main.export.is_some());
    assert!(main.attributes.is_empty());
    assert!(main.params.params().is_empty());
    assert!(matches!(main.returns.as_deref(), Some(Type::Builtin(b)) if b.builtin() == BuiltinKind::Void));
    let Some(Expr::Block(body)) = main.body() else {
        panic!("expected a block")
    };
    let [Statement::Expression(statement)] = body.statements.as_slice() else {
        panic!("expected one statement")
    };
    assert!(matches!(&statement.value, Expr::Return(r) if r.value.is_none()));
}

#[test]
fn scoped_type_nests_to_the_left() {
    let output = parse("type t = a::b::c;");
    assert!(output.is_ok());
    let [Declaration::TypeAlias(alias)] = output.module.declarations.as_slice() else {
        panic!("expected a type alias")
    };
    let Type::Named(Path::Scoped(outer)) = &alias.bindings.items()[0].ty else {
        panic!("expected a scoped name")
    };
    assert_eq!(outer.name.name(), "c");
    let Path::Scoped(inner) = outer.path.as_ref() else {
        panic!("expected a scoped scope")
    };
    assert_eq!(inner.name.name(), "b");
    assert!(matches!(inner.path.as_ref(), Path::Ident(a) if a.name() == "a"));
}

#[test]
fn tuples_and_tagged_unions() {
    let output = parse("type t = (int, str), u = (int | str);");
    assert!(output.is_ok());
    let [Declaration::TypeAlias(alias)] = output.module.declarations.as_slice() else {
        panic!("expected a type alias")
    };
    let bindings = alias.bindings.items();
    let Type::Tuple(tuple) = &bindings[0].ty else {
        panic!("expected a tuple")
    };
    assert_eq!(tuple.elements.len(), 2);
    let Type::TaggedUnion(union) = &bindings[1].ty else {
        panic!("expected a tagged union")
    };
    assert_eq!(union.alternatives().len(), 2);
}

#[test]
fn reparsing_token_text_gives_the_same_tree() {
    let first = parse(PROGRAM);
    let (tokens, errors) = tokenize(PROGRAM);
    assert!(errors.is_empty());
    let text = tokens
        .iter()
        .filter(|token| token.kind() != &TokenKind::Eof)
        .map(|token| token.text())
        .collect::<Vec<_>>()
        .join("\n");
    let second = parse(&text);
    assert!(second.is_ok(), "{:#?}", second.errors);
    assert_eq!(shape(&first.module), shape(&second.module));
    let literals = literal_values(&first.module, PROGRAM);
    assert!(literals.contains(&TokenKind::String("no arguments".to_string())));
    assert_eq!(literals, literal_values(&second.module, &text));
    assert_eq!(first.comments.len(), second.comments.len());
}

#[test]
fn chained_tuple_members_and_nested_struct_literals() {
    let src = "fn f() void = {\n\tlet x = t.0.1;\n\tlet y = foo { inner { a = 1 } };\n};\n";
    let output = parse(src);
    assert!(output.is_ok(), "{:#?}", output.errors);
    let Declaration::Function(f) = &output.module.declarations[0] else {
        panic!("expected a function")
    };
    let Some(Expr::Block(body)) = f.body() else {
        panic!("expected a block")
    };
    assert_eq!(body.statements.len(), 2);
    let kinds = shape(&output.module)
        .into_iter()
        .map(|(kind, _)| kind)
        .collect::<Vec<_>>();
    assert_eq!(kinds.iter().filter(|&&k| k == "member_expression").count(), 2);
    assert_eq!(kinds.iter().filter(|&&k| k == "struct_literal").count(), 2);
}

#[test]
fn missing_parameter_name_recovers() {
    let src = "fn f( : int) void;\ndef x: int = 1;\n";
    let output = parse(src);
    let [Error::Syntax(error)] = output.errors.as_slice() else {
        panic!("expected exactly one syntax error, got {:?}", output.errors)
    };
    assert_eq!(error.offset(), 6);
    assert!(matches!(error.kind(), ErrorKind::ExpectedToken(..)));
    assert_eq!(error.expected(), ["identifier", "_"]);
    assert!(matches!(
        output.module.declarations.as_slice(),
        [Declaration::Constant(_)]
    ));
}

#[test]
fn errors_in_blocks_recover_at_statements() {
    let src = "fn f() void = {\n\tlet = 1;\n\tg();\n};\nfn h() void;\n";
    let output = parse(src);
    assert_eq!(output.errors.len(), 1, "{:#?}", output.errors);
    assert_eq!(output.module.declarations.len(), 2);
    let Declaration::Function(f) = &output.module.declarations[0] else {
        panic!("expected a function")
    };
    let Some(Expr::Block(body)) = f.body() else {
        panic!("expected a block")
    };
    assert_eq!(body.statements.len(), 1);
}

#[test]
fn no_recover_stops_at_first_error() {
    let src = "def a: int = ;\ndef b: int = ;\ndef c: int = 1;\n";
    assert_eq!(parse(src).errors.len(), 2);
    let output = parse_with(src, ParseOptions::default().with_recover(false));
    assert_eq!(output.errors.len(), 1);
    assert!(output.module.declarations.is_empty());
}

#[test]
fn max_errors_limits_collection() {
    let src = "def a: int = ;\ndef b: int = ;\ndef c: int = ;\n";
    let output = parse_with(src, ParseOptions::default().with_max_errors(2));
    assert_eq!(output.errors.len(), 2);
}

#[test]
fn variadics_are_only_checked_on_request() {
    let src = "fn f(a: int..., b: int) void;";
    assert!(parse(src).is_ok());
    let output = parse_with(src, ParseOptions::default().with_validate_variadics(true));
    let [Error::Syntax(error)] = output.errors.as_slice() else {
        panic!("expected one syntax error, got {:?}", output.errors)
    };
    assert!(matches!(error.kind(), ErrorKind::MisplacedVariadic));
    assert_eq!(output.module.declarations.len(), 1);
}

#[test]
fn unterminated_string_aborts() {
    let output = parse("def a: str = \"abc;\ndef b: int = 1;\n");
    assert!(matches!(output.errors.as_slice(), [Error::Lex(e)] if e.is_fatal()));
}

#[test]
fn smallest_enclosing_node() {
    let src = "fn add(a: int, b: int) int = a + b * 2;";
    let output = parse(src);
    let offset = src.find('*').unwrap();
    let node = node_at(&output.module, offset);
    assert_eq!(node.kind(), "binary_expression");
    assert_eq!(&src[node.span().range()], "b * 2");
    let node = node_at(&output.module, offset + 2);
    assert_eq!(node.kind(), "integer_literal");
}
