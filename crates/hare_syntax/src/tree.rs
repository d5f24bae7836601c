//! A uniform view over the syntax tree, independent of the concrete node types

use crate::syntax_tree::helpers::{Punctuated0, Punctuated1};
use hare_tokens::spanned::Spanned;
use hare_tokens::token::Token;
use std::fmt::Debug;

pub use hare_tokens_derive::{ChildNodes, SyntaxNode};

/// A node of the syntax tree
pub trait SyntaxNode: Spanned + Debug {
    /// The name of this kind of node, such as `"function_declaration"`
    fn kind(&self) -> &'static str;

    /// The child nodes of this node, in source order
    fn children(&self) -> Vec<&dyn SyntaxNode>;
}

/// Collects the nodes held by something that is part of a node.
///
/// A node contributes itself, while containers and groupings contribute whatever nodes they
/// hold. Tokens that are not nodes contribute nothing.
pub trait ChildNodes {
    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn SyntaxNode>);
}

impl<T: ChildNodes> ChildNodes for Box<T> {
    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn SyntaxNode>) {
        self.as_ref().collect_children(out)
    }
}

impl<T: ChildNodes> ChildNodes for Option<T> {
    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn SyntaxNode>) {
        if let Some(inner) = self {
            inner.collect_children(out)
        }
    }
}

impl<T: ChildNodes> ChildNodes for Vec<T> {
    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn SyntaxNode>) {
        for item in self {
            item.collect_children(out)
        }
    }
}

impl<T: ChildNodes, P> ChildNodes for Punctuated0<T, P> {
    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn SyntaxNode>) {
        for (item, _) in &self.punctuated {
            item.collect_children(out)
        }
    }
}

impl<T: ChildNodes, P> ChildNodes for Punctuated1<T, P> {
    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn SyntaxNode>) {
        for (item, _) in &self.punctuated {
            item.collect_children(out)
        }
    }
}

impl ChildNodes for Token {
    fn collect_children<'a>(&'a self, _out: &mut Vec<&'a dyn SyntaxNode>) {}
}

/// Finds the smallest node containing the byte `offset`.
///
/// Returns `root` itself when no child contains the offset, including when the offset lies
/// outside of `root` entirely.
pub fn node_at(root: &dyn SyntaxNode, offset: usize) -> &dyn SyntaxNode {
    let mut current = root;
    while let Some(child) = current
        .children()
        .into_iter()
        .find(|child| child.span().contains(offset))
    {
        current = child;
    }
    current
}

/// Visits `root` and every node below it in pre-order, passing each node's depth
pub fn walk<'a, F>(root: &'a dyn SyntaxNode, mut visit: F)
where
    F: FnMut(&'a dyn SyntaxNode, usize),
{
    let mut stack = vec![(root, 0_usize)];
    while let Some((node, depth)) = stack.pop() {
        visit(node, depth);
        stack.extend(node.children().into_iter().rev().map(|child| (child, depth + 1)));
    }
}

/// Renders the tree below `root` as indented lines of `kind [start, end)`
pub fn render(root: &dyn SyntaxNode) -> String {
    let mut rendered = String::new();
    walk(root, |node, depth| {
        let span = node.span();
        rendered.push_str(&format!(
            "{}{} [{}, {})\n",
            "  ".repeat(depth),
            node.kind(),
            span.offset(),
            span.offset() + span.len()
        ));
    });
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use test_log::test;

    #[test]
    fn test_node_at_finds_identifier() {
        let src = "fn f(x: int) void;";
        let output = parse(src);
        assert!(output.is_ok());
        let node = node_at(&output.module, 5);
        assert_eq!(node.kind(), "identifier");
        assert_eq!(node.span().range(), 5..6);
    }

    #[test]
    fn test_node_at_outside_is_root() {
        let output = parse("use fmt;");
        assert_eq!(node_at(&output.module, 100).kind(), "module");
    }

    #[test]
    fn test_walk_pre_order() {
        let output = parse("def x: int = 1;");
        let mut kinds = vec![];
        walk(&output.module, |node, depth| kinds.push((node.kind(), depth)));
        assert_eq!(
            kinds,
            [
                ("module", 0),
                ("constant_declaration", 1),
                ("constant_binding", 2),
                ("identifier", 3),
                ("builtin_type", 3),
                ("integer_literal", 3),
            ]
        );
    }

    #[test]
    fn test_render() {
        let output = parse("use fmt;");
        assert_eq!(
            render(&output.module),
            "module [0, 8)\n  use_statement [0, 8)\n    identifier [4, 7)\n"
        );
    }
}
